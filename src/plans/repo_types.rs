use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::catalog::repo_types::null_as_default;
use crate::db::Entity;
use crate::nutrition::{self, Macros};
use crate::store::Collection;

/// A food as placed on a meal: name and macros are copied from the catalog
/// when the entry is made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFood {
    #[serde(default)]
    pub food_id: String,
    #[serde(default)]
    pub food_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protein: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub foods: Vec<MealFood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl Meal {
    /// The meal's own totals, when the caller supplied calories.
    pub fn totals(&self) -> Option<Macros> {
        Some(Macros {
            calories: self.total_calories?,
            protein: self.total_protein.unwrap_or_default(),
            carbs: self.total_carbs.unwrap_or_default(),
            fat: self.total_fat.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    #[serde(default)]
    pub exercise_id: String,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetoxEntry {
    #[serde(default)]
    pub detox_id: String,
    #[serde(default)]
    pub detox_name: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub benefits: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDietPlan {
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExercisePlan {
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDetoxPlan {
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub items: Vec<DetoxEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of a daily diet plan save. Absent fields leave the stored plan alone.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDietPlanInput {
    #[serde(default)]
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals: Option<Vec<Meal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExercisePlanInput {
    #[serde(default)]
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<ExerciseEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDetoxPlanInput {
    #[serde(default)]
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<DetoxEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A plan stored once per `(userId, date)`.
pub trait DailyPlan: Entity + 'static {
    type Input: DeserializeOwned + Serialize + Send + 'static;
    const LABEL: &'static str;

    fn date(&self) -> &str;
    fn input_date(input: &Self::Input) -> &str;

    /// Fills totals the caller left out; supplied totals are kept as given.
    fn fill_totals(_input: &mut Self::Input) {}
}

macro_rules! daily_entity {
    ($ty:ty, $collection:expr, $prefix:literal) => {
        impl Entity for $ty {
            const COLLECTION: Collection = $collection;
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.id
            }

            fn assign_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

daily_entity!(DailyDietPlan, Collection::DailyDietPlans, "ddp");
daily_entity!(DailyExercisePlan, Collection::DailyExercisePlans, "dep");
daily_entity!(DailyDetoxPlan, Collection::DailyDetoxPlans, "dtp");

impl DailyPlan for DailyDietPlan {
    type Input = DailyDietPlanInput;
    const LABEL: &'static str = "daily diet plan";

    fn date(&self) -> &str {
        &self.date
    }

    fn input_date(input: &Self::Input) -> &str {
        &input.date
    }

    fn fill_totals(input: &mut Self::Input) {
        let Some(meals) = input.meals.as_deref() else {
            return;
        };
        let sum = nutrition::day_totals(meals).rounded();
        input.total_calories.get_or_insert(sum.calories);
        input.total_protein.get_or_insert(sum.protein);
        input.total_carbs.get_or_insert(sum.carbs);
        input.total_fat.get_or_insert(sum.fat);
    }
}

impl DailyPlan for DailyExercisePlan {
    type Input = DailyExercisePlanInput;
    const LABEL: &'static str = "daily exercise plan";

    fn date(&self) -> &str {
        &self.date
    }

    fn input_date(input: &Self::Input) -> &str {
        &input.date
    }

    fn fill_totals(input: &mut Self::Input) {
        let Some(entries) = input.exercises.as_deref() else {
            return;
        };
        let (minutes, calories) = nutrition::exercise_totals(entries);
        input.total_duration.get_or_insert(minutes);
        input.total_calories.get_or_insert(calories);
    }
}

impl DailyPlan for DailyDetoxPlan {
    type Input = DailyDetoxPlanInput;
    const LABEL: &'static str = "daily detox plan";

    fn date(&self) -> &str {
        &self.date
    }

    fn input_date(input: &Self::Input) -> &str {
        &input.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn supplied_totals_are_kept() {
        let mut input: DailyDietPlanInput = serde_json::from_value(json!({
            "date": "2024-01-01",
            "meals": [
                {"name": "Kahvalti", "totalCalories": 200},
                {"name": "Ogle", "totalCalories": 300}
            ],
            "totalCalories": 480
        }))
        .unwrap();
        DailyDietPlan::fill_totals(&mut input);
        assert_eq!(input.total_calories, Some(480.0));
        assert_eq!(input.total_protein, Some(0.0));
    }

    #[test]
    fn missing_totals_come_from_meals() {
        let mut input: DailyDietPlanInput = serde_json::from_value(json!({
            "date": "2024-01-01",
            "meals": [
                {"name": "Kahvalti", "foods": [
                    {"foodId": "food-1", "calories": 150, "protein": 5, "carbs": 20, "fat": 4},
                    {"foodId": "food-2", "calories": 50, "protein": 1, "carbs": 10, "fat": 0.5}
                ]},
                {"name": "Ogle", "totalCalories": 300, "totalProtein": 20}
            ]
        }))
        .unwrap();
        DailyDietPlan::fill_totals(&mut input);
        assert_eq!(input.total_calories, Some(500.0));
        assert_eq!(input.total_protein, Some(26.0));
        assert_eq!(input.total_fat, Some(4.5));
    }

    #[test]
    fn exercise_totals_fill_duration_and_calories() {
        let mut input: DailyExercisePlanInput = serde_json::from_value(json!({
            "date": "2024-01-01",
            "exercises": [
                {"exerciseId": "ex-1", "duration": 30, "calories": 210},
                {"exerciseId": "ex-2", "duration": 15, "sets": 3, "reps": 12, "calories": 90}
            ]
        }))
        .unwrap();
        DailyExercisePlan::fill_totals(&mut input);
        assert_eq!(input.total_duration, Some(45.0));
        assert_eq!(input.total_calories, Some(300.0));
    }

    #[test]
    fn input_without_optional_fields_serializes_to_date_only() {
        let input = DailyDetoxPlanInput {
            date: "2024-02-02".into(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"date": "2024-02-02"})
        );
    }
}
