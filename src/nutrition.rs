//! Macro-nutrient arithmetic and BMI.

use std::collections::HashMap;
use std::iter::Sum;
use std::ops::Add;

use serde::Serialize;

use crate::catalog::repo_types::{FoodItem, RecipeIngredient};
use crate::plans::repo_types::{ExerciseEntry, Meal, MealFood};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub fn scaled(self, ratio: f64) -> Self {
        Self {
            calories: self.calories * ratio,
            protein: self.protein * ratio,
            carbs: self.carbs * ratio,
            fat: self.fat * ratio,
        }
    }

    /// Whole calories, one decimal for the rest.
    pub fn rounded(self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fat: round1(self.fat),
        }
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Self {
        iter.fold(Macros::default(), Add::add)
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl From<&FoodItem> for Macros {
    fn from(f: &FoodItem) -> Self {
        Self {
            calories: f.calories,
            protein: f.protein,
            carbs: f.carbs,
            fat: f.fat,
        }
    }
}

impl From<&MealFood> for Macros {
    fn from(f: &MealFood) -> Self {
        Self {
            calories: f.calories,
            protein: f.protein,
            carbs: f.carbs,
            fat: f.fat,
        }
    }
}

pub fn meal_totals(foods: &[MealFood]) -> Macros {
    foods.iter().map(Macros::from).sum()
}

/// Sum over meals, preferring each meal's own totals when it carries them.
pub fn day_totals(meals: &[Meal]) -> Macros {
    meals
        .iter()
        .map(|m| match m.totals() {
            Some(t) => t,
            None => meal_totals(&m.foods),
        })
        .sum()
}

/// (total minutes, total calories) for a day of exercise.
pub fn exercise_totals(entries: &[ExerciseEntry]) -> (f64, f64) {
    entries
        .iter()
        .fold((0.0, 0.0), |(d, c), e| (d + e.duration, c + e.calories))
}

/// Scales each ingredient's food by `amount / servingSize`.
///
/// Ingredients whose food is unknown or has no positive numeric serving size
/// contribute nothing.
pub fn recipe_totals(ingredients: &[RecipeIngredient], foods: &HashMap<&str, &FoodItem>) -> Macros {
    ingredients
        .iter()
        .filter_map(|ing| {
            let food = foods.get(ing.food_id.as_str())?;
            let serving = food.serving_size_value()?;
            Some(Macros::from(*food).scaled(ing.amount / serving))
        })
        .sum::<Macros>()
        .rounded()
}

/// Body mass index from kilograms and centimetres, one decimal.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 || !weight_kg.is_finite() || !height_cm.is_finite() {
        return None;
    }
    let m = height_cm / 100.0;
    Some(round1(weight_kg / (m * m)))
}
