//! First-run defaults: the admin account and the bundled reference data.

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::password;
use crate::catalog::repo_types::{DetoxItem, ExerciseItem, FoodItem, Recipe};
use crate::config::AppConfig;
use crate::db::{now_iso, to_record, Database, Entity};
use crate::store::{Record, StoreMeta};
use crate::users::repo_types::User;

/// Bump when the seed contents change in a way existing stores should pick up.
pub const SEED_VERSION: u32 = 1;

pub const ADMIN_ID: &str = "admin-001";
pub const ADMIN_USERNAME: &str = "admin";

const FOODS: &str = include_str!("../defaults/foods.json");
const EXERCISES: &str = include_str!("../defaults/exercises.json");
const DETOX: &str = include_str!("../defaults/detox.json");
const RECIPES: &str = include_str!("../defaults/recipes.json");

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// The store was already at `SEED_VERSION`; nothing was touched.
    pub up_to_date: bool,
    pub admin_created: bool,
    pub food_items: usize,
    pub exercise_items: usize,
    pub detox_items: usize,
    pub recipes: usize,
}

fn default_admin(config: &AppConfig) -> anyhow::Result<User> {
    Ok(User {
        id: ADMIN_ID.to_string(),
        username: ADMIN_USERNAME.to_string(),
        password: password::hash_password(&config.admin_password)?,
        full_name: "Dyt Ayşenur Korkmaz".to_string(),
        email: "admin@admin.com".to_string(),
        phone: "+90 555 000 00 00".to_string(),
        age: Some(30.0),
        weight: Some(60.0),
        height: Some(165.0),
        target_weight: None,
        blood_type: None,
        allergies: None,
        medical_conditions: None,
        gender: None,
        activity_level: None,
        goal: None,
        created_at: now_iso(),
        is_admin: true,
    })
}

/// Decodes a bundled dataset through its typed model so a broken file fails
/// loudly instead of landing in the store.
fn dataset<T: Entity>(raw: &str) -> anyhow::Result<Vec<Record>> {
    let items: Vec<T> = serde_json::from_str(raw)
        .with_context(|| format!("bundled {} dataset is invalid", T::COLLECTION))?;
    items
        .iter()
        .map(|item| to_record(T::COLLECTION, item).map_err(anyhow::Error::from))
        .collect()
}

/// Loads `raw` into `T`'s collection when it is empty; returns rows written.
async fn load_if_empty<T: Entity>(db: &Database, raw: &str) -> anyhow::Result<usize> {
    if !db.get_all(T::COLLECTION).await?.is_empty() {
        info!(collection = %T::COLLECTION, "collection already populated, leaving as is");
        return Ok(0);
    }
    let rows = dataset::<T>(raw)?;
    let count = rows.len();
    db.replace_all(T::COLLECTION, rows).await?;
    info!(collection = %T::COLLECTION, count, "default items loaded");
    Ok(count)
}

/// Brings a store up to `SEED_VERSION`. Safe to call on every start.
pub async fn initialize_defaults(db: &Database, config: &AppConfig) -> anyhow::Result<SeedReport> {
    let meta = db.store().read_meta().await?;
    if meta.seed_version >= SEED_VERSION {
        return Ok(SeedReport {
            up_to_date: true,
            ..Default::default()
        });
    }
    info!(from = meta.seed_version, to = SEED_VERSION, "seeding store");

    let mut report = SeedReport::default();

    let users: Vec<User> = db.list().await?;
    if users.iter().any(|u| u.username == ADMIN_USERNAME) {
        warn!("admin user already present, not recreated");
    } else {
        db.insert(&default_admin(config)?).await?;
        report.admin_created = true;
        info!(user_id = ADMIN_ID, "admin user created");
    }

    report.food_items = load_if_empty::<FoodItem>(db, FOODS).await?;
    report.exercise_items = load_if_empty::<ExerciseItem>(db, EXERCISES).await?;
    report.detox_items = load_if_empty::<DetoxItem>(db, DETOX).await?;
    report.recipes = load_if_empty::<Recipe>(db, RECIPES).await?;

    db.store()
        .write_meta(&StoreMeta {
            seed_version: SEED_VERSION,
        })
        .await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Collection;

    #[test]
    fn bundled_datasets_decode() {
        assert!(!dataset::<FoodItem>(FOODS).unwrap().is_empty());
        assert!(!dataset::<ExerciseItem>(EXERCISES).unwrap().is_empty());
        assert!(!dataset::<DetoxItem>(DETOX).unwrap().is_empty());
        assert!(!dataset::<Recipe>(RECIPES).unwrap().is_empty());
    }

    #[test]
    fn recipe_ingredients_point_at_bundled_foods() {
        let foods: Vec<FoodItem> = serde_json::from_str(FOODS).unwrap();
        let recipes: Vec<Recipe> = serde_json::from_str(RECIPES).unwrap();
        for recipe in &recipes {
            assert!(recipe.has_totals(), "{} lacks totals", recipe.name);
            for ing in &recipe.ingredients {
                assert!(
                    foods.iter().any(|f| f.id == ing.food_id),
                    "{} references unknown {}",
                    recipe.name,
                    ing.food_id
                );
            }
        }
    }

    #[tokio::test]
    async fn seeds_once_then_reports_up_to_date() {
        let db = Database::in_memory();
        let config = AppConfig::for_tests("unused");

        let first = initialize_defaults(&db, &config).await.unwrap();
        assert!(first.admin_created);
        assert!(first.food_items > 0);
        assert!(!first.up_to_date);

        let admin: User = db.find(ADMIN_ID).await.unwrap().unwrap();
        assert!(admin.is_admin);
        assert!(password::verify_password("admin123", &admin.password).unwrap());

        let second = initialize_defaults(&db, &config).await.unwrap();
        assert!(second.up_to_date);
        assert_eq!(db.list::<User>().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn populated_collections_are_left_alone() {
        let db = Database::in_memory();
        let mut own = Record::new();
        own.insert("id".into(), "food-mine".into());
        own.insert("name".into(), "Ev yapımı granola".into());
        db.add(Collection::FoodItems, own).await.unwrap();

        let report = initialize_defaults(&db, &AppConfig::for_tests("unused"))
            .await
            .unwrap();
        assert_eq!(report.food_items, 0);
        assert!(report.exercise_items > 0);
        assert_eq!(db.get_all(Collection::FoodItems).await.unwrap().len(), 1);
        assert_eq!(db.store().read_meta().await.unwrap().seed_version, SEED_VERSION);
    }
}
