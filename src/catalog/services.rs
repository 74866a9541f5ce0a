use std::collections::HashMap;

use tracing::debug;

use crate::catalog::repo_types::{FoodItem, Recipe, RecipeIngredient, RecipePatch};
use crate::db::Database;
use crate::nutrition::{self, Macros};
use crate::store::StoreError;

async fn totals_from_catalog(
    db: &Database,
    ingredients: &[RecipeIngredient],
) -> Result<Macros, StoreError> {
    let foods: Vec<FoodItem> = db.list().await?;
    let by_id: HashMap<&str, &FoodItem> = foods.iter().map(|f| (f.id.as_str(), f)).collect();
    Ok(nutrition::recipe_totals(ingredients, &by_id))
}

/// Computes any total the recipe is missing from its ingredients.
pub async fn fill_recipe_totals(db: &Database, recipe: &mut Recipe) -> Result<(), StoreError> {
    if recipe.has_totals() {
        return Ok(());
    }
    let t = totals_from_catalog(db, &recipe.ingredients).await?;
    debug!(recipe = %recipe.name, calories = t.calories, "recipe totals computed");
    recipe.total_calories.get_or_insert(t.calories);
    recipe.total_protein.get_or_insert(t.protein);
    recipe.total_carbs.get_or_insert(t.carbs);
    recipe.total_fat.get_or_insert(t.fat);
    Ok(())
}

/// New ingredients without matching totals get fresh totals.
pub async fn fill_patch_totals(db: &Database, patch: &mut RecipePatch) -> Result<(), StoreError> {
    let Some(ingredients) = patch.ingredients.as_deref() else {
        return Ok(());
    };
    if patch.total_calories.is_some()
        && patch.total_protein.is_some()
        && patch.total_carbs.is_some()
        && patch.total_fat.is_some()
    {
        return Ok(());
    }
    let t = totals_from_catalog(db, ingredients).await?;
    patch.total_calories.get_or_insert(t.calories);
    patch.total_protein.get_or_insert(t.protein);
    patch.total_carbs.get_or_insert(t.carbs);
    patch.total_fat.get_or_insert(t.fat);
    Ok(())
}
