use axum::{
    extract::{Path, State},
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    catalog::{
        repo_types::{CatalogItem, DetoxItem, ExerciseItem, FoodItem, Recipe, RecipePatch},
        services,
    },
    db::{new_id, now_iso},
    error::{AppError, AppResult},
    extractors::JsonBody,
    state::AppState,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .merge(standard::<FoodItem>("/food-items"))
        .merge(standard::<ExerciseItem>("/exercise-items"))
        .merge(standard::<DetoxItem>("/detox-items"))
        .merge(quintet::<Recipe>(
            "/recipes",
            post(create_recipe),
            put(update_recipe),
        ))
}

fn standard<T: CatalogItem>(base: &str) -> Router<AppState> {
    quintet::<T>(base, post(create_item::<T>), put(update_item::<T>))
}

fn quintet<T: CatalogItem>(
    base: &str,
    create: MethodRouter<AppState>,
    update: MethodRouter<AppState>,
) -> Router<AppState> {
    Router::new()
        .route(base, get(list_items::<T>).merge(create))
        .route(
            &format!("{}/:id", base),
            get(get_item::<T>).merge(update).delete(delete_item::<T>),
        )
}

#[instrument(skip(state))]
pub async fn list_items<T: CatalogItem>(State(state): State<AppState>) -> AppResult<Json<Vec<T>>> {
    Ok(Json(state.db.list::<T>().await?))
}

#[instrument(skip(state))]
pub async fn get_item<T: CatalogItem>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<T>> {
    state
        .db
        .find::<T>(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(T::LABEL))
}

async fn store_new<T: CatalogItem>(state: &AppState, mut item: T) -> AppResult<T> {
    item.assign_id(new_id(T::ID_PREFIX));
    item.set_created_at(now_iso());
    state.db.insert(&item).await?;
    info!(id = item.id(), "{} created", T::LABEL);
    Ok(item)
}

#[instrument(skip(state, item))]
pub async fn create_item<T: CatalogItem>(
    State(state): State<AppState>,
    JsonBody(item): JsonBody<T>,
) -> AppResult<Json<T>> {
    Ok(Json(store_new(&state, item).await?))
}

#[instrument(skip(state, patch))]
pub async fn update_item<T: CatalogItem>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<T::Patch>,
) -> AppResult<Json<T>> {
    state
        .db
        .patch::<T, _>(&id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(T::LABEL))
}

#[instrument(skip(state))]
pub async fn delete_item<T: CatalogItem>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    if !state.db.remove::<T>(&id).await? {
        return Err(AppError::not_found(T::LABEL));
    }
    info!(%id, "{} deleted", T::LABEL);
    Ok(Json(json!({ "success": true })))
}

#[instrument(skip(state, recipe))]
pub async fn create_recipe(
    State(state): State<AppState>,
    JsonBody(mut recipe): JsonBody<Recipe>,
) -> AppResult<Json<Recipe>> {
    services::fill_recipe_totals(&state.db, &mut recipe).await?;
    Ok(Json(store_new(&state, recipe).await?))
}

#[instrument(skip(state, patch))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(mut patch): JsonBody<RecipePatch>,
) -> AppResult<Json<Recipe>> {
    services::fill_patch_totals(&state.db, &mut patch).await?;
    update_item::<Recipe>(State(state), Path(id), JsonBody(patch)).await
}
