//! Single-record-per-user plans that predate the daily tables. Bodies are
//! stored as given apart from the stamped `userId` and `updatedAt`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    db::now_iso,
    error::AppResult,
    extractors::JsonBody,
    state::AppState,
    store::{Collection, Record},
};

pub fn legacy_routes() -> Router<AppState> {
    Router::new()
        .merge(routes_for("/diet-plans", Collection::DietPlans))
        .merge(routes_for("/exercise-plans", Collection::ExercisePlans))
        .merge(routes_for("/detox-plans", Collection::DetoxPlans))
}

fn routes_for(base: &str, collection: Collection) -> Router<AppState> {
    Router::new().route(
        &format!("{}/:user_id", base),
        get(move |State(state): State<AppState>, Path(user_id): Path<String>| async move {
            get_plan(&state, collection, &user_id).await
        })
        .post(
            move |State(state): State<AppState>,
                  Path(user_id): Path<String>,
                  JsonBody(body): JsonBody<Record>| async move {
                save_plan(&state, collection, &user_id, body).await
            },
        )
        .delete(move |State(state): State<AppState>, Path(user_id): Path<String>| async move {
            delete_plan(&state, collection, &user_id).await
        }),
    )
}

async fn get_plan(
    state: &AppState,
    collection: Collection,
    user_id: &str,
) -> AppResult<Json<Option<Record>>> {
    let plan = state
        .db
        .get_by_field(collection, "userId", user_id)
        .await?
        .into_iter()
        .next();
    debug!(%collection, %user_id, found = plan.is_some(), "legacy plan lookup");
    Ok(Json(plan))
}

async fn save_plan(
    state: &AppState,
    collection: Collection,
    user_id: &str,
    mut body: Record,
) -> AppResult<Json<Record>> {
    body.insert("userId".into(), json!(user_id));
    body.insert("updatedAt".into(), json!(now_iso()));
    let saved = state.db.upsert(collection, "userId", user_id, body).await?;
    info!(%collection, %user_id, "legacy plan saved");
    Ok(Json(saved))
}

async fn delete_plan(
    state: &AppState,
    collection: Collection,
    user_id: &str,
) -> AppResult<Json<Value>> {
    let removed = state
        .db
        .delete_by_field(collection, "userId", user_id)
        .await?;
    info!(%collection, %user_id, removed, "legacy plan deleted");
    Ok(Json(json!({ "success": true })))
}
