use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    error::{AppError, AppResult},
    extractors::JsonBody,
    state::AppState,
    users::{
        repo_types::{DataCounts, PublicUser, User, UserPatch},
        services,
    },
};

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub success: bool,
    pub user: PublicUser,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/data-counts", get(data_counts))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicUser>>> {
    let users: Vec<User> = state.db.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PublicUser>> {
    state
        .db
        .find::<User>(&id)
        .await?
        .map(|u| Json(PublicUser::from(u)))
        .ok_or_else(|| AppError::not_found("User"))
}

/// Admin-side creation; `isAdmin` is honoured here, unlike registration.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<User>,
) -> AppResult<Json<CreatedUser>> {
    let user = services::create_user(&state.db, payload).await?;
    Ok(Json(CreatedUser {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, patch))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> AppResult<Json<PublicUser>> {
    let updated = services::update_user(&state.db, &id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    info!(user_id = %id, "user updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    if !services::delete_user_cascade(&state.db, &id).await? {
        return Err(AppError::not_found("User"));
    }
    info!(user_id = %id, "user and owned data deleted");
    Ok(Json(json!({
        "success": true,
        "message": "User and all related data deleted"
    })))
}

#[instrument(skip(state))]
pub async fn data_counts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataCounts>> {
    Ok(Json(services::data_counts(&state.db, &id).await?))
}
