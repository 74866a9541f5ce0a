use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    db::{new_id, now_iso, Entity},
    error::{AppError, AppResult},
    extractors::JsonBody,
    folders::repo_types::{FolderPatch, UserFolder},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

// `:id` is the owner's user id for GET/POST and the folder id for PUT/DELETE.
pub fn folder_routes() -> Router<AppState> {
    Router::new().route(
        "/folders/:id",
        get(list_folders)
            .post(create_folder)
            .put(update_folder)
            .delete(delete_folder),
    )
}

#[instrument(skip(state))]
pub async fn list_folders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<UserFolder>>> {
    Ok(Json(state.db.find_by("userId", user_id.as_str()).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_folder(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(payload): JsonBody<CreateFolderRequest>,
) -> AppResult<Json<UserFolder>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Folder name is required".into()));
    }
    let folder = UserFolder {
        id: new_id(UserFolder::ID_PREFIX),
        user_id,
        name: name.to_string(),
        created_at: now_iso(),
    };
    state.db.insert(&folder).await?;
    info!(folder_id = %folder.id, user_id = %folder.user_id, "folder created");
    Ok(Json(folder))
}

#[instrument(skip(state, patch))]
pub async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<FolderPatch>,
) -> AppResult<Json<UserFolder>> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Folder name is required".into()));
    }
    state
        .db
        .patch::<UserFolder, _>(&id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Folder"))
}

#[instrument(skip(state))]
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = state.db.remove::<UserFolder>(&id).await?;
    Ok(Json(json!({ "success": deleted })))
}
