use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest},
        jwt::{AuthUser, JwtKeys},
        password,
        services::issue_tokens,
    },
    db::Database,
    error::{AppError, AppResult},
    extractors::JsonBody,
    state::AppState,
    users::{
        repo_types::{PublicUser, User, UserPatch},
        services::create_user,
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(get_me))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid username or password".into())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<User>,
) -> AppResult<Json<AuthResponse>> {
    if payload.email.trim().is_empty() {
        warn!(username = %payload.username, "register without email");
        return Err(AppError::BadRequest("Email is required".into()));
    }
    payload.is_admin = false;

    let user = create_user(&state.db, payload).await?;
    info!(user_id = %user.id, "user registered");
    Ok(Json(issue_tokens(&JwtKeys::from_ref(&state), user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let login = payload.username.trim();
    let Some(user) = User::find_by_login(&state.db, login).await? else {
        warn!("login unknown user");
        return Err(invalid_credentials());
    };

    let ok = password::verify_stored(&payload.password, &user.password).map_err(|e| {
        error!(error = %e, user_id = %user.id, "stored password unreadable");
        AppError::Internal(e.to_string())
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    let user = if password::is_hashed(&user.password) {
        user
    } else {
        upgrade_password(&state.db, user, &payload.password).await?
    };

    info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&JwtKeys::from_ref(&state), user)?))
}

/// Replaces a plain-text password row with its hash.
async fn upgrade_password(db: &Database, user: User, plain: &str) -> AppResult<User> {
    let patch = UserPatch {
        password: Some(password::hash_password(plain)?),
        ..Default::default()
    };
    let id = user.id.clone();
    let upgraded = db.patch::<User, _>(&id, &patch).await?.unwrap_or(user);
    info!(user_id = %id, "plain-text password re-hashed");
    Ok(upgraded)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("Invalid or expired refresh token".into())
    })?;

    let user = state
        .db
        .find::<User>(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .db
        .find::<User>(&user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(user.into()))
}
