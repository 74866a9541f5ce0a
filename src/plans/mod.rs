pub mod handlers;
pub mod legacy;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(legacy::legacy_routes())
        .merge(handlers::daily_routes())
}
