use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    db::{new_id, now_iso},
    error::{AppError, AppResult},
    extractors::JsonBody,
    progress::repo_types::{Measurement, ProgressEntry, WeightRecord},
    state::AppState,
};

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .merge(routes_for::<WeightRecord>("/weight-records"))
        .merge(routes_for::<Measurement>("/measurements"))
}

// `:id` is the owner's user id for GET/POST and the row id for DELETE.
fn routes_for<E: ProgressEntry>(base: &str) -> Router<AppState> {
    Router::new().route(
        &format!("{}/:id", base),
        get(list_entries::<E>)
            .post(add_entry::<E>)
            .delete(delete_entry::<E>),
    )
}

/// Newest date first.
#[instrument(skip(state))]
pub async fn list_entries<E: ProgressEntry>(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<E>>> {
    let mut entries: Vec<E> = state.db.find_by("userId", user_id.as_str()).await?;
    entries.sort_by(|a, b| b.date().cmp(a.date()));
    Ok(Json(entries))
}

#[instrument(skip(state, entry))]
pub async fn add_entry<E: ProgressEntry>(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(mut entry): JsonBody<E>,
) -> AppResult<Json<E>> {
    if entry.date().trim().is_empty() {
        return Err(AppError::BadRequest("date is required".into()));
    }
    entry.assign_id(new_id(E::ID_PREFIX));
    entry.stamp(&user_id, now_iso());
    state.db.insert(&entry).await?;
    info!(%user_id, id = entry.id(), "{} added", E::LABEL);
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn delete_entry<E: ProgressEntry>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = state.db.remove::<E>(&id).await?;
    Ok(Json(json!({ "success": deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(date: &str, kg: f64) -> WeightRecord {
        serde_json::from_value(json!({"date": date, "weight": kg})).unwrap()
    }

    #[tokio::test]
    async fn history_is_newest_first_and_owned() {
        let state = AppState::fake();
        for (date, kg) in [("2024-01-01", 70.0), ("2024-03-01", 67.5), ("2024-02-01", 68.8)] {
            add_entry::<WeightRecord>(
                State(state.clone()),
                Path("u1".into()),
                JsonBody(weight(date, kg)),
            )
            .await
            .unwrap();
        }

        let list = list_entries::<WeightRecord>(State(state.clone()), Path("u1".into()))
            .await
            .unwrap()
            .0;
        let dates: Vec<_> = list.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-03-01", "2024-02-01", "2024-01-01"]);
        assert!(list.iter().all(|r| r.user_id == "u1" && r.id.starts_with("wr-")));

        let removed = delete_entry::<WeightRecord>(State(state.clone()), Path(list[0].id.clone()))
            .await
            .unwrap()
            .0;
        assert_eq!(removed, json!({"success": true}));
        let again = delete_entry::<WeightRecord>(State(state), Path(list[0].id.clone()))
            .await
            .unwrap()
            .0;
        assert_eq!(again, json!({"success": false}));
    }

    #[tokio::test]
    async fn measurement_keeps_partial_fields() {
        let state = AppState::fake();
        let m: Measurement =
            serde_json::from_value(json!({"date": "2024-05-05", "waist": 82.5})).unwrap();
        let saved = add_entry::<Measurement>(State(state), Path("u2".into()), JsonBody(m))
            .await
            .unwrap()
            .0;
        assert!(saved.id.starts_with("ms-"));
        assert_eq!(saved.waist, Some(82.5));
        assert_eq!(saved.chest, None);
    }
}
