use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use time::{macros::format_description, Date};
use tracing::{info, instrument, warn};

use crate::{
    db::{from_record, new_id, now_iso, to_record},
    error::{AppError, AppResult},
    extractors::JsonBody,
    plans::repo_types::{DailyDetoxPlan, DailyDietPlan, DailyExercisePlan, DailyPlan},
    state::AppState,
    store::Record,
};

pub fn daily_routes() -> Router<AppState> {
    Router::new()
        .merge(routes_for::<DailyDietPlan>("/daily-diet-plans"))
        .merge(routes_for::<DailyExercisePlan>("/daily-exercise-plans"))
        .merge(routes_for::<DailyDetoxPlan>("/daily-detox-plans"))
}

fn routes_for<P: DailyPlan>(base: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/:user_id", base),
            get(list_plans::<P>).post(save_plan::<P>),
        )
        .route(
            &format!("{}/:user_id/:date", base),
            get(get_plan::<P>).delete(delete_plan::<P>),
        )
}

fn parse_day(date: &str) -> AppResult<Date> {
    Date::parse(date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date)))
}

/// Latest row per date, ordered by date.
#[instrument(skip(state))]
pub async fn list_plans<P: DailyPlan>(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<P>>> {
    let plans: Vec<P> = state.db.find_by("userId", user_id.as_str()).await?;
    let by_date: BTreeMap<String, P> = plans
        .into_iter()
        .map(|p| (p.date().to_string(), p))
        .collect();
    Ok(Json(by_date.into_values().collect()))
}

#[instrument(skip(state))]
pub async fn get_plan<P: DailyPlan>(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(String, String)>,
) -> AppResult<Json<Option<P>>> {
    let plans: Vec<P> = state.db.find_by("userId", user_id.as_str()).await?;
    Ok(Json(plans.into_iter().rev().find(|p| p.date() == date)))
}

/// Update-or-insert keyed on `(userId, date)`.
#[instrument(skip(state, input))]
pub async fn save_plan<P: DailyPlan>(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(mut input): JsonBody<P::Input>,
) -> AppResult<Json<P>> {
    let date = P::input_date(&input).to_string();
    if let Err(e) = parse_day(&date) {
        warn!(%user_id, %date, "rejecting {} with bad date", P::LABEL);
        return Err(e);
    }

    P::fill_totals(&mut input);
    let mut patch = to_record(P::COLLECTION, &input)?;
    for key in ["id", "userId", "createdAt"] {
        patch.remove(key);
    }
    patch.insert("updatedAt".into(), json!(now_iso()));

    let keys = [
        ("userId", Value::from(user_id.as_str())),
        ("date", Value::from(date.as_str())),
    ];
    let seed = || {
        let mut row = Record::new();
        row.insert("id".into(), json!(new_id(P::ID_PREFIX)));
        row.insert("userId".into(), json!(user_id));
        row.insert("date".into(), json!(date));
        row.insert("createdAt".into(), json!(now_iso()));
        row
    };
    let row = state
        .db
        .upsert_with(P::COLLECTION, &keys, patch, seed)
        .await?;
    let plan: P = from_record(P::COLLECTION, row)?;

    info!(%user_id, %date, plan_id = plan.id(), "{} saved", P::LABEL);
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn delete_plan<P: DailyPlan>(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let plans: Vec<P> = state.db.find_by("userId", user_id.as_str()).await?;
    for plan in plans.iter().filter(|p| p.date() == date) {
        state.db.remove::<P>(plan.id()).await?;
    }
    Ok(Json(json!({ "success": true })))
}
