use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use nutridesk::{
    app::build_app,
    config::AppConfig,
    seed,
    state::AppState,
    store::{Collection, JsonFileStore, RecordStore},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> (TempDir, AppState, Router) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::init(AppConfig::for_tests(temp_dir.path()))
        .await
        .expect("Failed to open test store");
    let app = build_app(state.clone());
    (temp_dir, state, app)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn register_then_login_hides_password_and_rejects_wrong_one() {
    let (_dir, _state, app) = test_app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct-horse",
            "fullName": "Alice Yilmaz"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    assert_eq!(body["success"], true);
    assert!(body["user"].get("password").is_none());
    assert_eq!(body["user"]["isAdmin"], false);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "alice", "password": "correct-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password").is_none());
    assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "alice", "password": "wrong-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let (_dir, _state, app) = test_app().await;
    let payload = json!({
        "username": "bora",
        "email": "bora@example.com",
        "password": "secret-pass"
    });

    let (status, _) = call(&app, Method::POST, "/api/auth/register", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::POST, "/api/auth/register", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"username": "cem", "email": "not-an-email", "password": "secret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn daily_diet_plan_persists_caller_totals() {
    let (_dir, _state, app) = test_app().await;

    let (status, saved) = call(
        &app,
        Method::POST,
        "/api/daily-diet-plans/u1",
        Some(json!({
            "date": "2024-01-01",
            "meals": [
                {"id": "m1", "name": "Kahvalti", "time": "08:00", "foods": [], "totalCalories": 200, "notes": ""},
                {"id": "m2", "name": "Aksam", "time": "19:00", "foods": [], "totalCalories": 300, "notes": ""}
            ],
            "totalCalories": 500,
            "waterIntake": 2.5,
            "notes": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "save failed: {}", saved);
    assert!(saved["id"].as_str().unwrap().starts_with("ddp-"));

    let (status, plan) = call(&app, Method::GET, "/api/daily-diet-plans/u1/2024-01-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["userId"], "u1");
    assert_eq!(plan["totalCalories"], 500.0);
    assert_eq!(plan["meals"].as_array().unwrap().len(), 2);

    let (status, none) = call(&app, Method::GET, "/api/daily-diet-plans/u1/2024-01-02", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(none.is_null());

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/daily-diet-plans/u1",
        Some(json!({"date": "01/01/2024"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_saves_for_one_day_leave_one_row() {
    let (_dir, state, app) = test_app().await;

    let saves = (0..8).map(|i| {
        let app = app.clone();
        async move {
            call(
                &app,
                Method::POST,
                "/api/daily-exercise-plans/u9",
                Some(json!({"date": "2024-03-10", "notes": format!("save {}", i)})),
            )
            .await
        }
    });
    for (status, _) in spawn_all(saves).await {
        assert_eq!(status, StatusCode::OK);
    }

    let rows = state
        .db
        .get_by_field(Collection::DailyExercisePlans, "userId", "u9")
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

async fn spawn_all<F>(futures: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut out = Vec::with_capacity(handles.len());
    for h in handles {
        out.push(h.await.unwrap());
    }
    out
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_of_one_name_leave_one_user() {
    let (_dir, state, app) = test_app().await;

    let attempts = (0..6).map(|_| {
        let app = app.clone();
        async move {
            call(
                &app,
                Method::POST,
                "/api/auth/register",
                Some(json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "correct-horse"
                })),
            )
            .await
        }
    });
    let statuses: Vec<StatusCode> = spawn_all(attempts)
        .await
        .into_iter()
        .map(|(status, _)| status)
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::OK || *s == StatusCode::CONFLICT));
    let users = state
        .db
        .get_by_field(Collection::Users, "username", "alice")
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn malformed_bodies_get_the_common_error_body() {
    let (_dir, _state, app) = test_app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"email": "x@example.com", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn short_passwords_and_mixed_case_email_logins_are_accepted() {
    let (_dir, _state, app) = test_app().await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"username": "ece", "email": "Ece@Example.com", "password": "1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", created);
    assert_eq!(created["user"]["email"], "ece@example.com");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "Ece@Example.com", "password": "1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["user"]["username"], "ece");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"username": "emre", "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_numeric_fields_are_stored_as_zero() {
    let (dir, _state, app) = test_app().await;

    let (status, food) = call(
        &app,
        Method::POST,
        "/api/food-items",
        Some(json!({"name": "Tarhana", "calories": null, "protein": null, "servingSize": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "food failed: {}", food);
    assert_eq!(food["calories"], 0.0);

    let (status, recipe) = call(
        &app,
        Method::POST,
        "/api/recipes",
        Some(json!({"name": "Corba", "servings": null, "prepTime": null, "ingredients": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "recipe failed: {}", recipe);

    let path = dir.path().join("foodItems.json");
    let mut rows: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    rows.push(json!({"id": "food-legacy", "name": "Eski", "calories": null, "fat": null}));
    std::fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();

    let (status, listed) = call(&app, Method::GET, "/api/food-items", None).await;
    assert_eq!(status, StatusCode::OK, "list failed: {}", listed);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_owned_collections() {
    let (_dir, state, app) = test_app().await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "deniz",
            "email": "deniz@example.com",
            "password": "deniz-pass",
            "fullName": "Deniz Kaya",
            "weight": 70,
            "height": 175
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", created);
    let id = created["user"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["user"]["bmi"], 22.9);

    let writes = [
        (format!("/api/weight-records/{}", id), json!({"date": "2024-01-01", "weight": 70})),
        (format!("/api/measurements/{}", id), json!({"date": "2024-01-01", "waist": 80})),
        (format!("/api/daily-diet-plans/{}", id), json!({"date": "2024-01-01"})),
        (format!("/api/daily-exercise-plans/{}", id), json!({"date": "2024-01-01"})),
        (format!("/api/daily-detox-plans/{}", id), json!({"date": "2024-01-01"})),
        (format!("/api/diet-plans/{}", id), json!({"breakfast": "Yulaf"})),
        (format!("/api/exercise-plans/{}", id), json!({"monday": "Yuruyus"})),
        (format!("/api/detox-plans/{}", id), json!({"morning": "Limonlu su"})),
        (format!("/api/folders/{}", id), json!({"name": "Tahliller"})),
    ];
    for (uri, body) in writes {
        let (status, res) = call(&app, Method::POST, &uri, Some(body)).await;
        assert_eq!(status, StatusCode::OK, "{} failed: {}", uri, res);
    }

    let (_, counts) = call(&app, Method::GET, &format!("/api/users/{}/data-counts", id), None).await;
    assert_eq!(
        counts,
        json!({
            "dietPlans": 1, "exercisePlans": 1, "detoxPlans": 1,
            "weightRecords": 1, "measurements": 1, "folders": 2
        })
    );

    let (status, body) = call(&app, Method::DELETE, &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    for collection in Collection::USER_OWNED {
        let left = state
            .db
            .get_by_field(collection, "userId", id.as_str())
            .await
            .unwrap();
        assert!(left.is_empty(), "{} still holds rows", collection);
    }

    let (status, _) = call(&app, Method::GET, &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, Method::DELETE, &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn catalog_errors_use_the_common_body() {
    let (_dir, _state, app) = test_app().await;

    let (status, body) = call(&app, Method::GET, "/api/food-items/food-nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Food item not found"}));

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/detox-items",
        Some(json!({"name": "Rezene Cayi", "servingSize": 200, "servingUnit": "ml", "id": "client-id"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap();
    assert!(id.starts_with("detox-"));
    assert_eq!(created["servingSize"], "200");

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/detox-items/{}", id),
        Some(json!({"bestTime": "Aksam", "id": "hijack"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["bestTime"], "Aksam");
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, _state, app) = test_app().await;
    let (status, body) = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn data_survives_reopening_the_store() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig::for_tests(temp_dir.path());

    {
        let state = AppState::init(config.clone()).await.unwrap();
        let report = seed::initialize_defaults(&state.db, &state.config).await.unwrap();
        assert!(report.admin_created);
        let app = build_app(state);
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/weight-records/admin-001",
            Some(json!({"date": "2024-06-01", "weight": 59.5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let store = JsonFileStore::open(temp_dir.path()).await.unwrap();
    let rows = store.read_collection(Collection::WeightRecords).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["weight"], 59.5);
    assert!(temp_dir.path().join("users.json").exists());
    assert!(!temp_dir.path().join("weightRecords.json.tmp").exists());

    let state = AppState::init(config).await.unwrap();
    let again = seed::initialize_defaults(&state.db, &state.config).await.unwrap();
    assert!(again.up_to_date);

    let app = build_app(state);
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "admin@admin.com", "password": "admin123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isAdmin"], true);
}
