use nutridesk::{
    app::build_app,
    catalog::repo_types::FoodItem,
    client::{ApiClient, PlanKind},
    config::AppConfig,
    plans::repo_types::DailyDietPlanInput,
    progress::repo_types::WeightRecord,
    seed,
    state::AppState,
};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn spawn_server() -> (TempDir, ApiClient) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::init(AppConfig::for_tests(temp_dir.path()))
        .await
        .unwrap();
    seed::initialize_defaults(&state.db, &state.config)
        .await
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (temp_dir, ApiClient::new(format!("http://{}/", addr)))
}

#[tokio::test]
async fn client_walks_the_main_flows() {
    let (_dir, client) = spawn_server().await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");

    let auth = client.login("admin", "admin123").await.unwrap();
    assert!(auth.user.is_admin);
    let client = client.with_token(auth.access_token.clone());
    let me = client.me().await.unwrap();
    assert_eq!(me.id, "admin-001");

    let foods = client.food_items().await.unwrap();
    assert!(!foods.is_empty());
    assert!(client.food_item("food-missing").await.unwrap().is_none());

    let new_food: FoodItem = serde_json::from_value(json!({
        "name": "Karabugday",
        "category": "Tahil",
        "calories": 343,
        "protein": 13.3,
        "carbs": 71.5,
        "fat": 3.4,
        "servingSize": "100",
        "servingUnit": "g"
    }))
    .unwrap();
    let created = client.create_food_item(&new_food).await.unwrap();
    assert!(created.id.starts_with("food-"));
    let fetched = client.food_item(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Karabugday");
    assert!(client.delete_food_item(&created.id).await.unwrap().success);

    let plan: DailyDietPlanInput = serde_json::from_value(json!({
        "date": "2024-05-01",
        "totalCalories": 1800,
        "waterIntake": 2.0
    }))
    .unwrap();
    let saved = client.save_daily_diet_plan("admin-001", &plan).await.unwrap();
    assert_eq!(saved.date, "2024-05-01");
    let again = client
        .daily_diet_plan("admin-001", "2024-05-01")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.id, saved.id);
    assert_eq!(again.total_calories, Some(1800.0));

    let record: WeightRecord = serde_json::from_value(json!({
        "date": "2024-05-01",
        "weight": 61.2
    }))
    .unwrap();
    let stored = client.add_weight_record("admin-001", &record).await.unwrap();
    let records = client.weight_records("admin-001").await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(client.delete_weight_record(&stored.id).await.unwrap().success);

    assert!(client
        .legacy_plan(PlanKind::Detox, "admin-001")
        .await
        .unwrap()
        .is_none());

    let folders = client.folders("admin-001").await.unwrap();
    let folder = client.create_folder("admin-001", "Kontroller").await.unwrap();
    assert_eq!(client.folders("admin-001").await.unwrap().len(), folders.len() + 1);
    let renamed = client.rename_folder(&folder.id, "Kontrol").await.unwrap();
    assert_eq!(renamed.name, "Kontrol");
}

#[tokio::test]
async fn client_surfaces_api_errors() {
    let (_dir, client) = spawn_server().await;

    let err = client.login("admin", "not-the-password").await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let err = client.me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    assert!(client.user("u-missing").await.unwrap().is_none());
}
