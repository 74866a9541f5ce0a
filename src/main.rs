use nutridesk::{app, config::AppConfig, seed, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutridesk=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "opening store");
    let app_state = AppState::init(config).await?;

    let report = seed::initialize_defaults(&app_state.db, &app_state.config).await?;
    tracing::info!(?report, "defaults checked");

    let listener = app::bind(&app_state.config).await?;
    app::serve(listener, app::build_app(app_state)).await
}
