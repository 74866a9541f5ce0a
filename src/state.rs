use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::store::{JsonFileStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Opens the JSON file store under `config.data_dir`.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(JsonFileStore::open(&config.data_dir).await?) as Arc<dyn RecordStore>;
        Ok(Self::from_parts(Arc::new(Database::new(store)), Arc::new(config)))
    }

    pub fn from_parts(db: Arc<Database>, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// In-memory store with test settings.
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(Database::in_memory()),
            Arc::new(AppConfig::for_tests("unused")),
        )
    }
}
