use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error, info};

use super::{Collection, Record, RecordStore, StoreError, StoreMeta};

const META_FILE: &str = "meta.json";

/// One pretty-printed JSON array per collection under `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates `dir` and an empty array file for every missing collection.
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create data dir {}", dir.display()))?;

        for collection in Collection::ALL {
            let path = dir.join(collection.file_name());
            if !fs::try_exists(&path).await.unwrap_or(false) {
                fs::write(&path, b"[]")
                    .await
                    .with_context(|| format!("create {}", path.display()))?;
                debug!(collection = %collection, "created empty collection file");
            }
        }

        info!(dir = %dir.display(), "json file store opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    /// Writes through a sibling temp file and renames it over the target.
    async fn replace_file(&self, path: &Path, name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        let io = |source| StoreError::Io {
            name: name.to_string(),
            source,
        };
        fs::write(&tmp, bytes).await.map_err(io)?;
        fs::rename(&tmp, path).await.map_err(io)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let path = self.path_of(collection);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                error!(collection = %collection, error = %source, "read collection failed");
                return Err(StoreError::Io {
                    name: collection.name().to_string(),
                    source,
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|source| {
            error!(collection = %collection, error = %source, "collection file is corrupt");
            StoreError::Corrupt {
                name: collection.name().to_string(),
                source,
            }
        })
    }

    async fn write_collection(
        &self,
        collection: Collection,
        records: &[Record],
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records).map_err(|source| StoreError::Encode {
            name: collection.name().to_string(),
            source,
        })?;
        let path = self.path_of(collection);
        self.replace_file(&path, collection.name(), bytes)
            .await
            .map_err(|e| {
                error!(collection = %collection, error = %e, "write collection failed");
                e
            })?;
        debug!(collection = %collection, rows = records.len(), "collection written");
        Ok(())
    }

    async fn read_meta(&self) -> Result<StoreMeta, StoreError> {
        let path = self.dir.join(META_FILE);
        match fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                name: META_FILE.to_string(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreMeta::default()),
            Err(source) => Err(StoreError::Io {
                name: META_FILE.to_string(),
                source,
            }),
        }
    }

    async fn write_meta(&self, meta: &StoreMeta) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(meta).map_err(|source| StoreError::Encode {
            name: META_FILE.to_string(),
            source,
        })?;
        let path = self.dir.join(META_FILE);
        self.replace_file(&path, META_FILE, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> Record {
        v.as_object().cloned().expect("object literal")
    }

    #[tokio::test]
    async fn open_creates_every_collection_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path().join("data")).await.unwrap();
        for c in Collection::ALL {
            let raw = std::fs::read_to_string(store.dir().join(c.file_name())).unwrap();
            assert_eq!(raw, "[]");
        }
    }

    #[tokio::test]
    async fn open_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("users.json"), r#"[{"id":"u1"}]"#).unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        let users = store.read_collection(Collection::Users).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], "u1");
    }

    #[tokio::test]
    async fn write_is_pretty_and_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        let rows = vec![record(json!({"id": "food-1", "name": "Elma", "calories": 52}))];
        store
            .write_collection(Collection::FoodItems, &rows)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(tmp.path().join("foodItems.json")).unwrap();
        assert!(raw.contains("\n  {"));
        assert!(!tmp.path().join("foodItems.json.tmp").exists());
        assert_eq!(store.read_collection(Collection::FoodItems).await.unwrap(), rows);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_an_empty_list() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        std::fs::write(tmp.path().join("recipes.json"), "{ not json").unwrap();
        let err = store.read_collection(Collection::Recipes).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        std::fs::remove_file(tmp.path().join("measurements.json")).unwrap();
        assert!(store
            .read_collection(Collection::Measurements)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn meta_defaults_then_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        assert_eq!(store.read_meta().await.unwrap().seed_version, 0);
        store
            .write_meta(&StoreMeta { seed_version: 3 })
            .await
            .unwrap();
        assert_eq!(store.read_meta().await.unwrap().seed_version, 3);
    }
}
