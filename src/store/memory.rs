use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Collection, Record, RecordStore, StoreError, StoreMeta};

/// Process-local backend with the same semantics as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Record>>>,
    meta: Mutex<StoreMeta>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let guard = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    async fn write_collection(
        &self,
        collection: Collection,
        records: &[Record],
    ) -> Result<(), StoreError> {
        let mut guard = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        guard.insert(collection, records.to_vec());
        Ok(())
    }

    async fn read_meta(&self) -> Result<StoreMeta, StoreError> {
        Ok(self.meta.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    async fn write_meta(&self, meta: &StoreMeta) -> Result<(), StoreError> {
        *self.meta.lock().unwrap_or_else(|p| p.into_inner()) = meta.clone();
        Ok(())
    }
}
