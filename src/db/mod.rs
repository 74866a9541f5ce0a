//! Entity-agnostic CRUD over the record store.
//!
//! Every mutating call holds its collection's lock for the whole
//! read-modify-write cycle, so concurrent requests inside one process never
//! lose each other's writes. Nothing spans collections: a multi-collection
//! sequence (such as the user delete cascade) can still stop halfway.

use std::sync::Arc;

use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::store::{Collection, MemoryStore, Record, RecordStore, StoreError};

mod entity;

pub use entity::Entity;
pub(crate) use entity::{from_record, to_record};

/// `"<prefix>-<uuid>"`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Current UTC time as RFC 3339.
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Shallow merge; `id` is identity and never rewritten.
fn merge(target: &mut Record, patch: Record) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        target.insert(key, value);
    }
}

fn id_matches(record: &Record, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

/// Result of a write guarded by a conflict check.
#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    Written(T),
    Conflict,
    Missing,
}

pub struct Database {
    store: Arc<dyn RecordStore>,
    locks: [Mutex<()>; Collection::COUNT],
}

impl Database {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        self.locks[collection as usize].lock().await
    }

    pub async fn get_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        self.store.read_collection(collection).await
    }

    /// First record whose `id` matches.
    pub async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Record>, StoreError> {
        Ok(self
            .store
            .read_collection(collection)
            .await?
            .into_iter()
            .find(|r| id_matches(r, id)))
    }

    /// All records where `field` equals `value` exactly.
    pub async fn get_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>, StoreError> {
        let value = value.into();
        Ok(self
            .store
            .read_collection(collection)
            .await?
            .into_iter()
            .filter(|r| r.get(field) == Some(&value))
            .collect())
    }

    pub async fn count_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<usize, StoreError> {
        Ok(self.get_by_field(collection, field, value).await?.len())
    }

    /// Appends without checking for an existing id.
    pub async fn add(&self, collection: Collection, record: Record) -> Result<Record, StoreError> {
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        rows.push(record.clone());
        self.store.write_collection(collection, &rows).await?;
        debug!(%collection, rows = rows.len(), "record added");
        Ok(record)
    }

    /// Appends `record` unless some existing row `conflicts`. The check and
    /// the write happen under one lock.
    pub async fn add_unless<F>(
        &self,
        collection: Collection,
        record: Record,
        conflicts: F,
    ) -> Result<Guarded<Record>, StoreError>
    where
        F: Fn(&Record) -> bool,
    {
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        if rows.iter().any(|r| conflicts(r)) {
            debug!(%collection, "add refused on conflict");
            return Ok(Guarded::Conflict);
        }
        rows.push(record.clone());
        self.store.write_collection(collection, &rows).await?;
        debug!(%collection, rows = rows.len(), "record added");
        Ok(Guarded::Written(record))
    }

    /// `update` that is refused when a row other than `id` `conflicts`.
    pub async fn update_unless<F>(
        &self,
        collection: Collection,
        id: &str,
        patch: Record,
        conflicts: F,
    ) -> Result<Guarded<Record>, StoreError>
    where
        F: Fn(&Record) -> bool,
    {
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        if rows.iter().any(|r| !id_matches(r, id) && conflicts(r)) {
            debug!(%collection, %id, "update refused on conflict");
            return Ok(Guarded::Conflict);
        }
        let Some(row) = rows.iter_mut().find(|r| id_matches(r, id)) else {
            return Ok(Guarded::Missing);
        };
        merge(row, patch);
        let updated = row.clone();
        self.store.write_collection(collection, &rows).await?;
        debug!(%collection, %id, "record updated");
        Ok(Guarded::Written(updated))
    }

    /// Shallow-merges `patch` into the record with `id`; `None` when absent.
    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Record,
    ) -> Result<Option<Record>, StoreError> {
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        let Some(row) = rows.iter_mut().find(|r| id_matches(r, id)) else {
            return Ok(None);
        };
        merge(row, patch);
        let updated = row.clone();
        self.store.write_collection(collection, &rows).await?;
        debug!(%collection, %id, "record updated");
        Ok(Some(updated))
    }

    /// Removes every record with `id`; true if anything went.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        let before = rows.len();
        rows.retain(|r| !id_matches(r, id));
        if rows.len() == before {
            return Ok(false);
        }
        self.store.write_collection(collection, &rows).await?;
        debug!(%collection, %id, "record deleted");
        Ok(true)
    }

    /// Removes every record where `field` equals `value`; returns the count.
    pub async fn delete_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<usize, StoreError> {
        let value = value.into();
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        let before = rows.len();
        rows.retain(|r| r.get(field) != Some(&value));
        let removed = before - rows.len();
        if removed > 0 {
            self.store.write_collection(collection, &rows).await?;
        }
        debug!(%collection, field, removed, "records deleted by field");
        Ok(removed)
    }

    /// Update-if-match-else-append on a single key field.
    pub async fn upsert(
        &self,
        collection: Collection,
        key_field: &str,
        key_value: impl Into<Value>,
        record: Record,
    ) -> Result<Record, StoreError> {
        self.upsert_with(collection, &[(key_field, key_value.into())], record, Record::new)
            .await
    }

    /// Update-if-match-else-append on a composite key.
    ///
    /// On a match `patch` is shallow-merged into the latest matching row. On a
    /// miss the new row is `seed()` with `patch` laid over it.
    pub async fn upsert_with<F>(
        &self,
        collection: Collection,
        keys: &[(&str, Value)],
        patch: Record,
        seed: F,
    ) -> Result<Record, StoreError>
    where
        F: FnOnce() -> Record,
    {
        let _guard = self.lock(collection).await;
        let mut rows = self.store.read_collection(collection).await?;
        let matches = |r: &Record| keys.iter().all(|(field, value)| r.get(*field) == Some(value));

        let row = match rows.iter().rposition(matches) {
            Some(idx) => {
                merge(&mut rows[idx], patch);
                rows[idx].clone()
            }
            None => {
                let mut row = seed();
                row.extend(patch);
                rows.push(row.clone());
                row
            }
        };

        self.store.write_collection(collection, &rows).await?;
        debug!(%collection, "record upserted");
        Ok(row)
    }

    /// Replaces a whole collection.
    pub async fn replace_all(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<(), StoreError> {
        let _guard = self.lock(collection).await;
        self.store.write_collection(collection, &records).await
    }
}
