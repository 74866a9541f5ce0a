use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{Database, Guarded};
use crate::store::{Collection, Record, StoreError};

/// A typed view over one collection's rows.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn assign_id(&mut self, id: String);
}

pub(crate) fn to_record<T: Serialize>(
    collection: Collection,
    value: &T,
) -> Result<Record, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Encode {
            name: collection.name().to_string(),
            source: serde::ser::Error::custom("value is not a JSON object"),
        }),
        Err(source) => Err(StoreError::Encode {
            name: collection.name().to_string(),
            source,
        }),
    }
}

pub(crate) fn from_record<T: DeserializeOwned>(
    collection: Collection,
    record: Record,
) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(record)).map_err(|source| StoreError::Corrupt {
        name: collection.name().to_string(),
        source,
    })
}

impl Database {
    pub async fn list<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        self.get_all(T::COLLECTION)
            .await?
            .into_iter()
            .map(|r| from_record(T::COLLECTION, r))
            .collect()
    }

    pub async fn find<T: Entity>(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.get_by_id(T::COLLECTION, id)
            .await?
            .map(|r| from_record(T::COLLECTION, r))
            .transpose()
    }

    pub async fn find_by<T: Entity>(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<T>, StoreError> {
        self.get_by_field(T::COLLECTION, field, value)
            .await?
            .into_iter()
            .map(|r| from_record(T::COLLECTION, r))
            .collect()
    }

    pub async fn insert<T: Entity>(&self, entity: &T) -> Result<(), StoreError> {
        let record = to_record(T::COLLECTION, entity)?;
        self.add(T::COLLECTION, record).await?;
        tracing::debug!(collection = %T::COLLECTION, id = entity.id(), "entity inserted");
        Ok(())
    }

    /// Applies a typed patch whose `None` fields serialize to nothing.
    pub async fn patch<T: Entity, P: Serialize>(
        &self,
        id: &str,
        patch: &P,
    ) -> Result<Option<T>, StoreError> {
        let patch = to_record(T::COLLECTION, patch)?;
        self.update(T::COLLECTION, id, patch)
            .await?
            .map(|r| from_record(T::COLLECTION, r))
            .transpose()
    }

    /// `insert` refused with `Guarded::Conflict` when an existing row clashes.
    pub async fn insert_unless<T: Entity, F>(
        &self,
        entity: &T,
        conflicts: F,
    ) -> Result<Guarded<()>, StoreError>
    where
        F: Fn(&Record) -> bool,
    {
        let record = to_record(T::COLLECTION, entity)?;
        Ok(match self.add_unless(T::COLLECTION, record, conflicts).await? {
            Guarded::Written(_) => Guarded::Written(()),
            Guarded::Conflict => Guarded::Conflict,
            Guarded::Missing => Guarded::Missing,
        })
    }

    /// `patch` refused with `Guarded::Conflict` when another row clashes.
    pub async fn patch_unless<T: Entity, P: Serialize, F>(
        &self,
        id: &str,
        patch: &P,
        conflicts: F,
    ) -> Result<Guarded<T>, StoreError>
    where
        F: Fn(&Record) -> bool,
    {
        let patch = to_record(T::COLLECTION, patch)?;
        Ok(
            match self
                .update_unless(T::COLLECTION, id, patch, conflicts)
                .await?
            {
                Guarded::Written(r) => Guarded::Written(from_record(T::COLLECTION, r)?),
                Guarded::Conflict => Guarded::Conflict,
                Guarded::Missing => Guarded::Missing,
            },
        )
    }

    pub async fn remove<T: Entity>(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(T::COLLECTION, id).await
    }
}
