use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A stored row: a plain JSON object.
pub type Record = Map<String, Value>;

/// Named collections, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    FoodItems,
    ExerciseItems,
    DetoxItems,
    Recipes,
    DietPlans,
    ExercisePlans,
    DetoxPlans,
    DailyDietPlans,
    DailyExercisePlans,
    DailyDetoxPlans,
    UserFolders,
    WeightRecords,
    Measurements,
}

impl Collection {
    pub const COUNT: usize = 14;

    pub const ALL: [Collection; Self::COUNT] = [
        Collection::Users,
        Collection::FoodItems,
        Collection::ExerciseItems,
        Collection::DetoxItems,
        Collection::Recipes,
        Collection::DietPlans,
        Collection::ExercisePlans,
        Collection::DetoxPlans,
        Collection::DailyDietPlans,
        Collection::DailyExercisePlans,
        Collection::DailyDetoxPlans,
        Collection::UserFolders,
        Collection::WeightRecords,
        Collection::Measurements,
    ];

    /// Collections whose rows belong to a user through `userId`.
    pub const USER_OWNED: [Collection; 9] = [
        Collection::DietPlans,
        Collection::ExercisePlans,
        Collection::DetoxPlans,
        Collection::DailyDietPlans,
        Collection::DailyExercisePlans,
        Collection::DailyDetoxPlans,
        Collection::UserFolders,
        Collection::WeightRecords,
        Collection::Measurements,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::FoodItems => "foodItems",
            Collection::ExerciseItems => "exerciseItems",
            Collection::DetoxItems => "detoxItems",
            Collection::Recipes => "recipes",
            Collection::DietPlans => "dietPlans",
            Collection::ExercisePlans => "exercisePlans",
            Collection::DetoxPlans => "detoxPlans",
            Collection::DailyDietPlans => "dailyDietPlans",
            Collection::DailyExercisePlans => "dailyExercisePlans",
            Collection::DailyDetoxPlans => "dailyDetoxPlans",
            Collection::UserFolders => "userFolders",
            Collection::WeightRecords => "weightRecords",
            Collection::Measurements => "measurements",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Store-wide bookkeeping persisted next to the collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMeta {
    #[serde(default)]
    pub seed_version: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} holds malformed data: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Whole-collection persistence. Implementations do no locking of their own;
/// `Database` serializes read-modify-write cycles per collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Record>, StoreError>;
    async fn write_collection(
        &self,
        collection: Collection,
        records: &[Record],
    ) -> Result<(), StoreError>;
    async fn read_meta(&self) -> Result<StoreMeta, StoreError>;
    async fn write_meta(&self, meta: &StoreMeta) -> Result<(), StoreError>;
}
