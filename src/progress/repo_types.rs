use serde::{Deserialize, Serialize};

use crate::catalog::repo_types::null_as_default;
use crate::db::Entity;
use crate::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub weight: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Body measurements in centimetres; any subset may be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thigh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// A dated row in a user's history.
pub trait ProgressEntry: Entity + 'static {
    const LABEL: &'static str;

    fn date(&self) -> &str;
    fn stamp(&mut self, user_id: &str, created_at: String);
}

impl Entity for WeightRecord {
    const COLLECTION: Collection = Collection::WeightRecords;
    const ID_PREFIX: &'static str = "wr";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

impl ProgressEntry for WeightRecord {
    const LABEL: &'static str = "weight record";

    fn date(&self) -> &str {
        &self.date
    }

    fn stamp(&mut self, user_id: &str, created_at: String) {
        self.user_id = user_id.to_string();
        self.created_at = created_at;
    }
}

impl Entity for Measurement {
    const COLLECTION: Collection = Collection::Measurements;
    const ID_PREFIX: &'static str = "ms";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

impl ProgressEntry for Measurement {
    const LABEL: &'static str = "measurement";

    fn date(&self) -> &str {
        &self.date
    }

    fn stamp(&mut self, user_id: &str, created_at: String) {
        self.user_id = user_id.to_string();
        self.created_at = created_at;
    }
}
