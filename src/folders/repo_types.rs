use serde::{Deserialize, Serialize};

use crate::db::Entity;
use crate::store::Collection;

/// Name of the folder every new user starts with.
pub const DEFAULT_FOLDER_NAME: &str = "Genel";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFolder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
}

impl Entity for UserFolder {
    const COLLECTION: Collection = Collection::UserFolders;
    const ID_PREFIX: &'static str = "folder";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
