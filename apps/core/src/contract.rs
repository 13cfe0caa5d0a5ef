use serde::{Deserialize, Serialize};

use crate::model::PrefEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub show_raw_keys: bool,
}

/// `type_index` follows the selector order: 0 String, 1 Int, 2 Float.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddRequest {
    pub key: String,
    pub type_index: usize,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteRequest {
    pub raw_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditRequest {
    pub raw_key: String,
    pub clean_key: String,
    pub type_index: usize,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntriesResponse {
    pub entries: Vec<PrefEntry>,
    pub enumeration_supported: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    Refresh(RefreshRequest),
    Add(AddRequest),
    Delete(DeleteRequest),
    Edit(EditRequest),
    DeleteAll,
}

/// Every command answers with the view as it stands after the command ran.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    Entries(EntriesResponse),
}
