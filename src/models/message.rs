//! History message models

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use super::de;

/// One entry of a room's history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "de::timestamp")]
    pub date: DateTime<FixedOffset>,
    pub from: Sender,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub message: String,
    #[serde(default)]
    pub file: Option<FileAttachment>,
}

/// Message sender
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sender {
    pub name: String,
    /// Numeric user id, or `"api"` for messages sent through the API.
    #[serde(deserialize_with = "de::id_string")]
    pub user_id: String,
}

impl Sender {
    pub fn is_api(&self) -> bool {
        self.user_id == "api"
    }
}

/// File shared in a message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}
