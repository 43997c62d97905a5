//! Room model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;

/// A room as returned by `rooms/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub topic: String,
    /// Unix seconds of the last message, 0 if the room was never used.
    #[serde(default)]
    pub last_active: i64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub owner_user_id: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_archived: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub xmpp_jid: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub guest_access_url: Option<String>,
}

impl Room {
    pub fn last_active_at(&self) -> Option<DateTime<Utc>> {
        (self.last_active > 0)
            .then(|| DateTime::from_timestamp(self.last_active, 0))
            .flatten()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}
