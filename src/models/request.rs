//! Canonical send-message request and its enumerated fields

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Constraint, Error, Field};

/// Target room, by numeric id or by name.
///
/// Both variants go out as the `room_id` form field; the API resolves names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomRef {
    Id(u64),
    Name(String),
}

impl RoomRef {
    pub fn is_empty(&self) -> bool {
        match self {
            RoomRef::Id(_) => false,
            RoomRef::Name(name) => name.trim().is_empty(),
        }
    }
}

impl fmt::Display for RoomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomRef::Id(id) => write!(f, "{}", id),
            RoomRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for RoomRef {
    fn from(id: u64) -> Self {
        RoomRef::Id(id)
    }
}

// Signed impls let untyped literals such as `room(7)` resolve. A negative
// value is not a valid id and goes out as a name for the API to reject.
impl From<i64> for RoomRef {
    fn from(id: i64) -> Self {
        u64::try_from(id).map_or_else(|_| RoomRef::Name(id.to_string()), RoomRef::Id)
    }
}

impl From<i32> for RoomRef {
    fn from(id: i32) -> Self {
        RoomRef::from(i64::from(id))
    }
}

impl From<&str> for RoomRef {
    fn from(name: &str) -> Self {
        RoomRef::Name(name.to_string())
    }
}

impl From<String> for RoomRef {
    fn from(name: String) -> Self {
        RoomRef::Name(name)
    }
}

/// Background color of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Yellow,
    Red,
    Green,
    Purple,
    Gray,
    Random,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Gray => "gray",
            Color::Random => "random",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yellow" => Ok(Color::Yellow),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "purple" => Ok(Color::Purple),
            "gray" | "grey" => Ok(Color::Gray),
            "random" => Ok(Color::Random),
            _ => Err(Error::invalid(
                Field::Color,
                Constraint::UnknownValue(s.to_string()),
            )),
        }
    }
}

/// Response format requested from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// How the API renders the message body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    /// Limited XHTML; links are not auto-detected.
    #[default]
    Html,
    /// Plain text with link, emoticon and mention detection.
    Text,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Html => "html",
            MessageFormat::Text => "text",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(MessageFormat::Html),
            "text" => Ok(MessageFormat::Text),
            _ => Err(Error::invalid(
                Field::MessageFormat,
                Constraint::UnknownValue(s.to_string()),
            )),
        }
    }
}

/// A send-message call after defaults have been merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub message: String,
    pub room: RoomRef,
    pub from: String,
    pub notify: bool,
    pub color: Color,
    pub message_format: MessageFormat,
    pub format: Format,
}

impl MessageRequest {
    /// Form fields for `rooms/message`, without the auth token.
    pub fn form_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("room_id".to_string(), self.room.to_string());
        params.insert("from".to_string(), self.from.clone());
        params.insert("message".to_string(), self.message.clone());
        params.insert(
            "notify".to_string(),
            if self.notify { "1" } else { "0" }.to_string(),
        );
        params.insert("color".to_string(), self.color.to_string());
        params.insert(
            "message_format".to_string(),
            self.message_format.to_string(),
        );
        params.insert("format".to_string(), self.format.to_string());
        params
    }
}
