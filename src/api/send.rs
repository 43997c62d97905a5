//! Send-message options and their merge into a canonical request
//!
//! Every convenience send on the client builds a `SendOptions` and hands it
//! to one funnel. Options are request-scoped: nothing set here is written
//! back into the client's `Config`.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Color, MessageFormat, MessageRequest, RoomRef};

use super::validate;

/// Optional per-call overrides for a send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub room: Option<RoomRef>,
    pub from: Option<String>,
    pub notify: Option<bool>,
    pub color: Option<Color>,
    pub message_format: Option<MessageFormat>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(mut self, room: impl Into<RoomRef>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = Some(notify);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn message_format(mut self, format: MessageFormat) -> Self {
        self.message_format = Some(format);
        self
    }
}

/// Anything that can deliver a message to a room.
pub trait MessageSender {
    fn send(&self, message: &str, options: SendOptions) -> Result<()>;
}

/// Merge `options` over `config` and apply the field constraints.
pub fn build_request(config: &Config, message: &str, options: SendOptions) -> Result<MessageRequest> {
    let room = resolve_room(options.room, config.room.as_ref())?;

    let from = options.from.unwrap_or_else(|| config.from.clone());
    let from = validate::check_from(&from, config.auto_truncate)?;
    let message = validate::check_message(message, config.auto_truncate)?;

    Ok(MessageRequest {
        message,
        room,
        from,
        notify: options.notify.unwrap_or(config.notify),
        color: options.color.unwrap_or(config.color),
        message_format: options.message_format.unwrap_or(config.message_format),
        format: config.format,
    })
}

/// Explicit room if non-empty, else the configured default.
pub(crate) fn resolve_room(explicit: Option<RoomRef>, default: Option<&RoomRef>) -> Result<RoomRef> {
    explicit
        .filter(|room| !room.is_empty())
        .or_else(|| default.filter(|room| !room.is_empty()).cloned())
        .ok_or(Error::MissingRoom)
}
