//! Data models for HipChat entities

pub(crate) mod de;
mod message;
mod request;
mod room;

pub use message::*;
pub use request::*;
pub use room::*;
