//! Client library for the HipChat v1 room API.
//!
//! Send messages to rooms, list rooms and read room history. Responses are
//! available as raw JSON/XML text or as typed [`Room`] and [`Message`]
//! records.
//!
//! ```no_run
//! use hipchat_client::{Color, Config, HipChatClient, SendOptions};
//!
//! # fn main() -> hipchat_client::Result<()> {
//! let mut client = HipChatClient::new(Config::default());
//! client.set_token("abc");
//! client.set_room_id(123);
//! client.send_message("hello")?;
//! client.send_message_with("deploy done", SendOptions::new().from("ci").color(Color::Green))?;
//!
//! for room in client.rooms_lazy() {
//!     println!("{}", room?.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use api::{
    decode_messages, decode_rooms, HipChatClient, LazyRooms, MessageSender, SendOptions, Transport,
};
pub use config::Config;
pub use error::{Constraint, Error, Field, Result, TransportError};
pub use models::{
    Color, FileAttachment, Format, Message, MessageFormat, MessageRequest, Room, RoomRef, Sender,
};
