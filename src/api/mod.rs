//! HipChat v1 API client
//!
//! `client` holds the public operations; the other modules are the pieces
//! it is built from.

pub mod client;
pub mod decode;
pub mod lazy;
pub mod send;
pub mod transport;
pub mod validate;

pub use client::HipChatClient;
pub use decode::{decode_messages, decode_rooms};
pub use lazy::LazyRooms;
pub use send::{MessageSender, SendOptions};
pub use transport::{HttpTransport, Method, Response, Transport};
