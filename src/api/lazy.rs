//! Lazy room listing
//!
//! Nothing is fetched until the first call to `next`. The body is then
//! fetched once and rooms are decoded one at a time as the caller pulls them.

use crate::error::Result;
use crate::models::Room;

use super::client::HipChatClient;
use super::decode::Records;
use super::transport::Transport;

enum State {
    NotStarted,
    Yielding(Records<Room>),
    Exhausted,
}

/// Iterator over the rooms visible to the client's token.
///
/// A fetch or decode failure is yielded once, after which the iterator ends.
/// Iterating again requires a fresh `rooms_lazy()` call, which re-issues the
/// request.
pub struct LazyRooms<'a, T: Transport> {
    client: &'a HipChatClient<T>,
    state: State,
}

impl<'a, T: Transport> LazyRooms<'a, T> {
    pub(crate) fn new(client: &'a HipChatClient<T>) -> Self {
        Self {
            client,
            state: State::NotStarted,
        }
    }

    fn start(&self) -> Result<Records<Room>> {
        let body = self.client.list_rooms()?;
        Records::new(body, self.client.format())
    }
}

impl<T: Transport> Iterator for LazyRooms<'_, T> {
    type Item = Result<Room>;

    fn next(&mut self) -> Option<Self::Item> {
        if let State::NotStarted = self.state {
            match self.start() {
                Ok(records) => self.state = State::Yielding(records),
                Err(e) => {
                    self.state = State::Exhausted;
                    return Some(Err(e));
                }
            }
        }

        let State::Yielding(records) = &mut self.state else {
            return None;
        };
        let item = records.next();
        if !matches!(item, Some(Ok(_))) {
            self.state = State::Exhausted;
        }
        item
    }
}
