//! HipChat v1 API client
//!
//! Owns the client `Config` (defaults for every optional send field plus the
//! auth token) and a `Transport`. Every request carries `auth_token` and
//! `format`; non-2xx responses become `TransportError::Status`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{Constraint, Error, Field, Result, TransportError};
use crate::models::{Color, Format, Message, MessageFormat, Room, RoomRef};

use super::decode;
use super::lazy::LazyRooms;
use super::send::{self, MessageSender, SendOptions};
use super::transport::{HttpTransport, Method, Transport};

/// Client for the HipChat v1 room API.
pub struct HipChatClient<T = HttpTransport> {
    transport: T,
    config: Config,
}

impl HipChatClient<HttpTransport> {
    /// Client over the default blocking HTTP transport.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }

    /// Client with default settings and the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Config {
            token: Some(token.into()),
            ..Config::default()
        })
    }
}

impl<T: Transport> HipChatClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -- Configuration accessors --

    pub fn token(&self) -> Option<&str> {
        self.config.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.config.token = Some(token.into());
    }

    /// Default room, if any.
    pub fn room(&self) -> Option<&RoomRef> {
        self.config.room.as_ref()
    }

    pub fn set_room(&mut self, room: impl Into<RoomRef>) {
        self.config.room = Some(room.into());
    }

    pub fn clear_room(&mut self) {
        self.config.room = None;
    }

    /// Default room id, when the default room was set by id.
    pub fn room_id(&self) -> Option<u64> {
        match self.config.room {
            Some(RoomRef::Id(id)) => Some(id),
            _ => None,
        }
    }

    pub fn set_room_id(&mut self, id: u64) {
        self.config.room = Some(RoomRef::Id(id));
    }

    /// Default room name, when the default room was set by name.
    pub fn room_name(&self) -> Option<&str> {
        match &self.config.room {
            Some(RoomRef::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn set_room_name(&mut self, name: impl Into<String>) {
        self.config.room = Some(RoomRef::Name(name.into()));
    }

    pub fn from(&self) -> &str {
        &self.config.from
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.config.from = from.into();
    }

    pub fn notify(&self) -> bool {
        self.config.notify
    }

    pub fn set_notify(&mut self, notify: bool) {
        self.config.notify = notify;
    }

    pub fn color(&self) -> Color {
        self.config.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.config.color = color;
    }

    pub fn message_format(&self) -> MessageFormat {
        self.config.message_format
    }

    pub fn set_message_format(&mut self, format: MessageFormat) {
        self.config.message_format = format;
    }

    /// Response format requested from the API.
    pub fn format(&self) -> Format {
        self.config.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.config.format = format;
    }

    pub fn auto_truncate(&self) -> bool {
        self.config.auto_truncate
    }

    pub fn set_auto_truncate(&mut self, auto_truncate: bool) {
        self.config.auto_truncate = auto_truncate;
    }

    pub fn timezone(&self) -> &str {
        &self.config.timezone
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.config.timezone = timezone.into();
    }

    pub fn api_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn set_api_url(&mut self, url: impl Into<String>) {
        self.config.api_url = url.into();
    }

    // -- Dispatch --

    fn token_param(&self) -> Result<String> {
        self.config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .ok_or_else(|| Error::invalid(Field::Token, Constraint::Empty))
    }

    /// Send `params` (plus token and format) to `path`, returning the raw body.
    fn dispatch(
        &self,
        method: Method,
        path: &str,
        mut params: BTreeMap<String, String>,
    ) -> Result<String> {
        params.insert("auth_token".to_string(), self.token_param()?);
        params
            .entry("format".to_string())
            .or_insert_with(|| self.config.format.to_string());

        let url = format!("{}/{}", self.config.base_url(), path);
        tracing::debug!("HipChat {} {}", method, url);

        let resp = self.transport.send(method, &url, &params)?;
        if !resp.is_success() {
            return Err(TransportError::Status {
                status: resp.status,
                url,
                body: resp.body,
            }
            .into());
        }
        Ok(resp.body)
    }

    // -- Sending --

    /// Send `message`, filling anything `options` leaves unset from the
    /// client defaults. The options do not change those defaults.
    pub fn send_message_with(&self, message: &str, options: SendOptions) -> Result<()> {
        let request = send::build_request(&self.config, message, options)?;
        tracing::debug!(
            "Sending message to room {} as {:?} (notify={}, color={})",
            request.room,
            request.from,
            request.notify,
            request.color
        );
        self.dispatch(Method::Post, "rooms/message", request.form_params())?;
        Ok(())
    }

    /// Send with every field taken from the client defaults.
    pub fn send_message(&self, message: &str) -> Result<()> {
        self.send_message_with(message, SendOptions::new())
    }

    pub fn send_message_to(&self, message: &str, room: impl Into<RoomRef>) -> Result<()> {
        self.send_message_with(message, SendOptions::new().room(room))
    }

    pub fn send_message_from(&self, message: &str, from: &str) -> Result<()> {
        self.send_message_with(message, SendOptions::new().from(from))
    }

    /// Send to `room` as `from`, overriding the notify flag.
    pub fn send_message_as(
        &self,
        message: &str,
        room: impl Into<RoomRef>,
        from: &str,
        notify: bool,
    ) -> Result<()> {
        self.send_message_with(
            message,
            SendOptions::new().room(room).from(from).notify(notify),
        )
    }

    pub fn send_message_colored(&self, message: &str, color: Color) -> Result<()> {
        self.send_message_with(message, SendOptions::new().color(color))
    }

    pub fn send_message_notify(&self, message: &str, notify: bool) -> Result<()> {
        self.send_message_with(message, SendOptions::new().notify(notify))
    }

    // -- Rooms --

    /// Raw `rooms/list` body in the configured format.
    pub fn list_rooms(&self) -> Result<String> {
        self.dispatch(Method::Get, "rooms/list", BTreeMap::new())
    }

    pub fn list_rooms_typed(&self) -> Result<Vec<Room>> {
        let body = self.list_rooms()?;
        decode::decode_rooms(&body, self.config.format)
    }

    /// Rooms decoded one at a time; see `LazyRooms`.
    pub fn rooms_lazy(&self) -> LazyRooms<'_, T> {
        LazyRooms::new(self)
    }

    // -- History --

    /// Raw history of the default room for `date`, or the most recent
    /// messages when `date` is `None`.
    pub fn room_history(&self, date: Option<NaiveDate>) -> Result<String> {
        self.fetch_history(None, date)
    }

    /// Raw history of an explicit room.
    pub fn room_history_in(
        &self,
        room: impl Into<RoomRef>,
        date: Option<NaiveDate>,
    ) -> Result<String> {
        self.fetch_history(Some(room.into()), date)
    }

    pub fn room_history_typed(&self, date: Option<NaiveDate>) -> Result<Vec<Message>> {
        let body = self.room_history(date)?;
        decode::decode_messages(&body, self.config.format)
    }

    fn fetch_history(&self, room: Option<RoomRef>, date: Option<NaiveDate>) -> Result<String> {
        let room = send::resolve_room(room, self.config.room.as_ref())?;
        let date = date.map_or_else(|| "recent".to_string(), |d| d.format("%Y-%m-%d").to_string());

        let mut params = BTreeMap::new();
        params.insert("room_id".to_string(), room.to_string());
        params.insert("date".to_string(), date);
        params.insert("timezone".to_string(), self.config.timezone.clone());
        self.dispatch(Method::Get, "rooms/history", params)
    }
}

impl<T: Transport> MessageSender for HipChatClient<T> {
    fn send(&self, message: &str, options: SendOptions) -> Result<()> {
        self.send_message_with(message, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::decode::fixtures::*;
    use crate::api::transport::mock::MockTransport;

    fn client(mock: MockTransport) -> HipChatClient<MockTransport> {
        let config = Config {
            token: Some("abc".to_string()),
            room: Some(RoomRef::Id(123)),
            ..Config::default()
        };
        HipChatClient::with_transport(config, mock)
    }

    #[test]
    fn test_send_uses_defaults() {
        let c = client(MockTransport::ok(r#"{"status":"sent"}"#));
        c.send_message("hello").unwrap();

        let call = c.transport.last_call();
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.url, "https://api.hipchat.com/v1/rooms/message");
        assert_eq!(call.params["room_id"], "123");
        assert_eq!(call.params["message"], "hello");
        assert_eq!(call.params["auth_token"], "abc");
        assert_eq!(call.params["from"], "API");
        assert_eq!(call.params["notify"], "0");
        assert_eq!(call.params["color"], "yellow");
        assert_eq!(call.params["format"], "json");
    }

    #[test]
    fn test_send_with_room_name_and_notify() {
        let c = client(MockTransport::ok(""));
        c.send_message_as("hi", "42", "bot", true).unwrap();

        let call = c.transport.last_call();
        assert_eq!(call.params["room_id"], "42");
        assert_eq!(call.params["from"], "bot");
        assert_eq!(call.params["notify"], "1");
    }

    #[test]
    fn test_untyped_room_literal() {
        let c = client(MockTransport::ok(""));
        c.send_message_to("hi", 7).unwrap();
        assert_eq!(c.transport.last_call().params["room_id"], "7");

        c.send_message_with("hi", SendOptions::new().room(8)).unwrap();
        assert_eq!(c.transport.last_call().params["room_id"], "8");
    }

    #[test]
    fn test_per_call_options_do_not_persist() {
        let c = client(MockTransport::ok(""));
        c.send_message_with(
            "one",
            SendOptions::new().room(7u64).from("other").color(Color::Red).notify(true),
        )
        .unwrap();
        assert_eq!(c.room(), Some(&RoomRef::Id(123)));
        assert_eq!(c.from(), "API");
        assert_eq!(c.color(), Color::Yellow);
        assert!(!c.notify());

        c.send_message("two").unwrap();
        let call = c.transport.last_call();
        assert_eq!(call.params["room_id"], "123");
        assert_eq!(call.params["color"], "yellow");
    }

    #[test]
    fn test_setters_change_defaults() {
        let mut c = client(MockTransport::ok(""));
        c.set_room_name("Ops");
        c.set_from("ci");
        c.set_color(Color::Green);
        c.set_notify(true);
        c.set_format(Format::Xml);
        c.send_message("x").unwrap();

        let call = c.transport.last_call();
        assert_eq!(call.params["room_id"], "Ops");
        assert_eq!(call.params["from"], "ci");
        assert_eq!(call.params["color"], "green");
        assert_eq!(call.params["notify"], "1");
        assert_eq!(call.params["format"], "xml");
        assert_eq!(c.room_name(), Some("Ops"));
        assert_eq!(c.room_id(), None);
    }

    #[test]
    fn test_adapters_set_one_field() {
        let c = client(MockTransport::ok(""));

        c.send_message_to("x", 9u64).unwrap();
        assert_eq!(c.transport.last_call().params["room_id"], "9");

        c.send_message_from("x", "alerts").unwrap();
        assert_eq!(c.transport.last_call().params["from"], "alerts");

        c.send_message_colored("x", Color::Random).unwrap();
        assert_eq!(c.transport.last_call().params["color"], "random");

        c.send_message_notify("x", true).unwrap();
        assert_eq!(c.transport.last_call().params["notify"], "1");

        MessageSender::send(&c, "x", SendOptions::new().from("trait")).unwrap();
        assert_eq!(c.transport.last_call().params["from"], "trait");
    }

    #[test]
    fn test_missing_room_never_dispatches() {
        let mut c = client(MockTransport::ok(""));
        c.clear_room();
        assert!(matches!(c.send_message("hello"), Err(Error::MissingRoom)));
        assert!(matches!(c.room_history(None), Err(Error::MissingRoom)));
        assert_eq!(c.transport.call_count(), 0);
    }

    #[test]
    fn test_truncated_from_dispatched() {
        let mut c = client(MockTransport::ok(""));
        let long = "abcdefghijklmnopqrst";

        let err = c.send_message_from("x", long).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { field: Field::From, .. }
        ));
        assert_eq!(c.transport.call_count(), 0);

        c.set_auto_truncate(true);
        c.send_message_from("x", long).unwrap();
        assert_eq!(c.transport.last_call().params["from"], "abcdefghijklmno");
    }

    #[test]
    fn test_missing_token() {
        let mut c = client(MockTransport::ok(""));
        c.set_token("  ");
        assert!(matches!(
            c.list_rooms(),
            Err(Error::InvalidParameter { field: Field::Token, constraint: Constraint::Empty })
        ));
        assert_eq!(c.transport.call_count(), 0);
    }

    #[test]
    fn test_http_error_status_is_transport_failure() {
        let mock = MockTransport::new();
        mock.push(401, r#"{"error":{"code":401,"message":"Auth token not found"}}"#);
        let c = client(mock);

        match c.send_message("hello").unwrap_err() {
            Error::Transport(TransportError::Status { status, body, .. }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Auth token"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_connect_error_is_transport_failure() {
        let mock = MockTransport::new();
        mock.push_connect_error("connection refused");
        let c = client(mock);
        assert!(matches!(
            c.list_rooms_typed(),
            Err(Error::Transport(TransportError::Connect { .. }))
        ));
        assert_eq!(c.transport.call_count(), 1);
    }

    #[test]
    fn test_list_rooms_raw_is_not_decoded() {
        let c = client(MockTransport::ok("not json at all"));
        assert_eq!(c.list_rooms().unwrap(), "not json at all");
        assert!(matches!(c.list_rooms_typed(), Err(Error::Decode { .. })));

        let call = c.transport.last_call();
        assert_eq!(call.method, Method::Get);
        assert_eq!(call.url, "https://api.hipchat.com/v1/rooms/list");
        assert_eq!(call.params["auth_token"], "abc");
        assert_eq!(call.params["format"], "json");
    }

    #[test]
    fn test_list_rooms_typed_each_format() {
        let mut c = client(MockTransport::ok(ROOMS_JSON));
        let rooms = c.list_rooms_typed().unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].name, "Development");

        let mut xml = client(MockTransport::ok(ROOMS_XML));
        xml.set_format(Format::Xml);
        assert_eq!(xml.list_rooms_typed().unwrap(), rooms);
        assert_eq!(xml.transport.last_call().params["format"], "xml");

        // Decoding follows the client's format, not the body's.
        c.set_format(Format::Xml);
        assert!(matches!(c.list_rooms_typed(), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_history_params() {
        let c = client(MockTransport::ok(HISTORY_JSON));
        let date = NaiveDate::from_ymd_opt(2010, 11, 19).unwrap();
        c.room_history(Some(date)).unwrap();

        let call = c.transport.last_call();
        assert_eq!(call.url, "https://api.hipchat.com/v1/rooms/history");
        assert_eq!(call.params["room_id"], "123");
        assert_eq!(call.params["date"], "2010-11-19");
        assert_eq!(call.params["timezone"], "UTC");

        c.room_history_in("Ops", None).unwrap();
        let call = c.transport.last_call();
        assert_eq!(call.params["room_id"], "Ops");
        assert_eq!(call.params["date"], "recent");
    }

    #[test]
    fn test_history_typed_twice_is_independent() {
        let c = client(MockTransport::ok(HISTORY_JSON));
        let date = NaiveDate::from_ymd_opt(2010, 11, 19);
        let first = c.room_history_typed(date).unwrap();
        let second = c.room_history_typed(date).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(c.transport.call_count(), 2);
    }

    #[test]
    fn test_custom_api_url() {
        let mut c = client(MockTransport::ok(ROOMS_JSON));
        c.set_api_url("http://localhost:8080/v1/");
        c.list_rooms().unwrap();
        assert_eq!(c.transport.last_call().url, "http://localhost:8080/v1/rooms/list");
    }
}
