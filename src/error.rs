//! Error types for the HipChat client

use std::fmt;

use thiserror::Error;

/// Request field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    From,
    Message,
    Token,
    Color,
    MessageFormat,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::From => "from",
            Field::Message => "message",
            Field::Token => "auth_token",
            Field::Color => "color",
            Field::MessageFormat => "message_format",
        };
        f.write_str(name)
    }
}

/// Constraint a field value violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Value is longer than `max` characters.
    TooLong { max: usize },
    /// Value contains a character outside the allowed class.
    InvalidCharacter(char),
    /// Value is required but empty.
    Empty,
    /// Value is not one of the names the API accepts.
    UnknownValue(String),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::TooLong { max } => write!(f, "longer than {} characters", max),
            Constraint::InvalidCharacter(c) => write!(f, "contains invalid character {:?}", c),
            Constraint::Empty => f.write_str("must not be empty"),
            Constraint::UnknownValue(v) => write!(f, "unknown value {:?}", v),
        }
    }
}

/// Failure reported by the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("request to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },
}

/// Errors surfaced by every client operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {constraint}")]
    InvalidParameter { field: Field, constraint: Constraint },

    #[error("no room given and no default room configured")]
    MissingRoom,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not decode response, expected {expected}: {fragment}")]
    Decode {
        fragment: String,
        expected: &'static str,
    },

    #[error("unsupported response format {0:?} (expected json or xml)")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;

const FRAGMENT_LIMIT: usize = 120;

impl Error {
    pub(crate) fn invalid(field: Field, constraint: Constraint) -> Self {
        Error::InvalidParameter { field, constraint }
    }

    /// Decode error carrying at most the first 120 characters of `fragment`.
    pub(crate) fn decode(fragment: &str, expected: &'static str) -> Self {
        let fragment = match fragment.char_indices().nth(FRAGMENT_LIMIT) {
            Some((end, _)) => format!("{}...", &fragment[..end]),
            None => fragment.to_string(),
        };
        Error::Decode { fragment, expected }
    }
}
