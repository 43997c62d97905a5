//! Field constraints applied before a message is dispatched

use crate::error::{Constraint, Error, Field, Result};

/// Longest sender name the API accepts.
pub const MAX_FROM_LEN: usize = 15;

/// Longest message body the API accepts.
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Letters, digits, `-`, `_` and space.
fn is_sender_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == ' '
}

/// First `max` characters of `s`, on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Check a sender name, shortening it when `auto_truncate` allows.
///
/// A truncated prefix is not re-checked for its character class.
pub fn check_from(from: &str, auto_truncate: bool) -> Result<String> {
    if from.is_empty() {
        return Err(Error::invalid(Field::From, Constraint::Empty));
    }

    if from.chars().count() > MAX_FROM_LEN {
        if auto_truncate {
            return Ok(truncate_chars(from, MAX_FROM_LEN).to_string());
        }
        return Err(Error::invalid(
            Field::From,
            Constraint::TooLong { max: MAX_FROM_LEN },
        ));
    }

    if let Some(bad) = from.chars().find(|c| !is_sender_char(*c)) {
        return Err(Error::invalid(Field::From, Constraint::InvalidCharacter(bad)));
    }

    Ok(from.to_string())
}

/// Check a message body, shortening it when `auto_truncate` allows.
pub fn check_message(message: &str, auto_truncate: bool) -> Result<String> {
    if message.trim().is_empty() {
        return Err(Error::invalid(Field::Message, Constraint::Empty));
    }

    if message.chars().count() > MAX_MESSAGE_LEN {
        if auto_truncate {
            return Ok(truncate_chars(message, MAX_MESSAGE_LEN).to_string());
        }
        return Err(Error::invalid(
            Field::Message,
            Constraint::TooLong {
                max: MAX_MESSAGE_LEN,
            },
        ));
    }

    Ok(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(result: Result<String>, field: Field, constraint: Constraint) {
        match result {
            Err(Error::InvalidParameter { field: f, constraint: c }) => {
                assert_eq!(f, field);
                assert_eq!(c, constraint);
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_from_unchanged() {
        for name in ["bot", "Build-Server_01", "a b c", "exactly15chars_", "Zoë"] {
            assert_eq!(check_from(name, false).unwrap(), name);
            assert_eq!(check_from(name, true).unwrap(), name);
        }
    }

    #[test]
    fn test_long_from_truncated() {
        let name = "abcdefghijklmnopqrst";
        assert_eq!(name.len(), 20);
        assert_eq!(check_from(name, true).unwrap(), "abcdefghijklmno");
    }

    #[test]
    fn test_long_from_rejected_without_truncate() {
        assert_invalid(
            check_from("abcdefghijklmnopqrst", false),
            Field::From,
            Constraint::TooLong { max: MAX_FROM_LEN },
        );
    }

    #[test]
    fn test_truncation_skips_character_check() {
        // The '!' falls inside the kept prefix but is not re-validated.
        assert_eq!(
            check_from("deploy!bot-0123456789", true).unwrap(),
            "deploy!bot-0123"
        );
    }

    #[test]
    fn test_from_bad_character() {
        assert_invalid(
            check_from("bot@ci", false),
            Field::From,
            Constraint::InvalidCharacter('@'),
        );
        // Truncation cannot repair a short name.
        assert_invalid(
            check_from("bot@ci", true),
            Field::From,
            Constraint::InvalidCharacter('@'),
        );
    }

    #[test]
    fn test_empty_from() {
        assert_invalid(check_from("", true), Field::From, Constraint::Empty);
    }

    #[test]
    fn test_truncation_is_char_based() {
        let name = "é".repeat(20);
        let out = check_from(&name, true).unwrap();
        assert_eq!(out.chars().count(), MAX_FROM_LEN);
    }

    #[test]
    fn test_message_limits() {
        let long = "x".repeat(MAX_MESSAGE_LEN + 5);
        assert_eq!(check_message(&long, true).unwrap().len(), MAX_MESSAGE_LEN);
        assert_invalid(
            check_message(&long, false),
            Field::Message,
            Constraint::TooLong {
                max: MAX_MESSAGE_LEN,
            },
        );
        assert_invalid(check_message("   ", true), Field::Message, Constraint::Empty);
        assert_eq!(check_message("<b>hi</b>", false).unwrap(), "<b>hi</b>");
    }
}
