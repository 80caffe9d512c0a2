//! Remote error envelope
//!
//! Any non-200 answer carries a `{id, message}` body. Identifiers returned
//! with 400 and 404 come from a fixed catalog and get a human description;
//! anything else is passed through as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Known identifiers for `400 Bad Request`
const BAD_REQUEST: &[(&str, &str)] = &[
    ("bad_filter", "Bad Filter"),
    ("unknown_api", "Unknown API"),
    ("date_out_of_bounds", "Date out of bounds"),
    ("unable_to_parse", "Unable to parse"),
    ("bad_format", "Bad Format"),
    ("config_exception", "Configuration exception"),
];

/// Known identifiers for `404 Not Found`
const NOT_FOUND: &[(&str, &str)] = &[
    ("unknown_object", "Unknown Object"),
    ("no_origin", "No origin"),
    ("no_destination", "No destination"),
    ("no_origin_nor_destination", "No origin nor destination"),
    ("no_solution", "No solution"),
];

/// Error returned by the API with a non-200 status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// HTTP status code (not part of the body)
    #[serde(skip)]
    pub status: u16,
    /// Remote error identifier
    #[serde(default)]
    pub id: String,
    /// Human message sent by the API
    #[serde(default)]
    pub message: String,
}

impl RemoteError {
    /// Decode an error body and attach its status
    pub fn from_body(status: u16, body: &[u8]) -> Result<Self, serde_json::Error> {
        let mut err: Self = serde_json::from_slice(body)?;
        err.status = status;
        Ok(err)
    }

    /// Whether this is a client-side request error (400 or 404)
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(self.status, 400 | 404)
    }

    /// Catalog description of the identifier, for 400 and 404 only
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        describe(self.status, &self.id)
    }
}

/// Look up the catalog entry for a status/identifier pair
#[must_use]
pub fn describe(status: u16, id: &str) -> Option<&'static str> {
    let table = match status {
        400 => BAD_REQUEST,
        404 => NOT_FOUND,
        _ => return None,
    };
    table
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, description)| *description)
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_request_error() {
            return write!(f, "remote failure (id: {}): {}", self.id, self.message);
        }
        match self.description() {
            Some(description) => write!(
                f,
                "request error (id: {}): {description}: {}",
                self.id, self.message
            ),
            None => write!(f, "request error (id: {}): {}", self.id, self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn err(status: u16, id: &str, message: &str) -> RemoteError {
        RemoteError {
            status,
            id: id.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_known_not_found() {
        let e = err(404, "unknown_object", "stop_area:FOO not found");
        assert_eq!(e.description(), Some("Unknown Object"));
        assert_eq!(
            e.to_string(),
            "request error (id: unknown_object): Unknown Object: stop_area:FOO not found"
        );
    }

    #[test]
    fn test_unknown_not_found_id() {
        let e = err(404, "brand_new_id", "gone");
        assert_eq!(e.description(), None);
        assert_eq!(e.to_string(), "request error (id: brand_new_id): gone");
    }

    #[test]
    fn test_known_bad_request() {
        let e = err(400, "bad_filter", "ptref : Filter: unable to parse");
        assert!(e.to_string().contains("Bad Filter"));
    }

    #[test]
    fn test_catalogs_are_distinct() {
        assert!(describe(400, "unknown_object").is_none());
        assert!(describe(404, "bad_filter").is_none());
    }

    #[test]
    fn test_other_status_skips_catalog() {
        let e = err(500, "unknown_object", "boom");
        assert_eq!(e.description(), None);
        assert_eq!(e.to_string(), "remote failure (id: unknown_object): boom");
    }

    #[test]
    fn test_from_body() {
        let e = RemoteError::from_body(404, br#"{"id":"no_solution","message":"none"}"#).unwrap();
        assert_eq!(e.status, 404);
        assert_eq!(e.id, "no_solution");

        let e = RemoteError::from_body(401, br#"{"message":"no token"}"#).unwrap();
        assert!(e.id.is_empty());
        assert_eq!(e.message, "no token");

        assert!(RemoteError::from_body(500, b"<html>").is_err());
    }

    proptest! {
        #[test]
        fn display_always_carries_id_and_message(
            status in 400u16..600u16,
            id in "[a-z_]{1,20}",
            message in "[ -~]{0,40}",
        ) {
            let e = err(status, &id, &message);
            let shown = e.to_string();
            let id_segment = format!("(id: {id})");
            prop_assert!(shown.contains(&id_segment));
            prop_assert!(shown.ends_with(&message));
        }
    }
}
