//! Navitia date-time encoding
//!
//! The API exchanges local date-times as `YYYYMMDDTHHMMSS` without offset.

use chrono::NaiveDateTime;

/// `chrono` format string for Navitia date-times
pub const FORMAT: &str = "%Y%m%dT%H%M%S";

/// Render a date-time the way the API expects it in queries
#[must_use]
pub fn format(dt: &NaiveDateTime) -> String {
    dt.format(FORMAT).to_string()
}

/// Parse a Navitia date-time
pub fn parse(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, FORMAT)
}

/// Serde helpers for optional date-times; empty strings decode as `None`
pub(crate) mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        dt: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => serializer.serialize_str(&super::format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => super::parse(&raw).map(Some).map_err(|e| {
                serde::de::Error::custom(format!("invalid date-time {raw:?}: {e}"))
            }),
        }
    }
}
