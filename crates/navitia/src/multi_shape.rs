//! Multi-shape response decoding
//!
//! Some endpoints answer with one of several named arrays (`departures` or
//! `arrivals`, one of many PT collections). The decoder looks for the
//! candidates in their declared order, never in map order, so a response
//! carrying more than one of them always resolves to the first declared.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::warn;

use crate::paging::Link;

/// Key holding pagination links; mandatory in multi-shape responses
pub const LINKS_KEY: &str = "links";

/// A payload that may arrive under one of several keys
pub trait MultiShape: Sized {
    /// Candidate keys, in priority order
    const CANDIDATES: &'static [&'static str];

    /// Decode the raw value found under `key`
    fn decode_candidate(key: &str, raw: &RawValue) -> Result<Self, serde_json::Error>;
}

/// Errors from multi-shape selection
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("no links field found")]
    NoLinks,

    #[error("no known key in response (expected one of {expected:?})")]
    NoKnownKey { expected: &'static [&'static str] },

    #[error("failed to decode field {key:?}: {source}")]
    Field {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a multi-shape decode
#[derive(Debug)]
pub struct Decoded<S> {
    pub shape: S,
    /// Candidate key that was selected
    pub key: &'static str,
    pub links: Vec<Link>,
    /// Top-level fields left after links and the selected key
    pub rest: HashMap<String, Box<RawValue>>,
}

impl<S> Decoded<S> {
    /// Decode an auxiliary top-level field, if present
    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ShapeError> {
        self.rest
            .get(key)
            .map(|raw| {
                serde_json::from_str(raw.get()).map_err(|source| ShapeError::Field {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

/// Select and decode the first candidate present in `fields`
pub fn decode<S: MultiShape>(
    mut fields: HashMap<String, Box<RawValue>>,
) -> Result<Decoded<S>, ShapeError> {
    let raw_links = fields.remove(LINKS_KEY).ok_or(ShapeError::NoLinks)?;
    let links: Vec<Link> =
        serde_json::from_str(raw_links.get()).map_err(|source| ShapeError::Field {
            key: LINKS_KEY.to_string(),
            source,
        })?;

    let Some((key, raw)) = S::CANDIDATES
        .iter()
        .find_map(|&key| fields.remove(key).map(|raw| (key, raw)))
    else {
        return Err(ShapeError::NoKnownKey {
            expected: S::CANDIDATES,
        });
    };

    let ignored: Vec<&str> = S::CANDIDATES
        .iter()
        .copied()
        .filter(|k| fields.contains_key(*k))
        .collect();
    if !ignored.is_empty() {
        warn!(selected = key, ?ignored, "Response carries several known keys, keeping the first");
    }

    let shape = S::decode_candidate(key, &raw).map_err(|source| ShapeError::Field {
        key: key.to_string(),
        source,
    })?;

    Ok(Decoded {
        shape,
        key,
        links,
        rest: fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Numbers {
        Odd(Vec<u32>),
        Even(Vec<u32>),
    }

    impl MultiShape for Numbers {
        const CANDIDATES: &'static [&'static str] = &["odd", "even"];

        fn decode_candidate(key: &str, raw: &RawValue) -> Result<Self, serde_json::Error> {
            let values = serde_json::from_str(raw.get())?;
            Ok(if key == "odd" {
                Self::Odd(values)
            } else {
                Self::Even(values)
            })
        }
    }

    fn fields(json: &str) -> HashMap<String, Box<RawValue>> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_selects_present_key() {
        let decoded =
            decode::<Numbers>(fields(r#"{"links": [], "even": [2, 4], "extra": 1}"#)).unwrap();
        assert_eq!(decoded.shape, Numbers::Even(vec![2, 4]));
        assert_eq!(decoded.key, "even");
        assert!(decoded.rest.contains_key("extra"));
        assert_eq!(decoded.optional::<u32>("extra").unwrap(), Some(1));
        assert_eq!(decoded.optional::<u32>("missing").unwrap(), None);
    }

    #[test]
    fn test_declared_order_wins() {
        for json in [
            r#"{"links": [], "even": [2], "odd": [1]}"#,
            r#"{"odd": [1], "links": [], "even": [2]}"#,
        ] {
            let decoded = decode::<Numbers>(fields(json)).unwrap();
            assert_eq!(decoded.shape, Numbers::Odd(vec![1]));
        }
    }

    #[test]
    fn test_missing_links() {
        let err = decode::<Numbers>(fields(r#"{"odd": [1]}"#)).unwrap_err();
        assert!(matches!(err, ShapeError::NoLinks));
        assert_eq!(err.to_string(), "no links field found");
    }

    #[test]
    fn test_no_known_key() {
        let err = decode::<Numbers>(fields(r#"{"links": [], "primes": [3]}"#)).unwrap_err();
        assert!(err.to_string().starts_with("no known key in response"));
    }

    #[test]
    fn test_bad_candidate() {
        let err = decode::<Numbers>(fields(r#"{"links": [], "odd": "one"}"#)).unwrap_err();
        assert!(matches!(err, ShapeError::Field { ref key, .. } if key == "odd"));
    }
}
