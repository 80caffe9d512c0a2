//! Query parameter rendering

use std::fmt;

use url::Url;

use crate::error::RenderError;

/// A request that can be rendered to query parameters
pub trait Request {
    /// Render to an ordered multimap, or fail validation
    fn to_query(&self) -> Result<QueryParams, RenderError>;
}

/// Ordered query-parameter multimap
///
/// Keys may repeat (`forbidden_uris[]`), and insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl fmt::Display) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    pub fn push_opt<V: fmt::Display>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Push one pair per value under the same key
    pub fn push_all<I>(&mut self, key: &str, values: I)
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        for value in values {
            self.push(key, value);
        }
    }

    /// First value stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Every value stored under `key`, in order
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append every pair to the URL's query string
    pub fn apply_to(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.iter());
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
