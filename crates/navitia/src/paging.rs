//! Pagination continuations
//!
//! Paged responses carry a `links` array. Entries typed `next` and
//! `previous` become [`Continuation`]s that re-run the same request
//! pipeline against the captured `href`.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use crate::error::{NavitiaError, RenderError};
use crate::results::Results;
use crate::session::Session;

/// A hypermedia link as sent by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub href: String,
    pub rel: String,
    /// Relation used for paging ("next", "previous", "first", "last", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub templated: bool,
}

/// A follow-up request for another page of `T`
pub struct Continuation<T> {
    href: String,
    _results: PhantomData<fn() -> T>,
}

impl<T> Continuation<T> {
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            _results: PhantomData,
        }
    }

    /// The captured URL
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }
}

impl<T: Results> Continuation<T> {
    /// Fetch the page behind this link
    ///
    /// Issues exactly one request; the returned page carries its own paging.
    /// Links pointing outside the session's origin are refused, since the
    /// request would carry the API key.
    pub async fn fetch(&self, session: &Session, cancel: &CancellationToken) -> Result<T, NavitiaError> {
        let url = Url::parse(&self.href).map_err(|source| NavitiaError::InvalidUrl {
            url: self.href.clone(),
            source,
        })?;
        if url.origin() != session.base_url().origin() {
            warn!(href = %self.href, base_url = %session.base_url(), "Refusing off-origin continuation");
            return Err(RenderError::InvalidParameter {
                name: "href",
                reason: format!("{} is outside {}", self.href, session.base_url()),
            }
            .into());
        }
        session.execute_url(cancel, url).await
    }
}

impl<T> Clone for Continuation<T> {
    fn clone(&self) -> Self {
        Self::new(self.href.clone())
    }
}

impl<T> PartialEq for Continuation<T> {
    fn eq(&self, other: &Self) -> bool {
        self.href == other.href
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Continuation").field(&self.href).finish()
    }
}

/// Next/previous continuations of a paged result
pub struct Paging<T> {
    /// `None` on the last page
    pub next: Option<Continuation<T>>,
    /// `None` on the first page
    pub previous: Option<Continuation<T>>,
}

impl<T> Paging<T> {
    /// Pick the first `next` and `previous` typed links
    #[must_use]
    pub fn from_links(links: &[Link]) -> Self {
        let find = |kind: &str| {
            links
                .iter()
                .find(|link| link.kind == kind)
                .map(|link| Continuation::new(link.href.clone()))
        };
        Self {
            next: find("next"),
            previous: find("previous"),
        }
    }

    /// Whether there is no further page
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.next.is_none()
    }
}

impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self {
            next: None,
            previous: None,
        }
    }
}

impl<T> Clone for Paging<T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next.clone(),
            previous: self.previous.clone(),
        }
    }
}

impl<T> PartialEq for Paging<T> {
    fn eq(&self, other: &Self) -> bool {
        self.next == other.next && self.previous == other.previous
    }
}

impl<T> fmt::Debug for Paging<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paging")
            .field("next", &self.next)
            .field("previous", &self.previous)
            .finish()
    }
}

impl<'de, T> Deserialize<'de> for Paging<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let links = Option::<Vec<Link>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::from_links(&links))
    }
}
