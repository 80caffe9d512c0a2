//! Navitia error types

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::container::ContainerError;
use crate::remote::RemoteError;

/// A request failed local validation and was never sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The end of a time window precedes its start
    #[error("until ({until}) precedes since ({since})")]
    InvertedWindow {
        /// Window start
        since: NaiveDateTime,
        /// Window end
        until: NaiveDateTime,
    },

    /// A free-text search was rendered without any text
    #[error("search query must not be empty")]
    EmptyQuery,

    /// A journey request has neither an origin nor a destination
    #[error("journey request needs an origin or a destination")]
    MissingEndpoint,

    /// A parameter holds a value the API cannot accept
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Query parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Coarse classification of a [`NavitiaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local validation failed before anything was sent
    Render,
    /// The network call failed, was canceled or timed out
    Transport,
    /// The API answered with a non-200 status
    Remote,
    /// The response (or an embedded object) could not be decoded
    Decode,
    /// The session could not be built
    Configuration,
}

/// Errors that can occur while talking to the Navitia API
#[derive(Debug, Error)]
pub enum NavitiaError {
    /// Request parameters failed validation
    #[error("Invalid request: {0}")]
    Render(#[from] RenderError),

    /// The cancellation token fired before the call completed
    #[error("Request canceled")]
    Canceled,

    /// The HTTP client gave up waiting
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The configured timeout in seconds
        timeout_secs: u64,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Connection or protocol failure below the API layer
    #[error("Connection failed while {context}: {source}")]
    Transport {
        /// What the executor was doing
        context: &'static str,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with an error envelope
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A 200 response could not be decoded
    #[error("Parse error in {context}: {source}")]
    Decode {
        /// Type being decoded
        context: &'static str,
        /// Underlying JSON error (carries line and column)
        #[source]
        source: serde_json::Error,
    },

    /// An embedded container could not be materialized
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Session configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A URL could not be built
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },
}

impl NavitiaError {
    /// Which family this error belongs to
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Render(_) => ErrorKind::Render,
            Self::Canceled | Self::Timeout { .. } | Self::Transport { .. } => ErrorKind::Transport,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Decode { .. } | Self::Container(_) => ErrorKind::Decode,
            Self::Configuration(_) | Self::InvalidUrl { .. } => ErrorKind::Configuration,
        }
    }

    /// Returns true if the call was aborted through its cancellation token
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Returns true if the HTTP client hit its deadline
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The remote error envelope, if the API rejected the call
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if a caller may reasonably try the same call again
    ///
    /// The client never retries by itself.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Remote(e) => e.status == 429 || e.status >= 500,
            _ => false,
        }
    }
}
