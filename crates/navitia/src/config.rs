//! Session configuration

use serde::{Deserialize, Serialize};

/// Configuration for a Navitia [`Session`](crate::Session)
#[derive(Clone, Serialize, Deserialize)]
pub struct NavitiaConfig {
    /// Base URL of the API, including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key, sent as the HTTP Basic username (excluded from serialization)
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Hard ceiling on response bodies, whatever `Content-Length` says
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl std::fmt::Debug for NavitiaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavitiaConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Default response ceiling (10 MB)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10_000_000;

fn default_base_url() -> String {
    "https://api.navitia.io/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

fn default_user_agent() -> String {
    format!("navitia-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for NavitiaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl NavitiaConfig {
    /// Default configuration with the given API key
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("base_url is not a valid URL: {}", self.base_url));
        }

        if self.api_key.trim().is_empty() {
            return Err("api_key must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.max_response_bytes == 0 {
            return Err("max_response_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}
