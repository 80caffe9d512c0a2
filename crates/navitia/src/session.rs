//! Navitia session: request execution and endpoint helpers
//!
//! A [`Session`] owns the HTTP client and the credentials. Every call runs
//! through [`Session::execute_url`], which handles authentication,
//! cancellation, the response size ceiling, remote error envelopes and
//! decoding into the typed result.

use std::any::type_name;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::NavitiaConfig;
use crate::error::{NavitiaError, RenderError};
use crate::query::Request;
use crate::remote::RemoteError;
use crate::requests::{
    ConnectionsRequest, ExploreRequest, JourneyRequest, PlacesRequest, PtObjectsRequest,
    RegionRequest,
};
use crate::results::{
    ConnectionsResults, ExploreResults, JourneyResults, PlacesResults, PtObjectsResults,
    RegionResults, Results, Timings,
};

/// Trait for Navitia API clients
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait NavitiaClient: Send + Sync {
    /// Plan journeys between two places
    async fn journeys(
        &self,
        cancel: &CancellationToken,
        request: &JourneyRequest,
    ) -> Result<JourneyResults, NavitiaError>;

    /// Autocomplete places
    async fn places(
        &self,
        cancel: &CancellationToken,
        request: &PlacesRequest,
    ) -> Result<PlacesResults, NavitiaError>;

    /// Autocomplete public transport objects
    async fn pt_objects(
        &self,
        cancel: &CancellationToken,
        request: &PtObjectsRequest,
    ) -> Result<PtObjectsResults, NavitiaError>;

    /// List coverage regions
    async fn regions(
        &self,
        cancel: &CancellationToken,
        request: &RegionRequest,
    ) -> Result<RegionResults, NavitiaError>;

    /// Next departures in a region
    async fn departures(
        &self,
        cancel: &CancellationToken,
        region: &str,
        request: &ConnectionsRequest,
    ) -> Result<ConnectionsResults, NavitiaError>;

    /// Next arrivals in a region
    async fn arrivals(
        &self,
        cancel: &CancellationToken,
        region: &str,
        request: &ConnectionsRequest,
    ) -> Result<ConnectionsResults, NavitiaError>;

    /// List one PT collection of a region
    async fn explore(
        &self,
        cancel: &CancellationToken,
        region: &str,
        request: &ExploreRequest,
    ) -> Result<ExploreResults, NavitiaError>;
}

/// An authenticated connection to the Navitia API
///
/// Immutable once built; clone it freely or share it between tasks.
#[derive(Clone)]
pub struct Session {
    client: Client,
    base_url: Url,
    api_key: String,
    timeout_secs: u64,
    max_response_bytes: usize,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a new session
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &NavitiaConfig) -> Result<Self, NavitiaError> {
        config.validate().map_err(NavitiaError::Configuration)?;

        let base_url = Url::parse(&config.base_url).map_err(|source| NavitiaError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NavitiaError::Configuration(format!(
                "base_url cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| NavitiaError::Transport {
                context: "building the HTTP client",
                source,
            })?;

        debug!(base_url = %base_url, timeout_secs = config.timeout_secs, "Navitia session created");

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoints scoped to one coverage region
    #[must_use]
    pub const fn scope<'a>(&'a self, region: &'a str) -> Scope<'a> {
        Scope {
            session: self,
            region,
        }
    }

    /// Base URL with `segments` appended to its path
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, NavitiaError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                NavitiaError::Configuration(format!("base_url cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Render `request`, append it to `url` and run the call
    ///
    /// Nothing is sent when rendering fails.
    ///
    /// # Errors
    ///
    /// See [`Session::execute_url`]; render failures come back as
    /// [`NavitiaError::Render`].
    pub async fn execute<T, R>(
        &self,
        cancel: &CancellationToken,
        mut url: Url,
        request: &R,
    ) -> Result<T, NavitiaError>
    where
        T: Results,
        R: Request + Sync + ?Sized,
    {
        let query = request.to_query()?;
        query.apply_to(&mut url);
        self.execute_url(cancel, url).await
    }

    /// Run one GET against a fully built URL and decode the body into `T`
    ///
    /// # Errors
    ///
    /// - [`NavitiaError::Canceled`] if the token fires before the body is read
    /// - [`NavitiaError::Timeout`] / [`NavitiaError::Transport`] on client failures
    /// - [`NavitiaError::Remote`] for any status other than 200
    /// - [`NavitiaError::Decode`] if the body is not a valid `T`
    #[instrument(skip(self, cancel, url), fields(url = %url, result = type_name::<T>()))]
    pub async fn execute_url<T: Results>(
        &self,
        cancel: &CancellationToken,
        url: Url,
    ) -> Result<T, NavitiaError> {
        let mut timings = Timings::default();
        timings.creating();

        if cancel.is_cancelled() {
            debug!("Call canceled before sending");
            return Err(NavitiaError::Canceled);
        }

        let request = self
            .client
            .get(url)
            .basic_auth(&self.api_key, None::<&str>)
            .send();

        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            response = request => Some(response),
        };
        timings.sending();

        let response = sent
            .ok_or(NavitiaError::Canceled)?
            .map_err(|e| self.transport_error("sending the request", e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Response received");

        if status != StatusCode::OK {
            let body = self.read_body(cancel, response).await?;
            let remote = RemoteError::from_body(status.as_u16(), &body).map_err(|source| {
                NavitiaError::Decode {
                    context: "error response",
                    source,
                }
            })?;
            warn!(status = remote.status, id = %remote.id, "Navitia rejected the request");
            return Err(remote.into());
        }

        if cancel.is_cancelled() {
            return Err(NavitiaError::Canceled);
        }

        let body = self.read_body(cancel, response).await?;
        let mut results: T = serde_json::from_slice(&body).map_err(|source| NavitiaError::Decode {
            context: type_name::<T>(),
            source,
        })?;
        timings.parsing();
        *results.timings_mut() = timings;

        debug!(
            bytes = body.len(),
            wait_ms = timings.wait_time().map(|d| d.num_milliseconds()),
            decode_ms = timings.decode_time().map(|d| d.num_milliseconds()),
            "Response decoded"
        );
        Ok(results)
    }

    /// Read at most `max_response_bytes` of the body, whatever the headers claim
    async fn read_body(
        &self,
        cancel: &CancellationToken,
        mut response: Response,
    ) -> Result<Vec<u8>, NavitiaError> {
        let limit = self.max_response_bytes;
        let hint = response
            .content_length()
            .and_then(|n| usize::try_from(n).ok())
            .map_or(0, |n| n.min(limit));
        let mut body = Vec::with_capacity(hint);

        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(NavitiaError::Canceled),
                chunk = response.chunk() => chunk.map_err(|e| self.transport_error("reading the response body", e))?,
            };
            let Some(chunk) = chunk else {
                break;
            };

            let room = limit - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                if chunk.len() > room {
                    warn!(limit, "Response body exceeds the size ceiling, truncated");
                }
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn transport_error(&self, context: &'static str, source: reqwest::Error) -> NavitiaError {
        if source.is_timeout() {
            NavitiaError::Timeout {
                timeout_secs: self.timeout_secs,
                source,
            }
        } else {
            NavitiaError::Transport { context, source }
        }
    }
}

#[async_trait]
impl NavitiaClient for Session {
    #[instrument(skip(self, cancel, request))]
    async fn journeys(
        &self,
        cancel: &CancellationToken,
        request: &JourneyRequest,
    ) -> Result<JourneyResults, NavitiaError> {
        let url = self.endpoint(&["journeys"])?;
        self.execute(cancel, url, request).await
    }

    #[instrument(skip(self, cancel, request), fields(q = %request.query))]
    async fn places(
        &self,
        cancel: &CancellationToken,
        request: &PlacesRequest,
    ) -> Result<PlacesResults, NavitiaError> {
        let url = self.endpoint(&["places"])?;
        self.execute(cancel, url, request).await
    }

    #[instrument(skip(self, cancel, request), fields(q = %request.query))]
    async fn pt_objects(
        &self,
        cancel: &CancellationToken,
        request: &PtObjectsRequest,
    ) -> Result<PtObjectsResults, NavitiaError> {
        let url = self.endpoint(&["pt_objects"])?;
        self.execute(cancel, url, request).await
    }

    #[instrument(skip(self, cancel, request))]
    async fn regions(
        &self,
        cancel: &CancellationToken,
        request: &RegionRequest,
    ) -> Result<RegionResults, NavitiaError> {
        let url = self.endpoint(&["coverage"])?;
        self.execute(cancel, url, request).await
    }

    async fn departures(
        &self,
        cancel: &CancellationToken,
        region: &str,
        request: &ConnectionsRequest,
    ) -> Result<ConnectionsResults, NavitiaError> {
        self.scope(region).departures(cancel, request).await
    }

    async fn arrivals(
        &self,
        cancel: &CancellationToken,
        region: &str,
        request: &ConnectionsRequest,
    ) -> Result<ConnectionsResults, NavitiaError> {
        self.scope(region).arrivals(cancel, request).await
    }

    async fn explore(
        &self,
        cancel: &CancellationToken,
        region: &str,
        request: &ExploreRequest,
    ) -> Result<ExploreResults, NavitiaError> {
        self.scope(region).explore(cancel, request).await
    }
}

/// Endpoints below `/coverage/{region}`
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    session: &'a Session,
    region: &'a str,
}

impl Scope<'_> {
    #[must_use]
    pub const fn region(&self) -> &str {
        self.region
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url, NavitiaError> {
        if self.region.trim().is_empty() {
            return Err(RenderError::InvalidParameter {
                name: "region",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        let mut segments = Vec::with_capacity(tail.len() + 2);
        segments.push("coverage");
        segments.push(self.region);
        segments.extend_from_slice(tail);
        self.session.endpoint(&segments)
    }

    /// Details of this region
    ///
    /// # Errors
    ///
    /// See [`Session::execute_url`].
    #[instrument(skip(self, cancel), fields(region = self.region))]
    pub async fn coverage(&self, cancel: &CancellationToken) -> Result<RegionResults, NavitiaError> {
        let url = self.endpoint(&[])?;
        self.session.execute(cancel, url, &RegionRequest::default()).await
    }

    /// Plan journeys inside this region
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    #[instrument(skip(self, cancel, request), fields(region = self.region))]
    pub async fn journeys(
        &self,
        cancel: &CancellationToken,
        request: &JourneyRequest,
    ) -> Result<JourneyResults, NavitiaError> {
        let url = self.endpoint(&["journeys"])?;
        self.session.execute(cancel, url, request).await
    }

    /// Autocomplete places inside this region
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    #[instrument(skip(self, cancel, request), fields(region = self.region, q = %request.query))]
    pub async fn places(
        &self,
        cancel: &CancellationToken,
        request: &PlacesRequest,
    ) -> Result<PlacesResults, NavitiaError> {
        let url = self.endpoint(&["places"])?;
        self.session.execute(cancel, url, request).await
    }

    /// Autocomplete PT objects inside this region
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    #[instrument(skip(self, cancel, request), fields(region = self.region, q = %request.query))]
    pub async fn pt_objects(
        &self,
        cancel: &CancellationToken,
        request: &PtObjectsRequest,
    ) -> Result<PtObjectsResults, NavitiaError> {
        let url = self.endpoint(&["pt_objects"])?;
        self.session.execute(cancel, url, request).await
    }

    /// Departure board
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    #[instrument(skip(self, cancel, request), fields(region = self.region))]
    pub async fn departures(
        &self,
        cancel: &CancellationToken,
        request: &ConnectionsRequest,
    ) -> Result<ConnectionsResults, NavitiaError> {
        let url = self.endpoint(&request.path_segments("departures")?)?;
        self.session.execute(cancel, url, request).await
    }

    /// Arrival board
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    #[instrument(skip(self, cancel, request), fields(region = self.region))]
    pub async fn arrivals(
        &self,
        cancel: &CancellationToken,
        request: &ConnectionsRequest,
    ) -> Result<ConnectionsResults, NavitiaError> {
        let url = self.endpoint(&request.path_segments("arrivals")?)?;
        self.session.execute(cancel, url, request).await
    }

    /// List one PT collection
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    #[instrument(skip(self, cancel, request), fields(region = self.region, collection = %request.collection))]
    pub async fn explore(
        &self,
        cancel: &CancellationToken,
        request: &ExploreRequest,
    ) -> Result<ExploreResults, NavitiaError> {
        let url = self.endpoint(&request.path_segments()?)?;
        self.session.execute(cancel, url, request).await
    }
}
