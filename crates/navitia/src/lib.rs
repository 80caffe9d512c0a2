//! Client for the [Navitia](https://navitia.io) public transport API
//!
//! Provides journey planning, place and PT object autocomplete, departure and
//! arrival boards, coverage listings and collection exploration, with typed
//! requests, typed results and hypermedia pagination.
//!
//! # Architecture
//!
//! - [`Session`] holds the HTTP client and credentials and runs every call
//!   through one executor that handles auth, cancellation, the response size
//!   ceiling and remote error envelopes.
//! - Requests in [`requests`] render themselves into query parameters; nothing
//!   is sent when rendering fails.
//! - Polymorphic payloads arrive as [`Container`]s and are decoded lazily, once,
//!   into an [`Object`].
//! - Results carry [`Paging`] continuations that fetch further pages as the
//!   same result type.
//!
//! [`NavitiaClient`] abstracts the endpoints for callers that want to mock them.
//!
//! # Example
//!
//! ```rust,ignore
//! use navitia::{NavitiaClient, NavitiaConfig, Session};
//! use navitia::requests::JourneyRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! let session = Session::new(&NavitiaConfig::with_api_key("my-key"))?;
//! let cancel = CancellationToken::new();
//!
//! let request = JourneyRequest::new("stop_area:OIF:SA:8768600", "stop_area:OIF:SA:8739100");
//! let results = session.journeys(&cancel, &request).await?;
//! for journey in &results.journeys {
//!     println!("{journey}");
//! }
//!
//! if let Some(next) = &results.paging.next {
//!     let more = next.fetch(&session, &cancel).await?;
//! }
//! ```

mod config;
mod container;
pub mod datetime;
mod error;
pub mod models;
pub mod multi_shape;
mod paging;
mod query;
mod remote;
pub mod requests;
mod results;
mod session;

pub use config::{DEFAULT_MAX_RESPONSE_BYTES, NavitiaConfig};
pub use container::{
    Capability, Container, ContainerError, EmbeddedType, InvalidContainer, Object, Place,
    PtObject,
};
pub use error::{ErrorKind, NavitiaError, RenderError};
pub use multi_shape::MultiShape;
pub use paging::{Continuation, Link, Paging};
pub use query::{QueryParams, Request};
pub use remote::{RemoteError, describe};
pub use results::{
    Collection, Connections, ConnectionsResults, ExploreResults, JourneyResults, Pagination,
    PlacesResults, PtCollection, PtObjectsResults, RegionResults, Results, Timings,
};
#[cfg(any(test, feature = "mock"))]
pub use session::MockNavitiaClient;
pub use session::{NavitiaClient, Scope, Session};
pub use tokio_util::sync::CancellationToken;
