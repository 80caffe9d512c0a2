//! Typed endpoint requests
//!
//! Each request is a plain record of optional parameters implementing
//! [`Request`](crate::query::Request). Validation happens when rendering.

mod connections;
mod coverage;
mod journey;
mod search;

use std::fmt;

pub use connections::ConnectionsRequest;
pub use coverage::{ExploreRequest, RegionRequest};
pub use journey::{DateTimeRepresents, JourneyRequest, TravelerType};
pub use search::{PlacesRequest, PtObjectsRequest};

use crate::error::RenderError;
use crate::models::Coordinates;
use crate::results::Collection;

/// Which schedule data to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFreshness {
    BaseSchedule,
    AdaptedSchedule,
    Realtime,
}

impl DataFreshness {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseSchedule => "base_schedule",
            Self::AdaptedSchedule => "adapted_schedule",
            Self::Realtime => "realtime",
        }
    }
}

impl fmt::Display for DataFreshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the first or last mile is travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreetMode {
    Walking,
    Bike,
    Bss,
    Car,
    Ridesharing,
    Taxi,
}

impl StreetMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Bike => "bike",
            Self::Bss => "bss",
            Self::Car => "car",
            Self::Ridesharing => "ridesharing",
            Self::Taxi => "taxi",
        }
    }
}

impl fmt::Display for StreetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin or destination of a journey
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceRef {
    /// Any place id (`stop_area:...`, `admin:...`, ...)
    Id(String),
    Coordinates(Coordinates),
}

impl PlaceRef {
    pub(crate) fn render(&self, name: &'static str) -> Result<String, RenderError> {
        match self {
            Self::Id(id) if id.trim().is_empty() => Err(RenderError::InvalidParameter {
                name,
                reason: "place id must not be empty".to_string(),
            }),
            Self::Id(id) => Ok(id.clone()),
            Self::Coordinates(c) if !c.is_valid() => Err(RenderError::InvalidParameter {
                name,
                reason: format!("coordinates out of range: {c}"),
            }),
            Self::Coordinates(c) => Ok(c.to_query_value()),
        }
    }
}

impl From<Coordinates> for PlaceRef {
    fn from(c: Coordinates) -> Self {
        Self::Coordinates(c)
    }
}

impl From<&str> for PlaceRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for PlaceRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// Reject an explicit zero for a count-like parameter
pub(crate) fn positive(name: &'static str, value: Option<u32>) -> Result<Option<u32>, RenderError> {
    match value {
        Some(0) => Err(RenderError::InvalidParameter {
            name,
            reason: "must be greater than 0".to_string(),
        }),
        other => Ok(other),
    }
}

/// Path segments for `(collection, id)` parent filters followed by `last`
pub(crate) fn filter_segments<'a>(
    filters: &'a [(Collection, String)],
    last: &'a str,
) -> Result<Vec<&'a str>, RenderError> {
    let mut segments = Vec::with_capacity(filters.len() * 2 + 1);
    for (parent, id) in filters {
        if id.trim().is_empty() {
            return Err(RenderError::InvalidParameter {
                name: "filter",
                reason: format!("empty id for {parent}"),
            });
        }
        segments.push(parent.as_str());
        segments.push(id.as_str());
    }
    segments.push(last);
    Ok(segments)
}
