//! `/departures` and `/arrivals` request

use chrono::NaiveDateTime;

use super::{DataFreshness, filter_segments, positive};
use crate::datetime;
use crate::error::RenderError;
use crate::query::{QueryParams, Request};
use crate::results::Collection;

/// Departures or arrivals within a time window
///
/// The window is sent as `from_datetime` + `duration`; an open start with a
/// fixed end is sent as `until_datetime`. Filters select the stop, line or
/// route the board is built for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionsRequest {
    pub filters: Vec<(Collection, String)>,
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub count: Option<u32>,
    pub depth: Option<u32>,
    pub forbidden: Vec<String>,
    pub freshness: Option<DataFreshness>,
}

impl ConnectionsRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a parent object, e.g. `(Collection::StopAreas, "stop_area:X")`
    #[must_use]
    pub fn at(mut self, parent: Collection, id: impl Into<String>) -> Self {
        self.filters.push((parent, id.into()));
        self
    }

    /// Path segments below the region, `endpoint` last
    pub fn path_segments<'a>(&'a self, endpoint: &'a str) -> Result<Vec<&'a str>, RenderError> {
        filter_segments(&self.filters, endpoint)
    }

    #[must_use]
    pub const fn between(mut self, since: NaiveDateTime, until: NaiveDateTime) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

impl Request for ConnectionsRequest {
    fn to_query(&self) -> Result<QueryParams, RenderError> {
        let mut q = QueryParams::new();
        match (self.since, self.until) {
            (Some(since), Some(until)) => {
                if until < since {
                    return Err(RenderError::InvertedWindow { since, until });
                }
                q.push("from_datetime", datetime::format(&since));
                q.push("duration", (until - since).num_seconds());
            },
            (Some(since), None) => q.push("from_datetime", datetime::format(&since)),
            (None, Some(until)) => q.push("until_datetime", datetime::format(&until)),
            (None, None) => {},
        }
        q.push_opt("count", positive("count", self.count)?);
        q.push_opt("depth", self.depth);
        q.push_all("forbidden_uris[]", &self.forbidden);
        q.push_opt("data_freshness", self.freshness);
        Ok(q)
    }
}
