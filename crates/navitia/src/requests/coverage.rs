//! Coverage requests: region listing and PT collection exploration

use super::{filter_segments, positive};
use crate::error::RenderError;
use crate::query::{QueryParams, Request};
use crate::results::Collection;

/// List coverage regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionRequest {
    pub count: Option<u32>,
    pub start_page: Option<u32>,
    /// Leave out region shapes, which can be large
    pub disable_geojson: bool,
}

impl Request for RegionRequest {
    fn to_query(&self) -> Result<QueryParams, RenderError> {
        let mut q = QueryParams::new();
        q.push_opt("count", positive("count", self.count)?);
        q.push_opt("start_page", self.start_page);
        if self.disable_geojson {
            q.push("disable_geojson", "true");
        }
        Ok(q)
    }
}

/// List one PT collection of a region, optionally filtered by parent objects
///
/// `ExploreRequest::new(Collection::Lines).within(Collection::StopAreas, "stop_area:X")`
/// maps to `/coverage/{region}/stop_areas/stop_area:X/lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreRequest {
    pub collection: Collection,
    /// Parent filters as (collection, id) path pairs
    pub filters: Vec<(Collection, String)>,
    pub count: Option<u32>,
    pub depth: Option<u32>,
    pub start_page: Option<u32>,
}

impl ExploreRequest {
    #[must_use]
    pub const fn new(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            count: None,
            depth: None,
            start_page: None,
        }
    }

    #[must_use]
    pub fn within(mut self, parent: Collection, id: impl Into<String>) -> Self {
        self.filters.push((parent, id.into()));
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Path segments below the region, collection last
    pub fn path_segments(&self) -> Result<Vec<&str>, RenderError> {
        filter_segments(&self.filters, self.collection.as_str())
    }
}

impl Request for ExploreRequest {
    fn to_query(&self) -> Result<QueryParams, RenderError> {
        let mut q = QueryParams::new();
        q.push_opt("count", positive("count", self.count)?);
        q.push_opt("depth", self.depth);
        q.push_opt("start_page", self.start_page);
        Ok(q)
    }
}
