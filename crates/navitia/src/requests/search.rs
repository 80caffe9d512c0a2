//! Free-text search requests: `/places` and `/pt_objects`

use super::positive;
use crate::container::EmbeddedType;
use crate::error::RenderError;
use crate::models::Coordinates;
use crate::query::{QueryParams, Request};

fn render_query(query: &str) -> Result<&str, RenderError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(RenderError::EmptyQuery);
    }
    Ok(query)
}

/// Place autocomplete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacesRequest {
    pub query: String,
    /// Restrict to these place types
    pub types: Vec<EmbeddedType>,
    pub count: Option<u32>,
    /// Nesting depth of returned objects (0-3)
    pub depth: Option<u32>,
    /// Favour results close to this point
    pub around: Option<Coordinates>,
}

impl PlacesRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, kind: EmbeddedType) -> Self {
        self.types.push(kind);
        self
    }
}

impl Request for PlacesRequest {
    fn to_query(&self) -> Result<QueryParams, RenderError> {
        let mut q = QueryParams::new();
        q.push("q", render_query(&self.query)?);
        for kind in &self.types {
            if !kind.is_place() {
                return Err(RenderError::InvalidParameter {
                    name: "type[]",
                    reason: format!("{kind} is not a place type"),
                });
            }
            q.push("type[]", kind);
        }
        q.push_opt("count", positive("count", self.count)?);
        q.push_opt("depth", self.depth);
        if let Some(around) = &self.around {
            q.push("from", around.to_query_value());
        }
        Ok(q)
    }
}

/// PT object autocomplete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PtObjectsRequest {
    pub query: String,
    /// Restrict to these PT object types
    pub types: Vec<EmbeddedType>,
    pub count: Option<u32>,
}

impl PtObjectsRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, kind: EmbeddedType) -> Self {
        self.types.push(kind);
        self
    }
}

impl Request for PtObjectsRequest {
    fn to_query(&self) -> Result<QueryParams, RenderError> {
        let mut q = QueryParams::new();
        q.push("q", render_query(&self.query)?);
        for kind in &self.types {
            if !kind.is_pt_object() {
                return Err(RenderError::InvalidParameter {
                    name: "type[]",
                    reason: format!("{kind} is not a PT object type"),
                });
            }
            q.push("type[]", kind);
        }
        q.push_opt("count", positive("count", self.count)?);
        Ok(q)
    }
}
