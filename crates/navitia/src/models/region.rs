//! Coverage regions

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::datetime;

/// A coverage region served by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub id: String,
    pub name: String,
    /// "running", "loading", ...
    pub status: String,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub start_production_date: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub end_production_date: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub last_load_at: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub dataset_created_at: Option<NaiveDateTime>,
    /// WKT multipolygon of the covered area
    pub shape: String,
}

impl Region {
    /// Whether the region currently answers requests
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}
