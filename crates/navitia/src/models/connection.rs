//! Departures and arrivals at a stop

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{DisplayInformations, Route, StopPoint};
use crate::datetime;

/// A single departure or arrival
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connection {
    pub display_informations: DisplayInformations,
    pub stop_point: StopPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    pub stop_date_time: StopDateTime,
}

/// Scheduled and realtime times at a stop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopDateTime {
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub departure_date_time: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub arrival_date_time: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub base_departure_date_time: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub base_arrival_date_time: Option<NaiveDateTime>,
    /// "base_schedule" or "realtime"
    pub data_freshness: String,
}

impl StopDateTime {
    /// Departure delay in minutes, when both times are known
    #[must_use]
    pub fn departure_delay_minutes(&self) -> Option<i64> {
        let actual = self.departure_date_time?;
        let base = self.base_departure_date_time?;
        Some((actual - base).num_minutes())
    }
}
