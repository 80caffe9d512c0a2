//! Journeys and their sections

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::datetime;

/// A complete itinerary from origin to destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Journey {
    /// Total duration in seconds
    pub duration: i64,
    pub nb_transfers: u32,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub departure_date_time: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub arrival_date_time: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub requested_date_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Container>,
    pub sections: Vec<Section>,
    /// Qualifier chosen by the planner ("best", "rapid", "comfort", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Worst disruption effect on the journey, empty if none
    pub status: String,
}

impl Journey {
    /// Total duration
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.duration)
    }

    /// Sections actually riding a vehicle
    pub fn public_transport_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionType::PublicTransport)
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(dep), Some(arr)) = (self.departure_date_time, self.arrival_date_time) else {
            return f.write_str("No journey data");
        };
        write!(
            f,
            "{} → {} ({}min, {} transfers)",
            dep.format("%H:%M"),
            arr.format("%H:%M"),
            self.duration / 60,
            self.nb_transfers
        )
    }
}

/// Kind of a journey section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    PublicTransport,
    StreetNetwork,
    Waiting,
    Transfer,
    CrowFly,
    OnDemandTransport,
    BssRent,
    BssPutBack,
    Boarding,
    Landing,
    Park,
    LeaveParking,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One leg of a journey
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Container>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub departure_date_time: Option<NaiveDateTime>,
    #[serde(with = "datetime::option", skip_serializing_if = "Option::is_none")]
    pub arrival_date_time: Option<NaiveDateTime>,
    /// Duration in seconds
    pub duration: i64,
    /// Street mode for street-network sections ("walking", "bike", ...)
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_informations: Option<DisplayInformations>,
}

/// Traveller-facing description of a vehicle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayInformations {
    pub network: String,
    pub direction: String,
    pub commercial_mode: String,
    pub physical_mode: String,
    pub label: String,
    pub code: String,
    pub color: String,
    pub headsign: String,
}
