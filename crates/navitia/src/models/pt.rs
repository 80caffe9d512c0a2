//! Public transport objects: lines, routes, networks, modes, trips

use serde::{Deserialize, Serialize};

use crate::container::Container;

/// A commercial line ("RER A", "Bus 38")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    pub id: String,
    pub name: String,
    /// Short public code
    pub code: String,
    /// Hex colour without `#`
    pub color: String,
    pub text_color: String,
    pub opening_time: String,
    pub closing_time: String,
    pub routes: Vec<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_mode: Option<CommercialMode>,
    pub physical_modes: Vec<PhysicalMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
}

/// One direction of a line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub id: String,
    pub name: String,
    /// "True" / "False" as sent by the API
    pub is_frequence: String,
    /// Terminus, embedded as a place container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Box<Line>>,
}

/// An operating network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub id: String,
    pub name: String,
}

/// A mode as marketed to travellers ("Métro", "TER")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommercialMode {
    pub id: String,
    pub name: String,
}

/// The vehicle type actually used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalMode {
    pub id: String,
    pub name: String,
}

/// A transport operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub id: String,
    pub name: String,
}

/// A trip identifier shared by vehicle journeys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trip {
    pub id: String,
    pub name: String,
}

/// A single run of a vehicle along a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleJourney {
    pub id: String,
    pub name: String,
    pub headsign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip: Option<Trip>,
}
