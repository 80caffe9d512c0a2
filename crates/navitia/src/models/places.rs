//! Place-like objects: stop areas, stop points, addresses, POIs, admins

use serde::{Deserialize, Serialize};

use super::{Coordinates, PhysicalMode};

/// A group of stop points forming one station
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopArea {
    pub id: String,
    pub name: String,
    /// Name with its city, e.g. "Gare de Lyon (Paris)"
    pub label: String,
    pub coord: Coordinates,
    pub timezone: String,
    pub administrative_regions: Vec<Admin>,
    pub stop_points: Vec<StopPoint>,
}

/// A single boarding position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopPoint {
    pub id: String,
    pub name: String,
    pub label: String,
    pub coord: Coordinates,
    pub administrative_regions: Vec<Admin>,
    /// Accessibility equipment ("has_wheelchair_boarding", ...)
    pub equipments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_area: Option<Box<StopArea>>,
    pub physical_modes: Vec<PhysicalMode>,
}

/// A street address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub id: String,
    pub name: String,
    pub label: String,
    pub coord: Coordinates,
    pub house_number: u32,
    pub administrative_regions: Vec<Admin>,
}

/// Category of a point of interest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiType {
    pub id: String,
    pub name: String,
}

/// A point of interest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub label: String,
    pub coord: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poi_type: Option<PoiType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub administrative_regions: Vec<Admin>,
}

/// An administrative region (city, district, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub label: String,
    pub coord: Coordinates,
    /// OSM admin level
    pub level: u32,
    pub zip_code: String,
    pub insee: String,
}
