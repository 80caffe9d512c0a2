//! Navitia data models
//!
//! Typed representations of the objects the API returns. Field names follow
//! the wire format; everything the API may omit is defaulted.

mod connection;
mod journey;
mod places;
mod pt;
mod region;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use connection::{Connection, StopDateTime};
pub use journey::{DisplayInformations, Journey, Section, SectionType};
pub use places::{Address, Admin, Poi, PoiType, StopArea, StopPoint};
pub use pt::{CommercialMode, Company, Line, Network, PhysicalMode, Route, Trip, VehicleJourney};
pub use region::Region;

/// A WGS84 position
///
/// The API sends both components as strings; numbers are accepted too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    #[serde(rename = "lat", deserialize_with = "lenient_f64")]
    pub latitude: f64,
    /// Longitude in degrees
    #[serde(rename = "lon", deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components lie within WGS84 bounds
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Render as the `lon;lat` form used in query parameters and ids
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("{};{}", self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) if s.is_empty() => Ok(0.0),
        NumberOrString::String(s) => s
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid coordinate {s:?}: {e}"))),
    }
}
