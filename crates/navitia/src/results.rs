//! Endpoint results
//!
//! Every result type records lifecycle timestamps and carries its own
//! [`Paging`], so follow-up pages come back as the same type.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::container::Container;
use crate::models::{
    CommercialMode, Company, Connection, Journey, Line, Network, PhysicalMode, Poi, Region, Route,
    StopArea, StopPoint, VehicleJourney,
};
use crate::multi_shape::{self, MultiShape};
use crate::paging::Paging;

/// A decodable endpoint result
pub trait Results: DeserializeOwned + Send + 'static {
    fn timings(&self) -> &Timings;
    fn timings_mut(&mut self) -> &mut Timings;
}

/// Lifecycle timestamps of a call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timings {
    /// Before anything was sent
    pub created: Option<DateTime<Utc>>,
    /// When the response headers arrived (or the send failed)
    pub sent: Option<DateTime<Utc>>,
    /// When the body was fully decoded
    pub parsed: Option<DateTime<Utc>>,
}

impl Timings {
    pub(crate) fn creating(&mut self) {
        self.created = Some(Utc::now());
    }

    pub(crate) fn sending(&mut self) {
        self.sent = Some(Utc::now());
    }

    pub(crate) fn parsing(&mut self) {
        self.parsed = Some(Utc::now());
    }

    /// Time spent waiting for the server to answer
    #[must_use]
    pub fn wait_time(&self) -> Option<TimeDelta> {
        Some(self.sent? - self.created?)
    }

    /// Time spent reading and decoding the body
    #[must_use]
    pub fn decode_time(&self) -> Option<TimeDelta> {
        Some(self.parsed? - self.sent?)
    }
}

/// Page counters sent alongside listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub start_page: u32,
    pub items_on_page: u32,
    pub items_per_page: u32,
    pub total_result: u32,
}

macro_rules! impl_results {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Results for $ty {
                fn timings(&self) -> &Timings {
                    &self.timings
                }

                fn timings_mut(&mut self) -> &mut Timings {
                    &mut self.timings
                }
            }
        )+
    };
}

impl_results!(
    JourneyResults,
    PlacesResults,
    PtObjectsResults,
    RegionResults,
    ConnectionsResults,
    ExploreResults,
);

/// Result of `/journeys`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JourneyResults {
    pub journeys: Vec<Journey>,
    #[serde(rename = "links")]
    pub paging: Paging<JourneyResults>,
    #[serde(skip)]
    pub timings: Timings,
}

/// Result of `/places`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacesResults {
    pub places: Vec<Container>,
    #[serde(rename = "links")]
    pub paging: Paging<PlacesResults>,
    #[serde(skip)]
    pub timings: Timings,
}

/// Result of `/pt_objects`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PtObjectsResults {
    pub pt_objects: Vec<Container>,
    #[serde(rename = "links")]
    pub paging: Paging<PtObjectsResults>,
    #[serde(skip)]
    pub timings: Timings,
}

/// Result of `/coverage`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegionResults {
    pub regions: Vec<Region>,
    pub pagination: Option<Pagination>,
    #[serde(rename = "links")]
    pub paging: Paging<RegionResults>,
    #[serde(skip)]
    pub timings: Timings,
}

/// Departures or arrivals, depending on the endpoint that answered
#[derive(Debug, Clone, PartialEq)]
pub enum Connections {
    Departures(Vec<Connection>),
    Arrivals(Vec<Connection>),
}

impl Connections {
    #[must_use]
    pub fn as_slice(&self) -> &[Connection] {
        match self {
            Self::Departures(c) | Self::Arrivals(c) => c,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl Default for Connections {
    fn default() -> Self {
        Self::Departures(Vec::new())
    }
}

impl MultiShape for Connections {
    const CANDIDATES: &'static [&'static str] = &["departures", "arrivals"];

    fn decode_candidate(key: &str, raw: &RawValue) -> Result<Self, serde_json::Error> {
        let connections = serde_json::from_str(raw.get())?;
        Ok(if key == "arrivals" {
            Self::Arrivals(connections)
        } else {
            Self::Departures(connections)
        })
    }
}

/// Result of `/departures` and `/arrivals`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionsResults {
    pub connections: Connections,
    pub pagination: Option<Pagination>,
    pub paging: Paging<ConnectionsResults>,
    pub timings: Timings,
}

impl<'de> Deserialize<'de> for ConnectionsResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = HashMap::<String, Box<RawValue>>::deserialize(deserializer)?;
        let decoded = multi_shape::decode::<Connections>(fields).map_err(de::Error::custom)?;
        Ok(Self {
            pagination: decoded.optional("pagination").map_err(de::Error::custom)?,
            paging: Paging::from_links(&decoded.links),
            connections: decoded.shape,
            timings: Timings::default(),
        })
    }
}

/// PT collections that can be listed under a coverage region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    StopAreas,
    StopPoints,
    Lines,
    Routes,
    Networks,
    CommercialModes,
    PhysicalModes,
    Companies,
    VehicleJourneys,
    Pois,
}

impl Collection {
    /// Every collection, in decoding priority order
    pub const ALL: [Self; 10] = [
        Self::StopAreas,
        Self::StopPoints,
        Self::Lines,
        Self::Routes,
        Self::Networks,
        Self::CommercialModes,
        Self::PhysicalModes,
        Self::Companies,
        Self::VehicleJourneys,
        Self::Pois,
    ];

    /// Response key and URL path segment
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StopAreas => "stop_areas",
            Self::StopPoints => "stop_points",
            Self::Lines => "lines",
            Self::Routes => "routes",
            Self::Networks => "networks",
            Self::CommercialModes => "commercial_modes",
            Self::PhysicalModes => "physical_modes",
            Self::Companies => "companies",
            Self::VehicleJourneys => "vehicle_journeys",
            Self::Pois => "pois",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One PT collection, typed by its key
#[derive(Debug, Clone, PartialEq)]
pub enum PtCollection {
    StopAreas(Vec<StopArea>),
    StopPoints(Vec<StopPoint>),
    Lines(Vec<Line>),
    Routes(Vec<Route>),
    Networks(Vec<Network>),
    CommercialModes(Vec<CommercialMode>),
    PhysicalModes(Vec<PhysicalMode>),
    Companies(Vec<Company>),
    VehicleJourneys(Vec<VehicleJourney>),
    Pois(Vec<Poi>),
}

impl PtCollection {
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::StopAreas(_) => Collection::StopAreas,
            Self::StopPoints(_) => Collection::StopPoints,
            Self::Lines(_) => Collection::Lines,
            Self::Routes(_) => Collection::Routes,
            Self::Networks(_) => Collection::Networks,
            Self::CommercialModes(_) => Collection::CommercialModes,
            Self::PhysicalModes(_) => Collection::PhysicalModes,
            Self::Companies(_) => Collection::Companies,
            Self::VehicleJourneys(_) => Collection::VehicleJourneys,
            Self::Pois(_) => Collection::Pois,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::StopAreas(v) => v.len(),
            Self::StopPoints(v) => v.len(),
            Self::Lines(v) => v.len(),
            Self::Routes(v) => v.len(),
            Self::Networks(v) => v.len(),
            Self::CommercialModes(v) => v.len(),
            Self::PhysicalModes(v) => v.len(),
            Self::Companies(v) => v.len(),
            Self::VehicleJourneys(v) => v.len(),
            Self::Pois(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PtCollection {
    fn default() -> Self {
        Self::StopAreas(Vec::new())
    }
}

impl MultiShape for PtCollection {
    const CANDIDATES: &'static [&'static str] = &[
        Collection::StopAreas.as_str(),
        Collection::StopPoints.as_str(),
        Collection::Lines.as_str(),
        Collection::Routes.as_str(),
        Collection::Networks.as_str(),
        Collection::CommercialModes.as_str(),
        Collection::PhysicalModes.as_str(),
        Collection::Companies.as_str(),
        Collection::VehicleJourneys.as_str(),
        Collection::Pois.as_str(),
    ];

    fn decode_candidate(key: &str, raw: &RawValue) -> Result<Self, serde_json::Error> {
        let json = raw.get();
        let Some(collection) = Collection::ALL.into_iter().find(|c| c.as_str() == key) else {
            return Err(de::Error::custom(format!("{key:?} is not a PT collection")));
        };
        Ok(match collection {
            Collection::StopAreas => Self::StopAreas(serde_json::from_str(json)?),
            Collection::StopPoints => Self::StopPoints(serde_json::from_str(json)?),
            Collection::Lines => Self::Lines(serde_json::from_str(json)?),
            Collection::Routes => Self::Routes(serde_json::from_str(json)?),
            Collection::Networks => Self::Networks(serde_json::from_str(json)?),
            Collection::CommercialModes => Self::CommercialModes(serde_json::from_str(json)?),
            Collection::PhysicalModes => Self::PhysicalModes(serde_json::from_str(json)?),
            Collection::Companies => Self::Companies(serde_json::from_str(json)?),
            Collection::VehicleJourneys => Self::VehicleJourneys(serde_json::from_str(json)?),
            Collection::Pois => Self::Pois(serde_json::from_str(json)?),
        })
    }
}

/// Result of listing a PT collection under a region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreResults {
    pub objects: PtCollection,
    pub pagination: Option<Pagination>,
    pub paging: Paging<ExploreResults>,
    pub timings: Timings,
}

impl<'de> Deserialize<'de> for ExploreResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = HashMap::<String, Box<RawValue>>::deserialize(deserializer)?;
        let decoded = multi_shape::decode::<PtCollection>(fields).map_err(de::Error::custom)?;
        Ok(Self {
            pagination: decoded.optional("pagination").map_err(de::Error::custom)?,
            paging: Paging::from_links(&decoded.links),
            objects: decoded.shape,
            timings: Timings::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journey_results() {
        let json = r#"{
            "journeys": [{"duration": 600, "type": "best", "sections": []}],
            "links": [{"href": "https://api.navitia.io/v1/journeys?after=1", "type": "next", "rel": "next"}]
        }"#;
        let results: JourneyResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.journeys.len(), 1);
        assert!(results.paging.next.is_some());
        assert!(results.paging.previous.is_none());
        assert_eq!(results.timings, Timings::default());
    }

    #[test]
    fn test_places_without_links() {
        let json = r#"{"places": [{"id": "admin:1", "name": "Paris", "embedded_type": "administrative_region",
            "quality": 90, "administrative_region": {"id": "admin:1", "name": "Paris", "level": 8}}]}"#;
        let results: PlacesResults = serde_json::from_str(json).unwrap();
        assert!(results.paging.is_terminal());
        let place = results.places[0].place().unwrap().unwrap();
        assert_eq!(place.name(), "Paris");
    }

    #[test]
    fn test_departures() {
        let json = r#"{
            "departures": [{"display_informations": {"code": "A"}, "stop_point": {"id": "sp:1"},
                "stop_date_time": {"departure_date_time": "20260211T100000"}}],
            "pagination": {"start_page": 0, "items_on_page": 1, "items_per_page": 10, "total_result": 1},
            "links": []
        }"#;
        let results: ConnectionsResults = serde_json::from_str(json).unwrap();
        assert!(matches!(results.connections, Connections::Departures(ref c) if c.len() == 1));
        assert_eq!(results.pagination.unwrap().total_result, 1);
        assert!(results.paging.is_terminal());
    }

    #[test]
    fn test_arrivals() {
        let json = r#"{"arrivals": [], "links": [{"href": "https://a/next", "type": "next"}]}"#;
        let results: ConnectionsResults = serde_json::from_str(json).unwrap();
        assert!(matches!(results.connections, Connections::Arrivals(_)));
        assert!(results.connections.is_empty());
        assert_eq!(results.paging.next.unwrap().href(), "https://a/next");
    }

    #[test]
    fn test_connections_need_links() {
        let err = serde_json::from_str::<ConnectionsResults>(r#"{"departures": []}"#).unwrap_err();
        assert!(err.to_string().contains("no links field found"));
    }

    #[test]
    fn test_connections_no_known_key() {
        let err =
            serde_json::from_str::<ConnectionsResults>(r#"{"links": [], "journeys": []}"#).unwrap_err();
        assert!(err.to_string().contains("no known key in response"));
    }

    #[test]
    fn test_explore_each_collection() {
        for collection in Collection::ALL {
            let json = format!(r#"{{"links": [], "{collection}": [{{"id": "x:1", "name": "X"}}]}}"#);
            let results: ExploreResults = serde_json::from_str(&json).unwrap();
            assert_eq!(results.objects.collection(), collection);
            assert_eq!(results.objects.len(), 1);
        }
    }

    #[test]
    fn test_explore_lines() {
        let json = r#"{"links": [], "lines": [{"id": "line:A", "name": "RER A", "code": "A"}],
            "pagination": {"total_result": 12}}"#;
        let results: ExploreResults = serde_json::from_str(json).unwrap();
        let PtCollection::Lines(lines) = &results.objects else {
            panic!("expected lines");
        };
        assert_eq!(lines[0].code, "A");
        assert_eq!(results.pagination.unwrap().total_result, 12);
    }

    #[test]
    fn test_explore_ambiguous_response_is_deterministic() {
        let json = r#"{"links": [], "routes": [], "lines": [{"id": "line:A"}], "stop_areas": []}"#;
        let results: ExploreResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.objects.collection(), Collection::StopAreas);
    }

    #[test]
    fn test_candidate_order_matches_collections() {
        let keys: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(keys, PtCollection::CANDIDATES);
    }

    #[test]
    fn test_timings() {
        let mut timings = Timings::default();
        assert!(timings.wait_time().is_none());
        timings.creating();
        timings.sending();
        timings.parsing();
        assert!(timings.wait_time().unwrap() >= TimeDelta::zero());
        assert!(timings.decode_time().unwrap() >= TimeDelta::zero());
    }
}
