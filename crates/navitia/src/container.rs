//! Discriminated containers
//!
//! The API wraps places and PT objects in a uniform envelope:
//!
//! ```json
//! {"id": "...", "name": "...", "embedded_type": "stop_area", "quality": 90,
//!  "stop_area": { ... }}
//! ```
//!
//! A [`Container`] keeps the payload as raw JSON and decodes it into an
//! [`Object`] the first time it is asked for. The decoded value is memoized
//! behind a per-container read/write lock, so a container may be shared
//! between threads and materialized from any of them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::trace;

use crate::models::{
    Address, Admin, CommercialMode, Coordinates, Line, Network, Poi, Route, StopArea, StopPoint,
    Trip,
};

/// Discriminator of an embedded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddedType {
    StopArea,
    Poi,
    Address,
    StopPoint,
    Admin,
    Line,
    Route,
    Network,
    CommercialMode,
    Trip,
}

impl EmbeddedType {
    /// Every known discriminator
    pub const ALL: [Self; 10] = [
        Self::StopArea,
        Self::Poi,
        Self::Address,
        Self::StopPoint,
        Self::Admin,
        Self::Line,
        Self::Route,
        Self::Network,
        Self::CommercialMode,
        Self::Trip,
    ];

    /// Wire name, also the key holding the payload
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StopArea => "stop_area",
            Self::Poi => "poi",
            Self::Address => "address",
            Self::StopPoint => "stop_point",
            Self::Admin => "administrative_region",
            Self::Line => "line",
            Self::Route => "route",
            Self::Network => "network",
            Self::CommercialMode => "commercial_mode",
            Self::Trip => "trip",
        }
    }

    /// Whether objects of this type can be narrowed to a [`Place`]
    #[must_use]
    pub const fn is_place(self) -> bool {
        matches!(
            self,
            Self::StopArea | Self::Poi | Self::Address | Self::StopPoint | Self::Admin
        )
    }

    /// Whether objects of this type can be narrowed to a [`PtObject`]
    #[must_use]
    pub const fn is_pt_object(self) -> bool {
        matches!(
            self,
            Self::StopArea
                | Self::StopPoint
                | Self::Line
                | Self::Route
                | Self::Network
                | Self::CommercialMode
                | Self::Trip
        )
    }

    /// Decode a raw payload into the concrete type for this discriminator
    pub fn decode(self, raw: &RawValue) -> Result<Object, serde_json::Error> {
        let json = raw.get();
        Ok(match self {
            Self::StopArea => Object::StopArea(serde_json::from_str(json)?),
            Self::Poi => Object::Poi(serde_json::from_str(json)?),
            Self::Address => Object::Address(serde_json::from_str(json)?),
            Self::StopPoint => Object::StopPoint(serde_json::from_str(json)?),
            Self::Admin => Object::Admin(serde_json::from_str(json)?),
            Self::Line => Object::Line(serde_json::from_str(json)?),
            Self::Route => Object::Route(serde_json::from_str(json)?),
            Self::Network => Object::Network(serde_json::from_str(json)?),
            Self::CommercialMode => Object::CommercialMode(serde_json::from_str(json)?),
            Self::Trip => Object::Trip(serde_json::from_str(json)?),
        })
    }
}

impl FromStr for EmbeddedType {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ContainerError::UnknownType(s.to_string()))
    }
}

impl fmt::Display for EmbeddedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrowing requested from a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Place,
    PtObject,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place => f.write_str("place"),
            Self::PtObject => f.write_str("PT object"),
        }
    }
}

/// A decoded embedded object
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    StopArea(StopArea),
    Poi(Poi),
    Address(Address),
    StopPoint(StopPoint),
    Admin(Admin),
    Line(Line),
    Route(Route),
    Network(Network),
    CommercialMode(CommercialMode),
    Trip(Trip),
}

impl Object {
    #[must_use]
    pub const fn embedded_type(&self) -> EmbeddedType {
        match self {
            Self::StopArea(_) => EmbeddedType::StopArea,
            Self::Poi(_) => EmbeddedType::Poi,
            Self::Address(_) => EmbeddedType::Address,
            Self::StopPoint(_) => EmbeddedType::StopPoint,
            Self::Admin(_) => EmbeddedType::Admin,
            Self::Line(_) => EmbeddedType::Line,
            Self::Route(_) => EmbeddedType::Route,
            Self::Network(_) => EmbeddedType::Network,
            Self::CommercialMode(_) => EmbeddedType::CommercialMode,
            Self::Trip(_) => EmbeddedType::Trip,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::StopArea(o) => &o.id,
            Self::Poi(o) => &o.id,
            Self::Address(o) => &o.id,
            Self::StopPoint(o) => &o.id,
            Self::Admin(o) => &o.id,
            Self::Line(o) => &o.id,
            Self::Route(o) => &o.id,
            Self::Network(o) => &o.id,
            Self::CommercialMode(o) => &o.id,
            Self::Trip(o) => &o.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::StopArea(o) => &o.name,
            Self::Poi(o) => &o.name,
            Self::Address(o) => &o.name,
            Self::StopPoint(o) => &o.name,
            Self::Admin(o) => &o.name,
            Self::Line(o) => &o.name,
            Self::Route(o) => &o.name,
            Self::Network(o) => &o.name,
            Self::CommercialMode(o) => &o.name,
            Self::Trip(o) => &o.name,
        }
    }

    /// Narrow to a place, `None` if this type is not place-like
    #[must_use]
    pub fn into_place(self) -> Option<Place> {
        match self {
            Self::StopArea(o) => Some(Place::StopArea(o)),
            Self::Poi(o) => Some(Place::Poi(o)),
            Self::Address(o) => Some(Place::Address(o)),
            Self::StopPoint(o) => Some(Place::StopPoint(o)),
            Self::Admin(o) => Some(Place::Admin(o)),
            _ => None,
        }
    }

    /// Narrow to a PT object, `None` if this type is not a transit object
    #[must_use]
    pub fn into_pt_object(self) -> Option<PtObject> {
        match self {
            Self::StopArea(o) => Some(PtObject::StopArea(o)),
            Self::StopPoint(o) => Some(PtObject::StopPoint(o)),
            Self::Line(o) => Some(PtObject::Line(o)),
            Self::Route(o) => Some(PtObject::Route(o)),
            Self::Network(o) => Some(PtObject::Network(o)),
            Self::CommercialMode(o) => Some(PtObject::CommercialMode(o)),
            Self::Trip(o) => Some(PtObject::Trip(o)),
            _ => None,
        }
    }
}

/// An object that has a location
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    StopArea(StopArea),
    Poi(Poi),
    Address(Address),
    StopPoint(StopPoint),
    Admin(Admin),
}

impl Place {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::StopArea(o) => &o.id,
            Self::Poi(o) => &o.id,
            Self::Address(o) => &o.id,
            Self::StopPoint(o) => &o.id,
            Self::Admin(o) => &o.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::StopArea(o) => &o.name,
            Self::Poi(o) => &o.name,
            Self::Address(o) => &o.name,
            Self::StopPoint(o) => &o.name,
            Self::Admin(o) => &o.name,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> Coordinates {
        match self {
            Self::StopArea(o) => o.coord,
            Self::Poi(o) => o.coord,
            Self::Address(o) => o.coord,
            Self::StopPoint(o) => o.coord,
            Self::Admin(o) => o.coord,
        }
    }
}

/// A public transport object
#[derive(Debug, Clone, PartialEq)]
pub enum PtObject {
    StopArea(StopArea),
    StopPoint(StopPoint),
    Line(Line),
    Route(Route),
    Network(Network),
    CommercialMode(CommercialMode),
    Trip(Trip),
}

impl PtObject {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::StopArea(o) => &o.id,
            Self::StopPoint(o) => &o.id,
            Self::Line(o) => &o.id,
            Self::Route(o) => &o.id,
            Self::Network(o) => &o.id,
            Self::CommercialMode(o) => &o.id,
            Self::Trip(o) => &o.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::StopArea(o) => &o.name,
            Self::StopPoint(o) => &o.name,
            Self::Line(o) => &o.name,
            Self::Route(o) => &o.name,
            Self::Network(o) => &o.name,
            Self::CommercialMode(o) => &o.name,
            Self::Trip(o) => &o.name,
        }
    }
}

/// Errors raised while decoding or materializing a container
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The container is not a JSON object
    #[error("container is not a JSON object: {0}")]
    Syntax(#[source] serde_json::Error),

    /// A common field holds a value of the wrong shape
    #[error("invalid value for container field {key:?} ({raw}): {source}")]
    Field {
        key: &'static str,
        /// Raw JSON text of the offending value
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// The discriminator is not one of the known types
    #[error("unknown embedded type {0:?}")]
    UnknownType(String),

    /// The payload does not decode as its declared type
    #[error("failed to decode {embedded_type} payload of container {id:?}: {source}")]
    Payload {
        id: String,
        embedded_type: EmbeddedType,
        #[source]
        source: serde_json::Error,
    },

    /// The discriminator does not support the requested narrowing
    #[error("container {id:?} holds a {embedded_type}, which is not a {expected}")]
    TypeMismatch {
        id: String,
        embedded_type: EmbeddedType,
        expected: Capability,
    },

    /// Structural validation failed
    #[error(transparent)]
    Invalid(#[from] InvalidContainer),
}

/// Every structural problem found by [`Container::check`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidContainer {
    pub id: String,
    pub embedded_type: String,
    /// Non-empty container without a discriminator
    pub no_embedded_type: bool,
    /// Non-empty container without an id
    pub no_id: bool,
    /// Discriminator outside the known set
    pub unknown_embedded_type: bool,
}

impl InvalidContainer {
    const fn any(&self) -> bool {
        self.no_embedded_type || self.no_id || self.unknown_embedded_type
    }
}

impl fmt::Display for InvalidContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reasons = Vec::new();
        if self.no_embedded_type {
            reasons.push("no embedded type".to_string());
        }
        if self.no_id {
            reasons.push("no id".to_string());
        }
        if self.unknown_embedded_type {
            reasons.push(format!("unknown embedded type {:?}", self.embedded_type));
        }
        write!(f, "invalid container {:?}: {}", self.id, reasons.join(", "))
    }
}

impl std::error::Error for InvalidContainer {}

/// Envelope around an embedded place or PT object
#[derive(Debug, Default)]
pub struct Container {
    id: String,
    name: String,
    embedded_type: String,
    quality: u32,
    payload: Option<Box<RawValue>>,
    cache: RwLock<Option<Arc<Object>>>,
}

impl Container {
    /// Decode the envelope from JSON without decoding its payload
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ContainerError> {
        let fields: HashMap<String, Box<RawValue>> =
            serde_json::from_slice(bytes).map_err(ContainerError::Syntax)?;
        Self::from_fields(fields)
    }

    fn from_fields(mut fields: HashMap<String, Box<RawValue>>) -> Result<Self, ContainerError> {
        let id: String = field(&fields, "id")?.unwrap_or_default();
        let name: String = field(&fields, "name")?.unwrap_or_default();
        let embedded_type: String = field(&fields, "embedded_type")?.unwrap_or_default();
        let quality: u32 = field(&fields, "quality")?.unwrap_or_default();

        // The API leaves out empty payloads, so a missing or null key is not an error.
        let payload = if embedded_type.is_empty() {
            None
        } else {
            fields
                .remove(&embedded_type)
                .filter(|raw| raw.get().trim() != "null")
        };

        Ok(Self {
            id,
            name,
            embedded_type,
            quality,
            payload,
            cache: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw discriminator, possibly empty or unknown
    #[must_use]
    pub fn embedded_type(&self) -> &str {
        &self.embedded_type
    }

    /// Relevance score for search results, zero when absent
    #[must_use]
    pub const fn quality(&self) -> u32 {
        self.quality
    }

    /// Undecoded payload JSON
    #[must_use]
    pub fn raw_payload(&self) -> Option<&str> {
        self.payload.as_deref().map(RawValue::get)
    }

    /// Parsed discriminator, `None` when the container carries none
    pub fn kind(&self) -> Result<Option<EmbeddedType>, ContainerError> {
        if self.embedded_type.is_empty() {
            return Ok(None);
        }
        self.embedded_type.parse().map(Some)
    }

    /// Whether every field is zero and nothing was decoded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.name.is_empty()
            && self.embedded_type.is_empty()
            && self.quality == 0
            && self.payload.is_none()
            && self.cache.read().is_none()
    }

    /// Validate the envelope itself, reporting every problem at once
    pub fn check(&self) -> Result<(), ContainerError> {
        if self.is_empty() {
            return Ok(());
        }

        let invalid = InvalidContainer {
            id: self.id.clone(),
            embedded_type: self.embedded_type.clone(),
            no_embedded_type: self.embedded_type.is_empty(),
            no_id: self.id.is_empty(),
            unknown_embedded_type: !self.embedded_type.is_empty()
                && self.embedded_type.parse::<EmbeddedType>().is_err(),
        };

        if invalid.any() {
            return Err(invalid.into());
        }
        Ok(())
    }

    /// Decoded payload, materialized on first use
    ///
    /// Returns `Ok(None)` when there is no discriminator or no payload.
    /// Concurrent first calls may each decode, but only the first result is
    /// kept and every caller gets that one.
    pub fn object(&self) -> Result<Option<Arc<Object>>, ContainerError> {
        let Some(kind) = self.kind()? else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.read().as_ref() {
            return Ok(Some(Arc::clone(cached)));
        }

        let Some(raw) = self.payload.as_deref() else {
            return Ok(None);
        };

        let decoded = kind.decode(raw).map_err(|source| ContainerError::Payload {
            id: self.id.clone(),
            embedded_type: kind,
            source,
        })?;
        trace!(id = %self.id, embedded_type = %kind, "Materialized container");

        let mut slot = self.cache.write();
        let object = slot.get_or_insert_with(|| Arc::new(decoded));
        Ok(Some(Arc::clone(object)))
    }

    /// Decoded payload as a place
    pub fn place(&self) -> Result<Option<Place>, ContainerError> {
        self.narrow(Capability::Place)?;
        Ok(self
            .object()?
            .and_then(|object| Object::clone(&object).into_place()))
    }

    /// Decoded payload as a PT object
    pub fn pt_object(&self) -> Result<Option<PtObject>, ContainerError> {
        self.narrow(Capability::PtObject)?;
        Ok(self
            .object()?
            .and_then(|object| Object::clone(&object).into_pt_object()))
    }

    fn narrow(&self, expected: Capability) -> Result<(), ContainerError> {
        let Some(kind) = self.kind()? else {
            return Ok(());
        };
        let supported = match expected {
            Capability::Place => kind.is_place(),
            Capability::PtObject => kind.is_pt_object(),
        };
        if supported {
            Ok(())
        } else {
            Err(ContainerError::TypeMismatch {
                id: self.id.clone(),
                embedded_type: kind,
                expected,
            })
        }
    }
}

fn field<T: DeserializeOwned>(
    fields: &HashMap<String, Box<RawValue>>,
    key: &'static str,
) -> Result<Option<T>, ContainerError> {
    let Some(raw) = fields.get(key) else {
        return Ok(None);
    };
    serde_json::from_str::<Option<T>>(raw.get()).map_err(|source| ContainerError::Field {
        key,
        raw: raw.get().to_string(),
        source,
    })
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            embedded_type: self.embedded_type.clone(),
            quality: self.quality,
            payload: self.payload.clone(),
            cache: RwLock::new(self.cache.read().clone()),
        }
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.embedded_type == other.embedded_type
            && self.quality == other.quality
            && self.raw_payload() == other.raw_payload()
    }
}

impl<'de> Deserialize<'de> for Container {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = HashMap::<String, Box<RawValue>>::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Container {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("embedded_type", &self.embedded_type)?;
        map.serialize_entry("quality", &self.quality)?;
        if let Some(payload) = &self.payload {
            map.serialize_entry(&self.embedded_type, payload)?;
        }
        map.end()
    }
}
