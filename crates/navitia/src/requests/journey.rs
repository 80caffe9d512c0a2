//! `/journeys` request

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::{DataFreshness, PlaceRef, StreetMode, positive};
use crate::datetime;
use crate::error::RenderError;
use crate::query::{QueryParams, Request};

/// Whether `date_time` is a departure or an arrival time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DateTimeRepresents {
    #[default]
    Departure,
    Arrival,
}

impl DateTimeRepresents {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Arrival => "arrival",
        }
    }
}

/// Traveller profile tuning walking speed and transfer tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelerType {
    Standard,
    SlowWalker,
    FastWalker,
    Luggage,
    Wheelchair,
}

impl TravelerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::SlowWalker => "slow_walker",
            Self::FastWalker => "fast_walker",
            Self::Luggage => "luggage",
            Self::Wheelchair => "wheelchair",
        }
    }
}

impl fmt::Display for TravelerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journey planning request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JourneyRequest {
    pub from: Option<PlaceRef>,
    pub to: Option<PlaceRef>,
    pub date_time: Option<NaiveDateTime>,
    pub represents: DateTimeRepresents,
    pub traveler: Option<TravelerType>,
    /// Ids the planner must avoid
    pub forbidden: Vec<String>,
    /// Ids the planner must use
    pub allowed: Vec<String>,
    pub first_section_modes: Vec<StreetMode>,
    pub last_section_modes: Vec<StreetMode>,
    pub max_duration: Option<Duration>,
    pub max_transfers: Option<u32>,
    pub min_journeys: Option<u32>,
    pub max_journeys: Option<u32>,
    pub count: Option<u32>,
    pub wheelchair: bool,
    pub freshness: Option<DataFreshness>,
}

impl JourneyRequest {
    #[must_use]
    pub fn new(from: impl Into<PlaceRef>, to: impl Into<PlaceRef>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            ..Self::default()
        }
    }

    /// Depart at the given time
    #[must_use]
    pub const fn departing_at(mut self, at: NaiveDateTime) -> Self {
        self.date_time = Some(at);
        self.represents = DateTimeRepresents::Departure;
        self
    }

    /// Arrive by the given time
    #[must_use]
    pub const fn arriving_at(mut self, at: NaiveDateTime) -> Self {
        self.date_time = Some(at);
        self.represents = DateTimeRepresents::Arrival;
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn forbidding(mut self, id: impl Into<String>) -> Self {
        self.forbidden.push(id.into());
        self
    }
}

impl Request for JourneyRequest {
    fn to_query(&self) -> Result<QueryParams, RenderError> {
        if self.from.is_none() && self.to.is_none() {
            return Err(RenderError::MissingEndpoint);
        }
        if let (Some(min), Some(max)) = (self.min_journeys, self.max_journeys) {
            if max < min {
                return Err(RenderError::InvalidParameter {
                    name: "max_nb_journeys",
                    reason: format!("{max} is below min_nb_journeys {min}"),
                });
            }
        }

        let mut q = QueryParams::new();
        if let Some(from) = &self.from {
            q.push("from", from.render("from")?);
        }
        if let Some(to) = &self.to {
            q.push("to", to.render("to")?);
        }
        if let Some(at) = &self.date_time {
            q.push("datetime", datetime::format(at));
            q.push("datetime_represents", self.represents.as_str());
        }
        q.push_opt("traveler_type", self.traveler);
        q.push_all("forbidden_uris[]", &self.forbidden);
        q.push_all("allowed_id[]", &self.allowed);
        q.push_all("first_section_mode[]", &self.first_section_modes);
        q.push_all("last_section_mode[]", &self.last_section_modes);
        q.push_opt("max_duration", self.max_duration.map(|d| d.as_secs()));
        q.push_opt("max_nb_transfers", self.max_transfers);
        q.push_opt("min_nb_journeys", positive("min_nb_journeys", self.min_journeys)?);
        q.push_opt("max_nb_journeys", positive("max_nb_journeys", self.max_journeys)?);
        q.push_opt("count", positive("count", self.count)?);
        if self.wheelchair {
            q.push("wheelchair", "true");
        }
        q.push_opt("data_freshness", self.freshness);
        Ok(q)
    }
}
