// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::ids::*;

const MINUTE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Flight,
    City,
    Aircraft,
    Airline,
    Airport,
    Passenger,
    Gate,
}

impl EntityKind {
    pub const ALL: [Self; 7] = [
        Self::Flight,
        Self::City,
        Self::Aircraft,
        Self::Airline,
        Self::Airport,
        Self::Passenger,
        Self::Gate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Flight => "flights",
            Self::City => "cities",
            Self::Aircraft => "aircraft",
            Self::Airline => "airlines",
            Self::Airport => "airports",
            Self::Passenger => "passengers",
            Self::Gate => "gates",
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::City => "city",
            Self::Aircraft => "aircraft",
            Self::Airline => "airline",
            Self::Airport => "airport",
            Self::Passenger => "passenger",
            Self::Gate => "gate",
        }
    }

    /// Server collection path. The prefixes differ per resource and are part
    /// of the backend contract.
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Flight => "/api/flights",
            Self::City => "/city",
            Self::Aircraft => "/api/aircraft",
            Self::Airline => "/api/airlines",
            Self::Airport => "/airport",
            Self::Passenger => "/passenger",
            Self::Gate => "/api/gates",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == value || kind.singular() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Boarding,
    Departed,
    Arrived,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    pub const ALL: [Self; 6] = [
        Self::Scheduled,
        Self::Boarding,
        Self::Departed,
        Self::Arrived,
        Self::Delayed,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Boarding => "BOARDING",
            Self::Departed => "DEPARTED",
            Self::Arrived => "ARRIVED",
            Self::Delayed => "DELAYED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// Wall-clock schedule time kept at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(PrimitiveDateTime);

impl Timestamp {
    pub const fn new(value: PrimitiveDateTime) -> Self {
        Self(value)
    }

    pub const fn get(self) -> PrimitiveDateTime {
        self.0
    }

    /// Accepts `YYYY-MM-DDTHH:MM` and anything longer in the same shape
    /// (seconds and fractions are dropped). A space may stand in for `T`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let head = trimmed
            .get(..16)
            .ok_or_else(|| anyhow!("timestamp {trimmed:?} must look like YYYY-MM-DDTHH:MM"))?;
        let tail = &trimmed[16..];
        if !tail.is_empty() && !tail.starts_with(':') {
            return Err(anyhow!(
                "timestamp {trimmed:?} must look like YYYY-MM-DDTHH:MM"
            ));
        }
        let normalized = head.replacen(' ', "T", 1);
        let parsed = PrimitiveDateTime::parse(&normalized, MINUTE_FORMAT)
            .map_err(|error| anyhow!("timestamp {trimmed:?} is not a valid date/time: {error}"))?;
        Ok(Self(parsed))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(MINUTE_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Foreign key in transit: `{"id": n}`. Responses may carry the full nested
/// object; everything but the id is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference<I> {
    pub id: I,
}

impl<I> Reference<I> {
    pub const fn new(id: I) -> Self {
        Self { id }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub population: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub id: AirportId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,
    #[serde(default)]
    pub city: Option<Reference<CityId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    pub id: AirlineId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aircraft {
    pub id: AircraftId,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub aircraft_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub number_of_passengers: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub airports: Vec<Reference<AirportId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    pub id: GateId,
    #[serde(default, deserialize_with = "nullable")]
    pub gate_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub terminal: String,
    #[serde(default, deserialize_with = "nullable")]
    pub departure_gate: bool,
    #[serde(default)]
    pub airport: Option<Reference<AirportId>>,
    #[serde(default)]
    pub aircraft: Option<Reference<AircraftId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: PassengerId,
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_number: String,
    #[serde(default)]
    pub city: Option<Reference<CityId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub aircraft: Vec<Reference<AircraftId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: FlightId,
    #[serde(default, deserialize_with = "nullable")]
    pub flight_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: FlightStatus,
    #[serde(default)]
    pub scheduled_departure: Option<Timestamp>,
    #[serde(default)]
    pub scheduled_arrival: Option<Timestamp>,
    #[serde(default)]
    pub airline: Option<Reference<AirlineId>>,
    #[serde(default)]
    pub aircraft: Option<Reference<AircraftId>>,
    #[serde(default)]
    pub departure_airport: Option<Reference<AirportId>>,
    #[serde(default)]
    pub arrival_airport: Option<Reference<AirportId>>,
    #[serde(default)]
    pub departure_gate: Option<Reference<GateId>>,
    #[serde(default)]
    pub arrival_gate: Option<Reference<GateId>>,
}
