// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::{
    AircraftId, AirlineId, AirportId, CityId, EntityKind, FlightStatus, GateId, Reference,
    Timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Count,
    Toggle,
    Status,
    Timestamp,
    Reference(EntityKind),
    OptionalReference(EntityKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { key, label, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update,
}

/// Raw text of one create form or edit buffer, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<&'static str, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn push_char(&mut self, key: &'static str, ch: char) {
        self.values.entry(key).or_default().push(ch);
    }

    pub fn pop_char(&mut self, key: &'static str) {
        if let Some(value) = self.values.get_mut(key) {
            value.pop();
        }
    }
}

/// Optional foreign key in a request body. `None` leaves the key out of the
/// JSON entirely; `Some(None)` sends an explicit `null`.
pub type OptionalReference<I> = Option<Option<Reference<I>>>;

fn text(values: &FormValues, key: &str) -> String {
    values.get(key).trim().to_owned()
}

fn required_text(values: &FormValues, key: &str, message: &str) -> Result<String> {
    let value = text(values, key);
    if value.is_empty() {
        bail!("{message}");
    }
    Ok(value)
}

/// Blank or unparseable counts become zero instead of failing validation.
/// Only plain integers parse, so "12.5" and "1e3" also fall back to zero.
fn coerced_count<T: FromStr + Default>(values: &FormValues, key: &str) -> T {
    values.get(key).trim().parse().unwrap_or_default()
}

fn toggle(values: &FormValues, key: &str) -> bool {
    matches!(
        values.get(key).trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1" | "departure"
    )
}

fn reference_id(values: &FormValues, key: &str) -> Option<i64> {
    values
        .get(key)
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
}

fn required_reference<I: From<i64>>(
    values: &FormValues,
    key: &str,
    message: &str,
) -> Result<Reference<I>> {
    match reference_id(values, key) {
        Some(id) => Ok(Reference::new(I::from(id))),
        None => bail!("{message}"),
    }
}

fn optional_reference<I: From<i64>>(
    values: &FormValues,
    key: &str,
    mode: SubmitMode,
) -> OptionalReference<I> {
    match (reference_id(values, key), mode) {
        (Some(id), _) => Some(Some(Reference::new(I::from(id)))),
        (None, SubmitMode::Create) => None,
        (None, SubmitMode::Update) => Some(None),
    }
}

fn required_timestamp(values: &FormValues, key: &str, message: &str) -> Result<Timestamp> {
    let raw = required_text(values, key, message)?;
    Timestamp::parse(&raw)
}

pub fn id_text(id: impl Into<i64>) -> String {
    id.into().to_string()
}

pub fn optional_id_text<I: Into<i64>>(reference: Option<Reference<I>>) -> String {
    reference
        .map(|reference| id_text(reference.id))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRequest {
    pub name: String,
    pub state: String,
    pub population: u64,
}

impl CityRequest {
    pub fn from_form(values: &FormValues, _mode: SubmitMode) -> Result<Self> {
        Ok(Self {
            name: required_text(values, "name", "city name is required -- enter a name and retry")?,
            state: required_text(
                values,
                "state",
                "city state is required -- enter a state or province and retry",
            )?,
            population: coerced_count(values, "population"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportRequest {
    pub name: String,
    pub code: String,
    pub city: Reference<CityId>,
}

impl AirportRequest {
    pub fn from_form(values: &FormValues, _mode: SubmitMode) -> Result<Self> {
        Ok(Self {
            name: required_text(
                values,
                "name",
                "airport name is required -- enter a name and retry",
            )?,
            code: required_text(
                values,
                "code",
                "airport code is required -- enter a code and retry",
            )?,
            city: required_reference(
                values,
                "cityId",
                "airport city is required -- choose a city and retry",
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineRequest {
    pub name: String,
    pub code: String,
}

impl AirlineRequest {
    pub fn from_form(values: &FormValues, _mode: SubmitMode) -> Result<Self> {
        let name = required_text(
            values,
            "name",
            "airline name is required -- enter a name and retry",
        )?;
        let code = required_text(
            values,
            "code",
            "airline code is required -- enter a code and retry",
        )?;
        Ok(Self {
            name,
            code: code.to_uppercase(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftRequest {
    #[serde(rename = "type")]
    pub aircraft_type: String,
    pub number_of_passengers: u32,
}

impl AircraftRequest {
    pub fn from_form(values: &FormValues, _mode: SubmitMode) -> Result<Self> {
        Ok(Self {
            aircraft_type: required_text(
                values,
                "type",
                "aircraft type is required -- enter a type and retry",
            )?,
            number_of_passengers: coerced_count(values, "numberOfPassengers"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRequest {
    pub gate_number: String,
    pub terminal: String,
    pub departure_gate: bool,
    pub airport: Reference<AirportId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft: OptionalReference<AircraftId>,
}

impl GateRequest {
    pub fn from_form(values: &FormValues, mode: SubmitMode) -> Result<Self> {
        Ok(Self {
            gate_number: required_text(
                values,
                "gateNumber",
                "gate number is required -- enter a gate number and retry",
            )?,
            terminal: required_text(
                values,
                "terminal",
                "gate terminal is required -- enter a terminal and retry",
            )?,
            departure_gate: toggle(values, "departureGate"),
            airport: required_reference(
                values,
                "airportId",
                "gate airport is required -- choose an airport and retry",
            )?,
            aircraft: optional_reference(values, "aircraftId", mode),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub city: Reference<CityId>,
}

impl PassengerRequest {
    pub fn from_form(values: &FormValues, _mode: SubmitMode) -> Result<Self> {
        Ok(Self {
            first_name: required_text(
                values,
                "firstName",
                "passenger first name is required -- enter a first name and retry",
            )?,
            last_name: required_text(
                values,
                "lastName",
                "passenger last name is required -- enter a last name and retry",
            )?,
            phone_number: required_text(
                values,
                "phoneNumber",
                "passenger phone number is required -- enter a phone number and retry",
            )?,
            city: required_reference(
                values,
                "cityId",
                "passenger city is required -- choose a city and retry",
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRequest {
    pub flight_number: String,
    pub airline: Reference<AirlineId>,
    pub aircraft: Reference<AircraftId>,
    pub departure_airport: Reference<AirportId>,
    pub arrival_airport: Reference<AirportId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_gate: OptionalReference<GateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_gate: OptionalReference<GateId>,
    pub scheduled_departure: Timestamp,
    pub scheduled_arrival: Timestamp,
    pub status: FlightStatus,
}

impl FlightRequest {
    pub fn from_form(values: &FormValues, mode: SubmitMode) -> Result<Self> {
        let flight_number = required_text(
            values,
            "flightNumber",
            "flight number is required -- enter a flight number and retry",
        )?;
        let airline = required_reference(
            values,
            "airlineId",
            "flight airline is required -- choose an airline and retry",
        )?;
        let aircraft = required_reference(
            values,
            "aircraftId",
            "flight aircraft is required -- choose an aircraft and retry",
        )?;
        let departure_airport = required_reference(
            values,
            "departureAirportId",
            "flight departure airport is required -- choose an airport and retry",
        )?;
        let arrival_airport = required_reference(
            values,
            "arrivalAirportId",
            "flight arrival airport is required -- choose an airport and retry",
        )?;
        let scheduled_departure = required_timestamp(
            values,
            "scheduledDeparture",
            "flight scheduled departure is required -- enter YYYY-MM-DDTHH:MM and retry",
        )?;
        let scheduled_arrival = required_timestamp(
            values,
            "scheduledArrival",
            "flight scheduled arrival is required -- enter YYYY-MM-DDTHH:MM and retry",
        )?;

        Ok(Self {
            flight_number,
            airline,
            aircraft,
            departure_airport,
            arrival_airport,
            departure_gate: optional_reference(values, "departureGateId", mode),
            arrival_gate: optional_reference(values, "arrivalGateId", mode),
            scheduled_departure,
            scheduled_arrival,
            status: FlightStatus::parse(values.get("status")).unwrap_or_default(),
        })
    }
}
