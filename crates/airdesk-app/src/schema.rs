// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::forms::{
    AircraftRequest, AirlineRequest, AirportRequest, CityRequest, FieldKind, FieldSpec,
    FlightRequest, FormValues, GateRequest, PassengerRequest, SubmitMode, optional_id_text,
};
use crate::{
    Aircraft, AircraftId, Airline, AirlineFilter, AirlineId, Airport, AirportId, City, CityId,
    EntityKind, Flight, FlightFilter, FlightId, FlightStatus, Gate, GateFilter, GateId, NoFilter,
    Passenger, PassengerId, ReferenceIndex, Timestamp, NO_REFERENCE,
};

/// Per-entity descriptor driving the generic table controller.
pub trait Entity: Clone + fmt::Debug + DeserializeOwned + Send + 'static {
    type Id: Copy + Eq + fmt::Debug + fmt::Display + From<i64> + Into<i64> + Send + Sync;
    type Request: Serialize + fmt::Debug + Sync;
    type Filter: Clone + fmt::Debug + Sync;

    const KIND: EntityKind;
    const COLUMNS: &'static [&'static str];
    const FIELDS: &'static [FieldSpec];
    /// Collections fetched alongside every load to resolve reference labels.
    const REFERENCES: &'static [EntityKind];
    /// Target of the nested relation assignment path, if any.
    const RELATION: Option<EntityKind> = None;

    fn id(&self) -> Self::Id;
    fn label(&self) -> String;
    fn cells(&self, references: &ReferenceIndex) -> Vec<String>;
    fn blank_form() -> FormValues;
    fn form_values(&self) -> FormValues;
    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<Self::Request>;
    fn parse_filter(input: &str) -> Result<Option<Self::Filter>>;

    /// One-line totals over the loaded rows, shown beside the table title.
    fn summary(_rows: &[Self]) -> Option<String> {
        None
    }
}

/// Digits grouped by thousands, e.g. `1,234,567`.
fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

impl Entity for City {
    type Id = CityId;
    type Request = CityRequest;
    type Filter = NoFilter;

    const KIND: EntityKind = EntityKind::City;
    const COLUMNS: &'static [&'static str] = &["id", "name", "state", "population"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("name", "name", FieldKind::Text),
        FieldSpec::new("state", "state", FieldKind::Text),
        FieldSpec::new("population", "population", FieldKind::Count),
    ];
    const REFERENCES: &'static [EntityKind] = &[];

    fn id(&self) -> CityId {
        self.id
    }

    fn label(&self) -> String {
        if self.state.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.state)
        }
    }

    fn cells(&self, _references: &ReferenceIndex) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.state.clone(),
            self.population.to_string(),
        ]
    }

    fn blank_form() -> FormValues {
        FormValues::new()
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", self.name.clone())
            .with("state", self.state.clone())
            .with("population", self.population.to_string())
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<CityRequest> {
        CityRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<NoFilter>> {
        NoFilter::parse(input, Self::KIND.label())
    }

    fn summary(rows: &[Self]) -> Option<String> {
        let population = rows
            .iter()
            .fold(0u64, |total, city| total.saturating_add(city.population));
        Some(format!(
            "Total cities: {} · Total population: {}",
            rows.len(),
            grouped(population)
        ))
    }
}

impl Entity for Airport {
    type Id = AirportId;
    type Request = AirportRequest;
    type Filter = NoFilter;

    const KIND: EntityKind = EntityKind::Airport;
    const COLUMNS: &'static [&'static str] = &["id", "name", "code", "city"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("name", "name", FieldKind::Text),
        FieldSpec::new("code", "code", FieldKind::Text),
        FieldSpec::new("cityId", "city", FieldKind::Reference(EntityKind::City)),
    ];
    const REFERENCES: &'static [EntityKind] = &[EntityKind::City];

    fn id(&self) -> AirportId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }

    fn cells(&self, references: &ReferenceIndex) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.code.clone(),
            references.display(EntityKind::City, self.city),
        ]
    }

    fn blank_form() -> FormValues {
        FormValues::new()
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", self.name.clone())
            .with("code", self.code.clone())
            .with("cityId", optional_id_text(self.city))
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<AirportRequest> {
        AirportRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<NoFilter>> {
        NoFilter::parse(input, Self::KIND.label())
    }
}

impl Entity for Airline {
    type Id = AirlineId;
    type Request = AirlineRequest;
    type Filter = AirlineFilter;

    const KIND: EntityKind = EntityKind::Airline;
    const COLUMNS: &'static [&'static str] = &["id", "name", "code"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("name", "name", FieldKind::Text),
        FieldSpec::new("code", "code", FieldKind::Text),
    ];
    const REFERENCES: &'static [EntityKind] = &[];

    fn id(&self) -> AirlineId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }

    fn cells(&self, _references: &ReferenceIndex) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.code.clone()]
    }

    fn blank_form() -> FormValues {
        FormValues::new()
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", self.name.clone())
            .with("code", self.code.clone())
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<AirlineRequest> {
        AirlineRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<AirlineFilter>> {
        AirlineFilter::parse(input)
    }
}

impl Entity for Aircraft {
    type Id = AircraftId;
    type Request = AircraftRequest;
    type Filter = NoFilter;

    const KIND: EntityKind = EntityKind::Aircraft;
    const COLUMNS: &'static [&'static str] = &["id", "type", "seats", "airports"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("type", "type", FieldKind::Text),
        FieldSpec::new("numberOfPassengers", "seats", FieldKind::Count),
    ];
    const REFERENCES: &'static [EntityKind] = &[EntityKind::Airport];
    const RELATION: Option<EntityKind> = Some(EntityKind::Airport);

    fn id(&self) -> AircraftId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} (#{})", self.aircraft_type, self.id)
    }

    fn cells(&self, references: &ReferenceIndex) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.aircraft_type.clone(),
            self.number_of_passengers.to_string(),
            references.display_many(EntityKind::Airport, &self.airports),
        ]
    }

    fn blank_form() -> FormValues {
        FormValues::new()
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("type", self.aircraft_type.clone())
            .with("numberOfPassengers", self.number_of_passengers.to_string())
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<AircraftRequest> {
        AircraftRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<NoFilter>> {
        NoFilter::parse(input, Self::KIND.label())
    }
}

impl Entity for Gate {
    type Id = GateId;
    type Request = GateRequest;
    type Filter = GateFilter;

    const KIND: EntityKind = EntityKind::Gate;
    const COLUMNS: &'static [&'static str] =
        &["id", "gate", "terminal", "type", "airport", "aircraft"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("gateNumber", "gate number", FieldKind::Text),
        FieldSpec::new("terminal", "terminal", FieldKind::Text),
        FieldSpec::new("departureGate", "departure gate", FieldKind::Toggle),
        FieldSpec::new(
            "airportId",
            "airport",
            FieldKind::Reference(EntityKind::Airport),
        ),
        FieldSpec::new(
            "aircraftId",
            "aircraft",
            FieldKind::OptionalReference(EntityKind::Aircraft),
        ),
    ];
    const REFERENCES: &'static [EntityKind] = &[EntityKind::Airport, EntityKind::Aircraft];

    fn id(&self) -> GateId {
        self.id
    }

    fn label(&self) -> String {
        if self.terminal.is_empty() {
            self.gate_number.clone()
        } else {
            format!("{} ({})", self.gate_number, self.terminal)
        }
    }

    fn cells(&self, references: &ReferenceIndex) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.gate_number.clone(),
            self.terminal.clone(),
            if self.departure_gate {
                "departure"
            } else {
                "arrival"
            }
            .to_owned(),
            references.display(EntityKind::Airport, self.airport),
            references.display(EntityKind::Aircraft, self.aircraft),
        ]
    }

    fn blank_form() -> FormValues {
        FormValues::new().with("departureGate", "true")
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("gateNumber", self.gate_number.clone())
            .with("terminal", self.terminal.clone())
            .with("departureGate", self.departure_gate.to_string())
            .with("airportId", optional_id_text(self.airport))
            .with("aircraftId", optional_id_text(self.aircraft))
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<GateRequest> {
        GateRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<GateFilter>> {
        GateFilter::parse(input)
    }
}

impl Entity for Passenger {
    type Id = PassengerId;
    type Request = PassengerRequest;
    type Filter = NoFilter;

    const KIND: EntityKind = EntityKind::Passenger;
    const COLUMNS: &'static [&'static str] =
        &["id", "first name", "last name", "phone", "city", "aircraft"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("firstName", "first name", FieldKind::Text),
        FieldSpec::new("lastName", "last name", FieldKind::Text),
        FieldSpec::new("phoneNumber", "phone", FieldKind::Text),
        FieldSpec::new("cityId", "city", FieldKind::Reference(EntityKind::City)),
    ];
    const REFERENCES: &'static [EntityKind] = &[EntityKind::City];

    fn id(&self) -> PassengerId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn cells(&self, references: &ReferenceIndex) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.phone_number.clone(),
            references.display(EntityKind::City, self.city),
            self.aircraft.len().to_string(),
        ]
    }

    fn blank_form() -> FormValues {
        FormValues::new()
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("firstName", self.first_name.clone())
            .with("lastName", self.last_name.clone())
            .with("phoneNumber", self.phone_number.clone())
            .with("cityId", optional_id_text(self.city))
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<PassengerRequest> {
        PassengerRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<NoFilter>> {
        NoFilter::parse(input, Self::KIND.label())
    }
}

impl Entity for Flight {
    type Id = FlightId;
    type Request = FlightRequest;
    type Filter = FlightFilter;

    const KIND: EntityKind = EntityKind::Flight;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "flight",
        "airline",
        "aircraft",
        "from",
        "to",
        "dep gate",
        "arr gate",
        "departs",
        "arrives",
        "status",
    ];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("flightNumber", "flight number", FieldKind::Text),
        FieldSpec::new(
            "airlineId",
            "airline",
            FieldKind::Reference(EntityKind::Airline),
        ),
        FieldSpec::new(
            "aircraftId",
            "aircraft",
            FieldKind::Reference(EntityKind::Aircraft),
        ),
        FieldSpec::new(
            "departureAirportId",
            "departure airport",
            FieldKind::Reference(EntityKind::Airport),
        ),
        FieldSpec::new(
            "arrivalAirportId",
            "arrival airport",
            FieldKind::Reference(EntityKind::Airport),
        ),
        FieldSpec::new(
            "departureGateId",
            "departure gate",
            FieldKind::OptionalReference(EntityKind::Gate),
        ),
        FieldSpec::new(
            "arrivalGateId",
            "arrival gate",
            FieldKind::OptionalReference(EntityKind::Gate),
        ),
        FieldSpec::new(
            "scheduledDeparture",
            "scheduled departure",
            FieldKind::Timestamp,
        ),
        FieldSpec::new("scheduledArrival", "scheduled arrival", FieldKind::Timestamp),
        FieldSpec::new("status", "status", FieldKind::Status),
    ];
    const REFERENCES: &'static [EntityKind] = &[
        EntityKind::Airline,
        EntityKind::Aircraft,
        EntityKind::Airport,
        EntityKind::Gate,
    ];

    fn id(&self) -> FlightId {
        self.id
    }

    fn label(&self) -> String {
        self.flight_number.clone()
    }

    fn cells(&self, references: &ReferenceIndex) -> Vec<String> {
        let when = |value: Option<Timestamp>| {
            value
                .map(|value| value.to_string())
                .unwrap_or_else(|| NO_REFERENCE.to_owned())
        };
        vec![
            self.id.to_string(),
            self.flight_number.clone(),
            references.display(EntityKind::Airline, self.airline),
            references.display(EntityKind::Aircraft, self.aircraft),
            references.display(EntityKind::Airport, self.departure_airport),
            references.display(EntityKind::Airport, self.arrival_airport),
            references.display(EntityKind::Gate, self.departure_gate),
            references.display(EntityKind::Gate, self.arrival_gate),
            when(self.scheduled_departure),
            when(self.scheduled_arrival),
            self.status.as_str().to_owned(),
        ]
    }

    fn blank_form() -> FormValues {
        FormValues::new().with("status", FlightStatus::Scheduled.as_str())
    }

    fn form_values(&self) -> FormValues {
        let when = |value: Option<Timestamp>| {
            value.map(|value| value.to_string()).unwrap_or_default()
        };
        FormValues::new()
            .with("flightNumber", self.flight_number.clone())
            .with("airlineId", optional_id_text(self.airline))
            .with("aircraftId", optional_id_text(self.aircraft))
            .with("departureAirportId", optional_id_text(self.departure_airport))
            .with("arrivalAirportId", optional_id_text(self.arrival_airport))
            .with("departureGateId", optional_id_text(self.departure_gate))
            .with("arrivalGateId", optional_id_text(self.arrival_gate))
            .with("scheduledDeparture", when(self.scheduled_departure))
            .with("scheduledArrival", when(self.scheduled_arrival))
            .with("status", self.status.as_str())
    }

    fn build_request(values: &FormValues, mode: SubmitMode) -> Result<FlightRequest> {
        FlightRequest::from_form(values, mode)
    }

    fn parse_filter(input: &str) -> Result<Option<FlightFilter>> {
        FlightFilter::parse(input)
    }

    fn summary(rows: &[Self]) -> Option<String> {
        Some(format!("Total flights: {}", rows.len()))
    }
}

/// Id/label pairs for a fetched collection, as stored in a reference index.
pub fn labels_of<E: Entity>(rows: &[E]) -> Vec<(i64, String)> {
    rows.iter()
        .map(|row| (row.id().into(), row.label()))
        .collect()
}
