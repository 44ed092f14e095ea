// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airdesk_app::{
    Aircraft, Airline, AirlineFilter, Airport, AirportId, City, Entity, Flight, FlightFilter,
    Gate, GateFilter, Passenger,
};
use anyhow::{Result, bail};

use crate::Client;

/// Entity-specific lookup paths behind each screen's filter, plus the
/// nested relation path where one exists.
pub trait Queries: Entity {
    fn filtered(client: &Client, filter: &Self::Filter) -> Result<Vec<Self>>;

    fn assign(client: &Client, id: Self::Id, related: i64) -> Result<()> {
        let _ = (client, id, related);
        bail!("{} has no assignable relation", Self::KIND.singular());
    }
}

macro_rules! unfiltered {
    ($($entity:ty),+) => {
        $(
            impl Queries for $entity {
                fn filtered(_client: &Client, filter: &Self::Filter) -> Result<Vec<Self>> {
                    match *filter {}
                }
            }
        )+
    };
}

unfiltered!(City, Airport, Passenger);

impl Queries for Aircraft {
    fn filtered(_client: &Client, filter: &Self::Filter) -> Result<Vec<Self>> {
        match *filter {}
    }

    fn assign(client: &Client, id: Self::Id, related: i64) -> Result<()> {
        client.assign_airport(id, AirportId::new(related))
    }
}

impl Queries for Airline {
    fn filtered(client: &Client, filter: &AirlineFilter) -> Result<Vec<Self>> {
        match filter {
            AirlineFilter::Code(code) => Ok(client.airline_by_code(code)?.into_iter().collect()),
        }
    }
}

impl Queries for Gate {
    fn filtered(client: &Client, filter: &GateFilter) -> Result<Vec<Self>> {
        match *filter {
            GateFilter::Airport(airport) => client.gates_by_airport(airport),
            GateFilter::AirportAndType { airport, departure } => {
                client.gates_by_airport_and_type(airport, departure)
            }
        }
    }
}

impl Queries for Flight {
    fn filtered(client: &Client, filter: &FlightFilter) -> Result<Vec<Self>> {
        match filter {
            FlightFilter::Number(number) => {
                Ok(client.flight_by_number(number)?.into_iter().collect())
            }
            FlightFilter::Between { start, end } => client.flights_between(*start, *end),
        }
    }
}
