// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airdesk_app::EntityKind;
use serde_json::json;

use crate::Store;

const CITIES: [(i64, &str, &str, u64); 4] = [
    (1, "St. John's", "NL", 110_525),
    (2, "Gander", "NL", 11_880),
    (3, "Halifax", "NS", 439_819),
    (4, "Toronto", "ON", 2_794_356),
];

/// id, name, code, city
const AIRPORTS: [(i64, &str, &str, i64); 4] = [
    (1, "St. John's International", "YYT", 1),
    (2, "Gander International", "YQX", 2),
    (3, "Halifax Stanfield", "YHZ", 3),
    (4, "Toronto Pearson", "YYZ", 4),
];

const AIRLINES: [(i64, &str, &str); 3] = [
    (1, "Air Canada", "AC"),
    (2, "WestJet", "WS"),
    (3, "PAL Airlines", "PB"),
];

/// id, type, seats, airports
const AIRCRAFT: [(i64, &str, u32, &[i64]); 3] = [
    (1, "Dash 8-400", 78, &[1, 2]),
    (2, "Boeing 737-800", 174, &[1, 3, 4]),
    (3, "Airbus A320", 146, &[3, 4]),
];

/// id, gate, terminal, departure, airport, aircraft
const GATES: [(i64, &str, &str, bool, i64, Option<i64>); 6] = [
    (1, "A1", "T1", true, 1, Some(1)),
    (2, "A2", "T1", false, 1, None),
    (3, "B1", "Main", false, 2, None),
    (4, "C5", "T2", true, 3, Some(3)),
    (5, "C6", "T2", false, 3, None),
    (6, "D1", "T1", false, 4, None),
];

/// id, first, last, phone, city, aircraft
const PASSENGERS: [(i64, &str, &str, &str, i64, &[i64]); 3] = [
    (1, "Jane", "Doe", "709-555-0101", 1, &[1]),
    (2, "Sam", "Murphy", "709-555-0144", 2, &[1, 2]),
    (3, "Priya", "Patel", "902-555-0188", 3, &[]),
];

struct FlightSeed {
    id: i64,
    number: &'static str,
    airline: i64,
    aircraft: i64,
    route: (i64, i64),
    gates: (Option<i64>, Option<i64>),
    schedule: (&'static str, &'static str),
    status: &'static str,
}

const FLIGHTS: [FlightSeed; 4] = [
    FlightSeed {
        id: 1,
        number: "PB201",
        airline: 3,
        aircraft: 1,
        route: (1, 2),
        gates: (Some(1), Some(3)),
        schedule: ("2025-08-15T10:00", "2025-08-15T11:05"),
        status: "SCHEDULED",
    },
    FlightSeed {
        id: 2,
        number: "AC690",
        airline: 1,
        aircraft: 2,
        route: (1, 3),
        gates: (Some(1), Some(5)),
        schedule: ("2025-08-15T12:30", "2025-08-15T14:00"),
        status: "BOARDING",
    },
    FlightSeed {
        id: 3,
        number: "WS249",
        airline: 2,
        aircraft: 3,
        route: (3, 4),
        gates: (Some(4), Some(6)),
        schedule: ("2025-08-15T15:45", "2025-08-15T18:10"),
        status: "DELAYED",
    },
    FlightSeed {
        id: 4,
        number: "AC1234",
        airline: 1,
        aircraft: 2,
        route: (4, 1),
        gates: (None, None),
        schedule: ("2025-08-16T08:00", "2025-08-16T11:20"),
        status: "SCHEDULED",
    },
];

fn stub(id: i64) -> serde_json::Value {
    json!({ "id": id })
}

fn stubs(ids: &[i64]) -> Vec<serde_json::Value> {
    ids.iter().copied().map(stub).collect()
}

/// A small Atlantic Canada network: four cities with one airport each,
/// three airlines, their aircraft, gates, passengers, and a day of flights.
pub fn seeded_store() -> Store {
    let mut store = Store::new();

    for (id, name, state, population) in CITIES {
        store.insert(
            EntityKind::City,
            json!({ "id": id, "name": name, "state": state, "population": population }),
        );
    }
    for (id, name, code, city) in AIRPORTS {
        store.insert(
            EntityKind::Airport,
            json!({ "id": id, "name": name, "code": code, "city": stub(city) }),
        );
    }
    for (id, name, code) in AIRLINES {
        store.insert(
            EntityKind::Airline,
            json!({ "id": id, "name": name, "code": code }),
        );
    }
    for (id, aircraft_type, seats, airports) in AIRCRAFT {
        store.insert(
            EntityKind::Aircraft,
            json!({
                "id": id,
                "type": aircraft_type,
                "numberOfPassengers": seats,
                "airports": stubs(airports),
            }),
        );
    }
    for (id, gate_number, terminal, departure, airport, aircraft) in GATES {
        store.insert(
            EntityKind::Gate,
            json!({
                "id": id,
                "gateNumber": gate_number,
                "terminal": terminal,
                "departureGate": departure,
                "airport": stub(airport),
                "aircraft": aircraft.map(stub),
            }),
        );
    }
    for (id, first, last, phone, city, aircraft) in PASSENGERS {
        store.insert(
            EntityKind::Passenger,
            json!({
                "id": id,
                "firstName": first,
                "lastName": last,
                "phoneNumber": phone,
                "city": stub(city),
                "aircraft": stubs(aircraft),
            }),
        );
    }
    for flight in FLIGHTS {
        store.insert(
            EntityKind::Flight,
            json!({
                "id": flight.id,
                "flightNumber": flight.number,
                "airline": stub(flight.airline),
                "aircraft": stub(flight.aircraft),
                "departureAirport": stub(flight.route.0),
                "arrivalAirport": stub(flight.route.1),
                "departureGate": flight.gates.0.map(stub),
                "arrivalGate": flight.gates.1.map(stub),
                "scheduledDeparture": flight.schedule.0,
                "scheduledArrival": flight.schedule.1,
                "status": flight.status,
            }),
        );
    }
    store
}
