// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airdesk_app::{EntityKind, Timestamp};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    One,
    Many,
}

/// A foreign key stored on `owner` rows under `field`.
#[derive(Debug, Clone, Copy)]
struct Link {
    owner: EntityKind,
    field: &'static str,
    target: EntityKind,
    arity: Arity,
}

const fn link(owner: EntityKind, field: &'static str, target: EntityKind, arity: Arity) -> Link {
    Link {
        owner,
        field,
        target,
        arity,
    }
}

const LINKS: [Link; 12] = [
    link(EntityKind::Airport, "city", EntityKind::City, Arity::One),
    link(EntityKind::Aircraft, "airports", EntityKind::Airport, Arity::Many),
    link(EntityKind::Gate, "airport", EntityKind::Airport, Arity::One),
    link(EntityKind::Gate, "aircraft", EntityKind::Aircraft, Arity::One),
    link(EntityKind::Passenger, "city", EntityKind::City, Arity::One),
    link(EntityKind::Passenger, "aircraft", EntityKind::Aircraft, Arity::Many),
    link(EntityKind::Flight, "airline", EntityKind::Airline, Arity::One),
    link(EntityKind::Flight, "aircraft", EntityKind::Aircraft, Arity::One),
    link(EntityKind::Flight, "departureAirport", EntityKind::Airport, Arity::One),
    link(EntityKind::Flight, "arrivalAirport", EntityKind::Airport, Arity::One),
    link(EntityKind::Flight, "departureGate", EntityKind::Gate, Arity::One),
    link(EntityKind::Flight, "arrivalGate", EntityKind::Gate, Arity::One),
];

fn links_of(owner: EntityKind) -> impl Iterator<Item = Link> {
    LINKS.into_iter().filter(move |link| link.owner == owner)
}

/// Status plus optional JSON body of one mock response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    fn created(body: Value) -> Self {
        Self {
            status: 201,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        let reason = match status {
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            _ => "Error",
        };
        Self {
            status,
            body: Some(json!({
                "status": status,
                "error": reason,
                "message": message.into(),
            })),
        }
    }
}

/// In-memory collections keyed by entity, with per-collection id sequences.
///
/// Foreign keys are kept as `{"id": n}` stubs and expanded one level on the
/// way out, the way a JPA-backed server serializes its relations.
#[derive(Debug, Clone, Default)]
pub struct Store {
    collections: BTreeMap<EntityKind, Vec<Value>>,
    next_ids: BTreeMap<EntityKind, i64>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fixture row as-is. Its `id` must be set; the sequence moves
    /// past it.
    pub fn insert(&mut self, kind: EntityKind, row: Value) {
        if let Some(id) = row.get("id").and_then(Value::as_i64) {
            let next = self.next_ids.entry(kind).or_insert(1);
            *next = (*next).max(id + 1);
        }
        self.collections.entry(kind).or_default().push(row);
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.collections.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }

    /// Raw stored row, stubs unexpanded.
    pub fn row(&self, kind: EntityKind, id: i64) -> Option<&Value> {
        self.rows(kind)
            .iter()
            .find(|row| row.get("id").and_then(Value::as_i64) == Some(id))
    }

    pub fn handle(&mut self, method: &str, url: &str, body: &str) -> Reply {
        let Ok(parsed) = Url::parse(&format!("http://mock{url}")) else {
            return Reply::error(400, format!("malformed request target {url:?}"));
        };
        let segments = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let query = parsed
            .query_pairs()
            .into_owned()
            .collect::<BTreeMap<_, _>>();

        let Some((kind, rest)) = route(&segments) else {
            return Reply::error(404, format!("no collection at {}", parsed.path()));
        };
        let rest = rest.iter().map(String::as_str).collect::<Vec<_>>();

        match (method, kind, rest.as_slice()) {
            ("GET", _, []) => Reply::ok(Value::Array(
                self.rows(kind).iter().map(|row| self.expand(kind, row)).collect(),
            )),
            ("POST", _, []) => self.create(kind, body),
            ("GET", EntityKind::Airline, ["code", code]) => {
                self.find_by(kind, "code", code, &format!("airline code {code}"))
            }
            ("GET", EntityKind::Flight, ["number", number]) => self.find_by(
                kind,
                "flightNumber",
                number,
                &format!("flight number {number}"),
            ),
            ("GET", EntityKind::Flight, ["between"]) => self.flights_between(&query),
            ("GET", EntityKind::Gate, ["airport", airport]) => self.gates(airport, None),
            ("GET", EntityKind::Gate, ["airport", airport, "type"]) => {
                match query.get("isDepartureGate").map(String::as_str) {
                    Some("true") => self.gates(airport, Some(true)),
                    Some("false") => self.gates(airport, Some(false)),
                    _ => Reply::error(400, "isDepartureGate must be true or false"),
                }
            }
            ("PUT", EntityKind::Aircraft, [aircraft, "airport", airport]) => {
                self.assign_airport(aircraft, airport)
            }
            ("GET", _, [id]) => match self.lookup(kind, id) {
                Ok(index) => Reply::ok(self.expand(kind, &self.rows(kind)[index])),
                Err(reply) => reply,
            },
            ("PUT", _, [id]) => self.update(kind, id, body),
            ("DELETE", _, [id]) => self.delete(kind, id),
            _ => Reply::error(
                405,
                format!("{method} {} is not supported", parsed.path()),
            ),
        }
    }

    fn rows(&self, kind: EntityKind) -> &[Value] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn lookup(&self, kind: EntityKind, raw_id: &str) -> Result<usize, Reply> {
        let Ok(id) = raw_id.parse::<i64>() else {
            return Err(Reply::error(400, format!("{raw_id:?} is not a numeric id")));
        };
        self.rows(kind)
            .iter()
            .position(|row| row.get("id").and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| Reply::error(404, format!("{} {id} not found", kind.singular())))
    }

    fn expand(&self, kind: EntityKind, row: &Value) -> Value {
        let mut row = row.clone();
        let Some(object) = row.as_object_mut() else {
            return row;
        };
        for link in links_of(kind) {
            let Some(value) = object.get_mut(link.field) else {
                continue;
            };
            match link.arity {
                Arity::One => {
                    if let Some(target) = stub_id(value).and_then(|id| self.row(link.target, id)) {
                        *value = target.clone();
                    }
                }
                Arity::Many => {
                    for item in value.as_array_mut().into_iter().flatten() {
                        if let Some(target) = stub_id(item).and_then(|id| self.row(link.target, id))
                        {
                            *item = target.clone();
                        }
                    }
                }
            }
        }
        row
    }

    /// Parses a request body and reduces every foreign key to a checked stub.
    fn normalize(&self, kind: EntityKind, body: &str) -> Result<Map<String, Value>, Reply> {
        let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(body) else {
            return Err(Reply::error(400, "request body must be a JSON object"));
        };
        object.remove("id");

        for link in links_of(kind) {
            let Some(value) = object.get_mut(link.field) else {
                continue;
            };
            match link.arity {
                Arity::One if value.is_null() => {}
                Arity::One => *value = self.checked_stub(link, value)?,
                Arity::Many => {
                    let Some(items) = value.as_array() else {
                        return Err(Reply::error(400, format!("{} must be a list", link.field)));
                    };
                    let stubs = items
                        .iter()
                        .map(|item| self.checked_stub(link, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    *value = Value::Array(stubs);
                }
            }
        }
        if let Some(Value::String(code)) = object.get_mut("code") {
            *code = code.trim().to_uppercase();
        }
        Ok(object)
    }

    fn checked_stub(&self, link: Link, value: &Value) -> Result<Value, Reply> {
        let Some(id) = stub_id(value) else {
            return Err(Reply::error(
                400,
                format!("{} must be an {{\"id\": n}} reference", link.field),
            ));
        };
        if self.row(link.target, id).is_none() {
            return Err(Reply::error(
                400,
                format!("{} {id} does not exist", link.target.singular()),
            ));
        }
        Ok(json!({ "id": id }))
    }

    fn create(&mut self, kind: EntityKind, body: &str) -> Reply {
        let mut object = match self.normalize(kind, body) {
            Ok(object) => object,
            Err(reply) => return reply,
        };
        for link in links_of(kind).filter(|link| link.arity == Arity::Many) {
            object
                .entry(link.field)
                .or_insert_with(|| Value::Array(Vec::new()));
        }

        let next = self.next_ids.entry(kind).or_insert(1);
        let id = *next;
        *next += 1;
        object.insert("id".to_owned(), json!(id));

        let row = Value::Object(object);
        let reply = Reply::created(self.expand(kind, &row));
        self.collections.entry(kind).or_default().push(row);
        reply
    }

    fn update(&mut self, kind: EntityKind, raw_id: &str, body: &str) -> Reply {
        let index = match self.lookup(kind, raw_id) {
            Ok(index) => index,
            Err(reply) => return reply,
        };
        let changes = match self.normalize(kind, body) {
            Ok(changes) => changes,
            Err(reply) => return reply,
        };

        let Some(row) = self
            .collections
            .get_mut(&kind)
            .and_then(|rows| rows.get_mut(index))
            .and_then(Value::as_object_mut)
        else {
            return Reply::error(404, format!("{} {raw_id} not found", kind.singular()));
        };
        row.extend(changes);

        let row = self.rows(kind)[index].clone();
        Reply::ok(self.expand(kind, &row))
    }

    fn delete(&mut self, kind: EntityKind, raw_id: &str) -> Reply {
        let index = match self.lookup(kind, raw_id) {
            Ok(index) => index,
            Err(reply) => return reply,
        };
        let id = self.rows(kind)[index]
            .get("id")
            .and_then(Value::as_i64)
            .unwrap_or_default();

        if let Some((owner, owner_id)) = self.referrer(kind, id) {
            return Reply::error(
                409,
                format!(
                    "{} {id} is still referenced by {} {owner_id}",
                    kind.singular(),
                    owner.singular()
                ),
            );
        }

        if let Some(rows) = self.collections.get_mut(&kind) {
            rows.remove(index);
        }
        Reply::no_content()
    }

    fn referrer(&self, kind: EntityKind, id: i64) -> Option<(EntityKind, i64)> {
        LINKS
            .iter()
            .filter(|link| link.target == kind)
            .find_map(|link| {
                self.rows(link.owner).iter().find_map(|row| {
                    let value = row.get(link.field)?;
                    let refers = match link.arity {
                        Arity::One => stub_id(value) == Some(id),
                        Arity::Many => value
                            .as_array()
                            .is_some_and(|items| items.iter().any(|item| stub_id(item) == Some(id))),
                    };
                    if refers {
                        Some((link.owner, row.get("id").and_then(Value::as_i64)?))
                    } else {
                        None
                    }
                })
            })
    }

    fn find_by(&self, kind: EntityKind, field: &str, wanted: &str, what: &str) -> Reply {
        self.rows(kind)
            .iter()
            .find(|row| row.get(field).and_then(Value::as_str) == Some(wanted))
            .map(|row| Reply::ok(self.expand(kind, row)))
            .unwrap_or_else(|| Reply::error(404, format!("{what} not found")))
    }

    fn flights_between(&self, query: &BTreeMap<String, String>) -> Reply {
        let (Some(start), Some(end)) = (query.get("start"), query.get("end")) else {
            return Reply::error(400, "start and end are required");
        };
        let (Ok(start), Ok(end)) = (Timestamp::parse(start), Timestamp::parse(end)) else {
            return Reply::error(400, "start and end must look like YYYY-MM-DDTHH:MM");
        };

        let schedule = |row: &&Value, field: &str| {
            row.get(field)
                .and_then(Value::as_str)
                .and_then(|raw| Timestamp::parse(raw).ok())
        };
        let matches = self
            .rows(EntityKind::Flight)
            .iter()
            .filter(|row| {
                let departure = schedule(row, "scheduledDeparture");
                let arrival = schedule(row, "scheduledArrival");
                match (departure, arrival) {
                    (Some(departure), Some(arrival)) => departure <= end && arrival >= start,
                    _ => false,
                }
            })
            .map(|row| self.expand(EntityKind::Flight, row))
            .collect();
        Reply::ok(Value::Array(matches))
    }

    fn gates(&self, raw_airport: &str, departure: Option<bool>) -> Reply {
        let Ok(airport) = raw_airport.parse::<i64>() else {
            return Reply::error(400, format!("{raw_airport:?} is not a numeric airport id"));
        };
        let matches = self
            .rows(EntityKind::Gate)
            .iter()
            .filter(|row| row.get("airport").and_then(stub_id) == Some(airport))
            .filter(|row| {
                departure.is_none_or(|wanted| {
                    row.get("departureGate").and_then(Value::as_bool) == Some(wanted)
                })
            })
            .map(|row| self.expand(EntityKind::Gate, row))
            .collect();
        Reply::ok(Value::Array(matches))
    }

    fn assign_airport(&mut self, raw_aircraft: &str, raw_airport: &str) -> Reply {
        let index = match self.lookup(EntityKind::Aircraft, raw_aircraft) {
            Ok(index) => index,
            Err(reply) => return reply,
        };
        let airport = match self.lookup(EntityKind::Airport, raw_airport) {
            Ok(position) => self.rows(EntityKind::Airport)[position]
                .get("id")
                .and_then(Value::as_i64)
                .unwrap_or_default(),
            Err(reply) => return reply,
        };

        if let Some(row) = self
            .collections
            .get_mut(&EntityKind::Aircraft)
            .and_then(|rows| rows.get_mut(index))
            .and_then(Value::as_object_mut)
        {
            let airports = row
                .entry("airports")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(items) = airports.as_array_mut()
                && !items.iter().any(|item| stub_id(item) == Some(airport))
            {
                items.push(json!({ "id": airport }));
            }
        }

        let row = self.rows(EntityKind::Aircraft)[index].clone();
        Reply::ok(self.expand(EntityKind::Aircraft, &row))
    }
}

fn stub_id(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}

/// Splits a decoded path into the collection it addresses and the rest.
fn route(segments: &[String]) -> Option<(EntityKind, &[String])> {
    EntityKind::ALL.into_iter().find_map(|kind| {
        let prefix = kind
            .collection_path()
            .split('/')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();
        let matches = segments.len() >= prefix.len()
            && segments.iter().zip(&prefix).all(|(segment, part)| segment == part);
        matches.then(|| (kind, &segments[prefix.len()..]))
    })
}
