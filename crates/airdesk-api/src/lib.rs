// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod error;
mod queries;

pub use error::HttpError;
pub use queries::Queries;

use airdesk_app::{
    Aircraft, AircraftId, Airline, Airport, AirportId, City, Entity, EntityKind, Flight, Gate,
    Passenger, ReferenceSource, Resource, Timestamp, labels_of,
};
use anyhow::{Context, Result, anyhow, bail};
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking client for the airport REST API. Cheap to clone; clones share
/// one connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    base: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            bail!("api.base_url {base_url:?} must be an http:// or https:// URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            base,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The [`Resource`] view of one entity's collection.
    pub fn collection<E: Queries>(&self) -> Collection<E> {
        Collection {
            client: self.clone(),
            entity: PhantomData,
        }
    }

    pub fn list<E: Entity>(&self) -> Result<Vec<E>> {
        let url = self.endpoint(E::KIND, &[])?;
        self.fetch(Method::GET, url)
    }

    pub fn get<E: Entity>(&self, id: E::Id) -> Result<E> {
        let url = self.endpoint(E::KIND, &[&id.to_string()])?;
        self.fetch(Method::GET, url)
    }

    pub fn create<E: Entity>(&self, request: &E::Request) -> Result<E> {
        let url = self.endpoint(E::KIND, &[])?;
        self.submit(Method::POST, url, request)
    }

    pub fn update<E: Entity>(&self, id: E::Id, request: &E::Request) -> Result<E> {
        let url = self.endpoint(E::KIND, &[&id.to_string()])?;
        self.submit(Method::PUT, url, request)
    }

    pub fn delete<E: Entity>(&self, id: E::Id) -> Result<()> {
        let url = self.endpoint(E::KIND, &[&id.to_string()])?;
        self.send(Method::DELETE, url, None::<&()>)?;
        Ok(())
    }

    /// `None` when the server answers with an empty or `null` body.
    pub fn airline_by_code(&self, code: &str) -> Result<Option<Airline>> {
        let url = self.endpoint(EntityKind::Airline, &["code", code])?;
        self.fetch_optional(Method::GET, url)
    }

    /// `None` when the server answers with an empty or `null` body.
    pub fn flight_by_number(&self, number: &str) -> Result<Option<Flight>> {
        let url = self.endpoint(EntityKind::Flight, &["number", number])?;
        self.fetch_optional(Method::GET, url)
    }

    /// Flights whose schedule intersects `start..end`. Bound inclusivity is
    /// the server's call.
    pub fn flights_between(&self, start: Timestamp, end: Timestamp) -> Result<Vec<Flight>> {
        let mut url = self.endpoint(EntityKind::Flight, &["between"])?;
        url.query_pairs_mut()
            .append_pair("start", &start.to_string())
            .append_pair("end", &end.to_string());
        self.fetch(Method::GET, url)
    }

    pub fn gates_by_airport(&self, airport: AirportId) -> Result<Vec<Gate>> {
        let url = self.endpoint(EntityKind::Gate, &["airport", &airport.to_string()])?;
        self.fetch(Method::GET, url)
    }

    pub fn gates_by_airport_and_type(
        &self,
        airport: AirportId,
        departure: bool,
    ) -> Result<Vec<Gate>> {
        let airport = airport.to_string();
        let mut url = self.endpoint(EntityKind::Gate, &["airport", &airport, "type"])?;
        url.query_pairs_mut()
            .append_pair("isDepartureGate", if departure { "true" } else { "false" });
        self.fetch(Method::GET, url)
    }

    /// Adds `airport` to the aircraft's airport list. The response body is
    /// not inspected.
    pub fn assign_airport(&self, aircraft: AircraftId, airport: AirportId) -> Result<()> {
        let url = self.endpoint(
            EntityKind::Aircraft,
            &[&aircraft.to_string(), "airport", &airport.to_string()],
        )?;
        self.send(Method::PUT, url, None::<&()>)?;
        Ok(())
    }

    /// Collection path for `kind` under the base URL, followed by
    /// percent-encoded `segments`.
    fn endpoint(&self, kind: EntityKind, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| anyhow!("api.base_url {:?} cannot carry a path", self.base_url))?;
            path.pop_if_empty();
            path.extend(kind.collection_path().split('/').filter(|part| !part.is_empty()));
            path.extend(segments);
        }
        Ok(url)
    }

    fn fetch<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T> {
        let path = request_path(&url);
        let response = self.send(method.clone(), url, None::<&()>)?;
        response
            .json()
            .with_context(|| format!("decode {method} {path} response"))
    }

    fn fetch_optional<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<Option<T>> {
        let path = request_path(&url);
        let body = self
            .send(method.clone(), url, None::<&()>)?
            .text()
            .with_context(|| format!("read {method} {path} response"))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body).with_context(|| format!("decode {method} {path} response"))
    }

    fn submit<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let path = request_path(&url);
        let response = self.send(method.clone(), url, Some(body))?;
        response
            .json()
            .with_context(|| format!("decode {method} {path} response"))
    }

    fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        let path = request_path(&url);
        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, &method, &path, error))?;

        let status = response.status();
        debug!(%method, %path, status = status.as_u16(), "api request");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(HttpError::new(method.as_str(), &path, status.as_u16(), &body).into());
        }
        Ok(response)
    }
}

impl ReferenceSource for Client {
    fn reference_labels(&self, kind: EntityKind) -> Result<Vec<(i64, String)>> {
        Ok(match kind {
            EntityKind::City => labels_of(&self.list::<City>()?),
            EntityKind::Airport => labels_of(&self.list::<Airport>()?),
            EntityKind::Airline => labels_of(&self.list::<Airline>()?),
            EntityKind::Aircraft => labels_of(&self.list::<Aircraft>()?),
            EntityKind::Gate => labels_of(&self.list::<Gate>()?),
            EntityKind::Passenger => labels_of(&self.list::<Passenger>()?),
            EntityKind::Flight => labels_of(&self.list::<Flight>()?),
        })
    }
}

/// One entity's collection bound to a client.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    client: Client,
    entity: PhantomData<fn() -> E>,
}

impl<E> Collection<E> {
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl<E: Queries> Resource<E> for Collection<E> {
    fn list(&self) -> Result<Vec<E>> {
        self.client.list()
    }

    fn get(&self, id: E::Id) -> Result<E> {
        self.client.get::<E>(id)
    }

    fn list_filtered(&self, filter: &E::Filter) -> Result<Vec<E>> {
        E::filtered(&self.client, filter)
    }

    fn create(&self, request: &E::Request) -> Result<E> {
        self.client.create::<E>(request)
    }

    fn update(&self, id: E::Id, request: &E::Request) -> Result<E> {
        self.client.update::<E>(id, request)
    }

    fn delete(&self, id: E::Id) -> Result<()> {
        self.client.delete::<E>(id)
    }

    fn assign_relation(&self, id: E::Id, related: i64) -> Result<()> {
        E::assign(&self.client, id, related)
    }
}

fn request_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

fn connection_error(
    base_url: &str,
    method: &Method,
    path: &str,
    error: reqwest::Error,
) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!(
            "{method} {path} timed out -- check that {base_url} is responsive or raise api.timeout"
        );
    }
    anyhow!(
        "{method} {path}: cannot reach {base_url} -- start the API server or set api.base_url ({error})"
    )
}
