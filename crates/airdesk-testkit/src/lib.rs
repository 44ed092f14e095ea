// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! In-process stand-in for the airport REST API, served over real HTTP on a
//! loopback port.

mod seed;
mod store;

pub use seed::seeded_store;
pub use store::{Reply, Store};

use anyhow::{Result, anyhow};
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

/// One request as the backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query exactly as sent, still percent-encoded.
    pub url: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct Shared {
    store: Store,
    requests: Vec<RecordedRequest>,
}

/// Serves a [`Store`] on `127.0.0.1` until dropped.
pub struct MockBackend {
    server: Arc<Server>,
    base_url: String,
    shared: Arc<Mutex<Shared>>,
    worker: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn start() -> Result<Self> {
        Self::serve(Store::new())
    }

    pub fn seeded() -> Result<Self> {
        Self::serve(seeded_store())
    }

    pub fn serve(store: Store) -> Result<Self> {
        let server = Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock backend: {error}"))?;
        let server = Arc::new(server);
        let base_url = format!("http://{}", server.server_addr());
        let shared = Arc::new(Mutex::new(Shared {
            store,
            requests: Vec::new(),
        }));

        let worker = {
            let server = Arc::clone(&server);
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let mut body = String::new();
                    if request.as_reader().read_to_string(&mut body).is_err() {
                        body.clear();
                    }
                    let method = request.method().to_string();
                    let url = request.url().to_owned();

                    let reply = {
                        let mut shared = lock(&shared);
                        shared.requests.push(RecordedRequest {
                            method: method.clone(),
                            url: url.clone(),
                            body: body.clone(),
                        });
                        shared.store.handle(&method, &url, &body)
                    };
                    // The client may have given up already; nothing to report to.
                    let _ = request.respond(into_response(reply));
                }
            })
        };

        Ok(Self {
            server,
            base_url,
            shared,
            worker: Some(worker),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.shared).requests.clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.shared).requests.clear();
    }

    /// Runs `inspect` against the live store, for assertions on server state.
    pub fn with_store<T>(&self, inspect: impl FnOnce(&mut Store) -> T) -> T {
        inspect(&mut lock(&self.shared).store)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn into_response(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let Some(body) = reply.body else {
        return Response::from_data(Vec::new()).with_status_code(reply.status);
    };
    let response = Response::from_string(body.to_string()).with_status_code(reply.status);
    match Header::from_bytes("Content-Type", "application/json") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::MockBackend;
    use airdesk_app::EntityKind;
    use anyhow::Result;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    fn raw_get(base_url: &str, path: &str) -> Result<String> {
        let address = base_url.trim_start_matches("http://");
        let mut stream = TcpStream::connect(address)?;
        write!(
            stream,
            "GET {path} HTTP/1.1\r\nHost: {address}\r\nConnection: close\r\n\r\n"
        )?;
        let mut response = String::new();
        stream.read_to_string(&mut response)?;
        Ok(response)
    }

    #[test]
    fn serves_and_records_requests() -> Result<()> {
        let backend = MockBackend::seeded()?;
        let response = raw_get(backend.base_url(), "/api/airlines/code/AC")?;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("Air Canada"));

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "/api/airlines/code/AC");

        backend.clear_requests();
        assert!(backend.requests().is_empty());
        Ok(())
    }

    #[test]
    fn empty_backend_starts_without_rows() -> Result<()> {
        let backend = MockBackend::start()?;
        assert!(backend.with_store(|store| store.len(EntityKind::City) == 0));
        let response = raw_get(backend.base_url(), "/city")?;
        assert!(response.contains("[]"));
        Ok(())
    }
}
