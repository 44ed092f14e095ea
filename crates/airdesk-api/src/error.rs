// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;

/// A request that reached the server and came back with a non-success
/// status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{method} {path} failed: {status}{}", detail_suffix(.detail))]
pub struct HttpError {
    pub method: String,
    /// Request path including any query string, without the base URL.
    pub path: String,
    pub status: u16,
    /// Short server-supplied explanation, when the body carried one.
    pub detail: Option<String>,
}

impl HttpError {
    pub fn new(method: &str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
            status,
            detail: server_detail(body),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

fn server_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        return [parsed.message, parsed.error]
            .into_iter()
            .flatten()
            .map(|text| text.trim().to_owned())
            .find(|text| !text.is_empty() && text.len() < 200);
    }

    if body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return Some(body.to_owned());
    }
    None
}
