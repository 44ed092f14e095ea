// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Sends `tracing` output to `file` as plain text. Without a file nothing is
/// installed, so the terminal UI never sees log lines.
pub fn init(filter: &str, file: Option<&Path>) -> Result<()> {
    let Some(path) = file else {
        return Ok(());
    };

    let filter = parse_filter(filter)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow!("install logger: {error}"))
}

fn parse_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log.filter {filter:?}; use a level such as \"debug\""))
}

#[cfg(test)]
mod tests {
    use super::{init, parse_filter};
    use anyhow::Result;

    #[test]
    fn no_file_installs_nothing() -> Result<()> {
        init("not a [valid filter", None)?;
        Ok(())
    }

    #[test]
    fn filters_accept_levels_and_targets() -> Result<()> {
        parse_filter("info")?;
        parse_filter("warn,airdesk_api=debug")?;
        Ok(())
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let error = parse_filter("airdesk_api=loudest").expect_err("malformed filter should fail");
        assert!(error.to_string().contains("invalid log.filter"));
    }
}
