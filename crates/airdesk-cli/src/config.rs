// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airdesk_app::EntityKind;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_START_SCREEN: &str = "flights";
const DEFAULT_LOG_FILTER: &str = "info";

/// Overrides `[api].base_url` when set.
pub const API_URL_ENV: &str = "AIRDESK_API_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub start_screen: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            start_screen: Some(DEFAULT_START_SCREEN.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub filter: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; pass --config <path> to the config file")
        })?;
        Ok(config_root.join("airdesk").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().trim_end_matches('/').is_empty()
        {
            bail!(
                "api.base_url in {} is empty -- set it to the API server, for example {}",
                path.display(),
                DEFAULT_BASE_URL
            );
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(screen) = &self.ui.start_screen {
            parse_screen(screen)
                .with_context(|| format!("ui.start_screen in {}", path.display()))?;
        }

        Ok(())
    }

    /// `env_override` is the value of [`API_URL_ENV`], read once at startup.
    pub fn base_url<'a>(&'a self, env_override: Option<&'a str>) -> &'a str {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or(self.api.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn start_screen(&self) -> Result<EntityKind> {
        parse_screen(
            self.ui
                .start_screen
                .as_deref()
                .unwrap_or(DEFAULT_START_SCREEN),
        )
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.as_deref().map(PathBuf::from)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# airdesk config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# {} overrides base_url when set.\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[ui]\n# One of: {}\nstart_screen = \"{}\"\n\n[log]\nfilter = \"{}\"\n# Logging is off unless a file is set.\n# file = \"/absolute/path/to/airdesk.log\"\n",
            path.display(),
            API_URL_ENV,
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            screen_names(),
            DEFAULT_START_SCREEN,
            DEFAULT_LOG_FILTER,
        )
    }
}

pub fn parse_screen(name: &str) -> Result<EntityKind> {
    EntityKind::parse(name).ok_or_else(|| {
        anyhow!(
            "unknown screen {name:?}; expected one of: {}",
            screen_names()
        )
    })
}

fn screen_names() -> String {
    EntityKind::ALL
        .map(EntityKind::label)
        .join(", ")
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration, parse_screen};
    use airdesk_app::EntityKind;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.base_url(None), "http://localhost:8080");
        assert_eq!(config.api_timeout()?, Duration::from_secs(10));
        assert_eq!(config.start_screen()?, EntityKind::Flight);
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_file(), None);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url = \"http://api.local\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[api], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"http://api.local:9000//\"\ntimeout = \"500ms\"\n[ui]\nstart_screen = \"gates\"\n[log]\nfilter = \"airdesk_api=debug\"\nfile = \"/tmp/airdesk.log\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.base_url(None), "http://api.local:9000");
        assert_eq!(config.api_timeout()?, Duration::from_millis(500));
        assert_eq!(config.start_screen()?, EntityKind::Gate);
        assert_eq!(config.log_filter(), "airdesk_api=debug");
        assert_eq!(config.log_file(), Some(PathBuf::from("/tmp/airdesk.log")));
        Ok(())
    }

    #[test]
    fn env_override_wins_over_config_base_url() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\nbase_url = \"http://api.local\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(
            config.base_url(Some("http://staging.local/")),
            "http://staging.local"
        );
        assert_eq!(config.base_url(Some("  ")), "http://api.local");
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn timeout_rejects_invalid_duration() {
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        let message = error.to_string();
        assert!(
            message.contains("invalid duration") || message.contains("invalid timeout duration"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn timeout_rejects_zero_in_config() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn empty_base_url_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\nbase_url = \"/\"\n")?;
        let error = Config::load(&path).expect_err("empty base url should fail");
        assert!(error.to_string().contains("api.base_url"));
        Ok(())
    }

    #[test]
    fn unknown_start_screen_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nstart_screen = \"hangars\"\n")?;
        let error = Config::load(&path).expect_err("unknown screen should fail");
        let message = format!("{error:#}");
        assert!(message.contains("ui.start_screen"), "{message}");
        assert!(message.contains("unknown screen \"hangars\""), "{message}");
        Ok(())
    }

    #[test]
    fn screens_parse_by_label_or_singular() -> Result<()> {
        assert_eq!(parse_screen("Airports")?, EntityKind::Airport);
        assert_eq!(parse_screen("passenger")?, EntityKind::Passenger);
        let error = parse_screen("runways").expect_err("unknown screen should fail");
        assert!(error.to_string().contains("flights, cities, aircraft"));
        Ok(())
    }

    #[test]
    fn default_path_ends_with_airdesk_config_toml() -> Result<()> {
        let path = Config::default_path()?;
        assert!(path.ends_with("airdesk/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("[api]"));
        assert!(example.contains("AIRDESK_API_URL"));
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.start_screen()?, EntityKind::Flight);
        Ok(())
    }
}
