// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{AirportId, Timestamp};

/// Filter type for screens that only support the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoFilter {}

impl NoFilter {
    pub fn parse(input: &str, screen: &str) -> Result<Option<Self>> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        bail!("{screen} cannot be filtered -- clear the filter to reload");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AirlineFilter {
    Code(String),
}

impl AirlineFilter {
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let code = input.trim();
        if code.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::Code(code.to_uppercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFilter {
    Airport(AirportId),
    AirportAndType {
        airport: AirportId,
        departure: bool,
    },
}

impl GateFilter {
    /// `<airportId>` or `<airportId> departure|arrival`.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let mut parts = input.split_whitespace();
        let Some(airport) = parts.next() else {
            return Ok(None);
        };
        let airport = match airport.parse::<i64>() {
            Ok(id) if id > 0 => AirportId::new(id),
            _ => bail!("gate filter airport {airport:?} must be a numeric airport id"),
        };

        let filter = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None => Self::Airport(airport),
            Some("departure" | "dep" | "true") => Self::AirportAndType {
                airport,
                departure: true,
            },
            Some("arrival" | "arr" | "false") => Self::AirportAndType {
                airport,
                departure: false,
            },
            Some(other) => bail!("gate type {other:?} must be departure or arrival"),
        };
        if parts.next().is_some() {
            bail!("gate filter takes an airport id and an optional type");
        }
        Ok(Some(filter))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightFilter {
    Number(String),
    Between { start: Timestamp, end: Timestamp },
}

impl FlightFilter {
    /// A flight number, or `<start>..<end>` for a schedule window.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        if let Some((start, end)) = input.split_once("..") {
            let (start, end) = (start.trim(), end.trim());
            if start.is_empty() || end.is_empty() {
                bail!("pick both start and end -- use <start>..<end>");
            }
            return Ok(Some(Self::Between {
                start: Timestamp::parse(start)?,
                end: Timestamp::parse(end)?,
            }));
        }

        Ok(Some(Self::Number(input.to_owned())))
    }
}

#[cfg(test)]
mod tests {
    use super::{AirlineFilter, FlightFilter, GateFilter, NoFilter};
    use crate::AirportId;
    use anyhow::Result;

    #[test]
    fn empty_inputs_mean_no_filter() -> Result<()> {
        assert!(GateFilter::parse("  ")?.is_none());
        assert!(FlightFilter::parse("")?.is_none());
        assert!(AirlineFilter::parse(" ")?.is_none());
        assert!(NoFilter::parse("", "cities")?.is_none());
        Ok(())
    }

    #[test]
    fn gate_filter_parses_airport_and_type() -> Result<()> {
        assert_eq!(
            GateFilter::parse("3")?,
            Some(GateFilter::Airport(AirportId::new(3)))
        );
        assert_eq!(
            GateFilter::parse("3 departure")?,
            Some(GateFilter::AirportAndType {
                airport: AirportId::new(3),
                departure: true,
            })
        );
        assert!(GateFilter::parse("three").is_err());
        assert!(GateFilter::parse("3 sideways").is_err());
        Ok(())
    }

    #[test]
    fn flight_filter_requires_both_bounds() {
        let error = FlightFilter::parse("2025-08-15T10:00..").expect_err("missing end");
        assert!(error.to_string().contains("pick both start and end"));
    }

    #[test]
    fn flight_filter_parses_window_and_number() -> Result<()> {
        let Some(FlightFilter::Between { start, end }) =
            FlightFilter::parse("2025-08-15T10:00..2025-08-15T12:00")?
        else {
            panic!("expected a schedule window");
        };
        assert_eq!(start.to_string(), "2025-08-15T10:00");
        assert_eq!(end.to_string(), "2025-08-15T12:00");

        assert_eq!(
            FlightFilter::parse(" AC 123 ")?,
            Some(FlightFilter::Number("AC 123".to_owned()))
        );
        Ok(())
    }

    #[test]
    fn unfilterable_screens_reject_input() {
        assert!(NoFilter::parse("x", "cities").is_err());
    }
}
