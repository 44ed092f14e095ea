// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(CityId);
entity_id!(AirportId);
entity_id!(AirlineId);
entity_id!(AircraftId);
entity_id!(GateId);
entity_id!(PassengerId);
entity_id!(FlightId);

#[cfg(test)]
mod tests {
    use super::CityId;

    #[test]
    fn ids_serialize_as_bare_integers() -> anyhow::Result<()> {
        let id: CityId = serde_json::from_str("7")?;
        assert_eq!(id, CityId::new(7));
        assert_eq!(serde_json::to_string(&id)?, "7");
        assert_eq!(i64::from(id), 7);
        Ok(())
    }
}
