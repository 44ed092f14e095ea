// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airdesk_api::{Client, Queries};
use airdesk_app::{
    Aircraft, Airline, Airport, City, EntityKind, Flight, Gate, Passenger, TableController,
    TableScreen,
};
use anyhow::{Result, bail};

/// Mounts one HTTP-backed table controller per screen. Every table shares
/// the same client for its rows and its reference labels.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn table<E: Queries>(&self) -> Box<dyn TableScreen> {
        Box::new(TableController::new(
            self.client.collection::<E>(),
            self.client.clone(),
        ))
    }

    /// Runs one joined load of `screen` and reports how many rows came back.
    pub fn check(&mut self, screen: EntityKind) -> Result<usize> {
        let mut table = airdesk_tui::AppRuntime::mount(self, screen)?;
        if !table.load() {
            bail!(
                "load {} from {}: {}",
                screen.label(),
                self.client.base_url(),
                table.error().unwrap_or("unknown error")
            );
        }
        Ok(table.row_count())
    }
}

impl airdesk_tui::AppRuntime for ApiRuntime {
    fn mount(&mut self, screen: EntityKind) -> Result<Box<dyn TableScreen>> {
        let table = match screen {
            EntityKind::Flight => self.table::<Flight>(),
            EntityKind::City => self.table::<City>(),
            EntityKind::Aircraft => self.table::<Aircraft>(),
            EntityKind::Airline => self.table::<Airline>(),
            EntityKind::Airport => self.table::<Airport>(),
            EntityKind::Passenger => self.table::<Passenger>(),
            EntityKind::Gate => self.table::<Gate>(),
        };
        Ok(table)
    }
}
