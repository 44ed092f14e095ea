// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::schema::Entity;

/// One REST collection as seen by a table controller.
///
/// Every method is a single round trip. Implementations never retry and
/// never cache; a failing status becomes an error naming the method, path,
/// and status.
pub trait Resource<E: Entity> {
    fn list(&self) -> Result<Vec<E>>;

    fn get(&self, id: E::Id) -> Result<E>;

    /// Narrower listing behind a screen filter (lookup path, range query).
    fn list_filtered(&self, filter: &E::Filter) -> Result<Vec<E>>;

    /// Returns the server's stored object, which may differ from the request.
    fn create(&self, request: &E::Request) -> Result<E>;

    fn update(&self, id: E::Id, request: &E::Request) -> Result<E>;

    fn delete(&self, id: E::Id) -> Result<()>;

    fn assign_relation(&self, id: E::Id, related: i64) -> Result<()> {
        let _ = (id, related);
        bail!("{} has no assignable relation", E::KIND.singular());
    }
}
