// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::collections::BTreeMap;

use crate::{EntityKind, Reference};

pub const NO_REFERENCE: &str = "—";

/// Produces id/label pairs for one referenced collection.
pub trait ReferenceSource {
    fn reference_labels(&self, kind: EntityKind) -> Result<Vec<(i64, String)>>;
}

/// Id to label lookups built from the cached lists of referenced entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    labels: BTreeMap<EntityKind, Vec<(i64, String)>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, entries: Vec<(i64, String)>) {
        self.labels.insert(kind, entries);
    }

    pub fn label(&self, kind: EntityKind, id: i64) -> Option<&str> {
        self.labels
            .get(&kind)?
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, label)| label.as_str())
    }

    pub fn options(&self, kind: EntityKind) -> &[(i64, String)] {
        self.labels.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn display<I: Copy + Into<i64>>(
        &self,
        kind: EntityKind,
        reference: Option<Reference<I>>,
    ) -> String {
        match reference {
            Some(reference) => self.display_id(kind, reference.id.into()),
            None => NO_REFERENCE.to_owned(),
        }
    }

    pub fn display_many<I: Copy + Into<i64>>(
        &self,
        kind: EntityKind,
        references: &[Reference<I>],
    ) -> String {
        if references.is_empty() {
            return NO_REFERENCE.to_owned();
        }
        references
            .iter()
            .map(|reference| self.display_id(kind, reference.id.into()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn display_id(&self, kind: EntityKind, id: i64) -> String {
        self.label(kind, id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("#{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{NO_REFERENCE, ReferenceIndex};
    use crate::{CityId, EntityKind, Reference};

    fn index() -> ReferenceIndex {
        let mut index = ReferenceIndex::new();
        index.insert(
            EntityKind::City,
            vec![(1, "Gander, NL".to_owned()), (2, "Halifax, NS".to_owned())],
        );
        index
    }

    #[test]
    fn known_ids_resolve_to_labels() {
        let index = index();
        assert_eq!(
            index.display(EntityKind::City, Some(Reference::new(CityId::new(2)))),
            "Halifax, NS"
        );
    }

    #[test]
    fn unknown_and_missing_references_fall_back() {
        let index = index();
        assert_eq!(
            index.display(EntityKind::City, Some(Reference::new(CityId::new(9)))),
            "#9"
        );
        assert_eq!(
            index.display::<CityId>(EntityKind::City, None),
            NO_REFERENCE
        );
        assert!(index.options(EntityKind::Airport).is_empty());
    }

    #[test]
    fn many_references_join_labels() {
        let index = index();
        let refs = [Reference::new(CityId::new(1)), Reference::new(CityId::new(3))];
        assert_eq!(
            index.display_many(EntityKind::City, &refs),
            "Gander, NL, #3"
        );
        assert_eq!(
            index.display_many::<CityId>(EntityKind::City, &[]),
            NO_REFERENCE
        );
    }
}
