// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::thread;
use tracing::{debug, warn};

use crate::forms::{FieldKind, FieldSpec, FormValues, SubmitMode};
use crate::references::{NO_REFERENCE, ReferenceIndex, ReferenceSource};
use crate::resource::Resource;
use crate::schema::Entity;
use crate::{EntityKind, FlightStatus};

/// Cached rows plus form, edit, loading, and error state for one screen.
///
/// `rows` only ever holds what the server returned. Every operation clears
/// `error` when it starts and sets it when it fails; nothing is retried.
#[derive(Debug)]
pub struct TableController<E: Entity, R, S> {
    resource: R,
    references: S,
    rows: Vec<E>,
    index: ReferenceIndex,
    loading: bool,
    error: Option<String>,
    editing: Option<(E::Id, FormValues)>,
    create_form: FormValues,
}

impl<E, R, S> TableController<E, R, S>
where
    E: Entity,
    R: Resource<E>,
    S: ReferenceSource + Sync,
{
    pub fn new(resource: R, references: S) -> Self {
        Self {
            resource,
            references,
            rows: Vec::new(),
            index: ReferenceIndex::new(),
            loading: false,
            error: None,
            editing: None,
            create_form: E::blank_form(),
        }
    }

    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    pub fn references(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing_id(&self) -> Option<E::Id> {
        self.editing.as_ref().map(|(id, _)| *id)
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut FormValues> {
        self.editing.as_mut().map(|(_, values)| values)
    }

    pub fn create_form(&self) -> &FormValues {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut FormValues {
        &mut self.create_form
    }

    pub fn reset_create_form(&mut self) {
        self.create_form = E::blank_form();
    }

    /// Marks the table as loading ahead of a list-replacing fetch, so a
    /// frame can be drawn before the request blocks.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replaces `rows` with the full collection, fetched together with the
    /// label lists of every referenced collection.
    pub fn load(&mut self) -> bool {
        self.fetch(None)
    }

    pub fn load_filtered(&mut self, filter: Option<&E::Filter>) -> bool {
        self.fetch(filter)
    }

    /// Parses one line of filter input. Blank input is a full load.
    pub fn apply_filter(&mut self, input: &str) -> bool {
        self.error = None;
        match E::parse_filter(input) {
            Ok(filter) => self.fetch(filter.as_ref()),
            Err(error) => self.fail("filter", error),
        }
    }

    pub fn create(&mut self) -> bool {
        self.error = None;
        let request = match E::build_request(&self.create_form, SubmitMode::Create) {
            Ok(request) => request,
            Err(error) => return self.fail("create", error),
        };
        match self.resource.create(&request) {
            Ok(row) => {
                debug!(kind = E::KIND.label(), id = %row.id(), "created");
                self.rows.insert(0, row);
                self.reset_create_form();
                true
            }
            Err(error) => self.fail("create", error),
        }
    }

    /// Starts editing `id`, dropping any other edit in progress unsaved.
    pub fn begin_edit(&mut self, id: E::Id) -> bool {
        let Some(row) = self.rows.iter().find(|row| row.id() == id) else {
            return false;
        };
        self.editing = Some((id, row.form_values()));
        self.error = None;
        true
    }

    pub fn save_edit(&mut self) -> bool {
        self.error = None;
        let Some((id, values)) = self.editing.as_ref() else {
            return false;
        };
        let id = *id;
        let request = match E::build_request(values, SubmitMode::Update) {
            Ok(request) => request,
            Err(error) => return self.fail("update", error),
        };
        match self.resource.update(id, &request) {
            Ok(updated) => {
                debug!(kind = E::KIND.label(), %id, "updated");
                if let Some(row) = self.rows.iter_mut().find(|row| row.id() == id) {
                    *row = updated;
                }
                self.editing = None;
                true
            }
            Err(error) => self.fail("update", error),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Deletes `id` once `confirm` agrees to the prompt it is shown.
    pub fn delete(&mut self, id: E::Id, confirm: impl FnOnce(&str) -> bool) -> bool {
        let label = self
            .rows
            .iter()
            .find(|row| row.id() == id)
            .map(Entity::label)
            .unwrap_or_else(|| format!("#{id}"));
        if !confirm(&format!("delete {} {label}?", E::KIND.singular())) {
            return false;
        }

        self.error = None;
        match self.resource.delete(id) {
            Ok(()) => {
                debug!(kind = E::KIND.label(), %id, "deleted");
                self.rows.retain(|row| row.id() != id);
                if self.editing_id() == Some(id) {
                    self.editing = None;
                }
                true
            }
            Err(error) => {
                let error = anyhow!(
                    "{error:#} -- the {} may still be referenced elsewhere",
                    E::KIND.singular()
                );
                self.fail("delete", error)
            }
        }
    }

    /// Links `id` to a row of the relation collection, then reloads.
    pub fn assign_relation(&mut self, id: E::Id, related: i64) -> bool {
        self.error = None;
        match self.resource.assign_relation(id, related) {
            Ok(()) => self.load(),
            Err(error) => self.fail("assign", error),
        }
    }

    pub fn choices(&self, kind: FieldKind) -> Vec<(String, String)> {
        field_choices(kind, &self.index)
    }

    fn fetch(&mut self, filter: Option<&E::Filter>) -> bool {
        self.begin_load();

        let resource = &self.resource;
        let references = &self.references;
        let outcome = thread::scope(|scope| -> Result<(Vec<E>, ReferenceIndex)> {
            let pending = E::REFERENCES
                .iter()
                .map(|&kind| (kind, scope.spawn(move || references.reference_labels(kind))))
                .collect::<Vec<_>>();

            let rows = match filter {
                Some(filter) => resource.list_filtered(filter),
                None => resource.list(),
            };

            let mut index = ReferenceIndex::new();
            for (kind, handle) in pending {
                let labels = handle
                    .join()
                    .map_err(|_| anyhow!("{} lookup thread panicked", kind.label()))??;
                index.insert(kind, labels);
            }
            Ok((rows?, index))
        });

        self.loading = false;
        match outcome {
            Ok((rows, index)) => {
                debug!(kind = E::KIND.label(), rows = rows.len(), "loaded");
                self.rows = rows;
                self.index = index;
                true
            }
            Err(error) => {
                self.rows.clear();
                self.fail("load", error)
            }
        }
    }

    fn fail(&mut self, operation: &str, error: anyhow::Error) -> bool {
        let message = format!("{error:#}");
        warn!(kind = E::KIND.label(), operation, %message, "operation failed");
        self.loading = false;
        self.error = Some(message);
        false
    }
}

/// Value/label pairs a form field can cycle through. Free-text fields have
/// none.
pub fn field_choices(kind: FieldKind, references: &ReferenceIndex) -> Vec<(String, String)> {
    let options = |target: EntityKind| {
        references
            .options(target)
            .iter()
            .map(|(id, label)| (id.to_string(), label.clone()))
            .collect::<Vec<_>>()
    };
    match kind {
        FieldKind::Text | FieldKind::Count | FieldKind::Timestamp => Vec::new(),
        FieldKind::Toggle => vec![
            ("true".to_owned(), "yes".to_owned()),
            ("false".to_owned(), "no".to_owned()),
        ],
        FieldKind::Status => FlightStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_owned(), status.as_str().to_owned()))
            .collect(),
        FieldKind::Reference(target) => options(target),
        FieldKind::OptionalReference(target) => {
            let mut choices = vec![(String::new(), NO_REFERENCE.to_owned())];
            choices.extend(options(target));
            choices
        }
    }
}

/// Object-safe view of a table controller for the shell, addressing rows
/// by position.
pub trait TableScreen {
    fn kind(&self) -> EntityKind;
    fn columns(&self) -> &'static [&'static str];
    fn fields(&self) -> &'static [FieldSpec];
    /// Target of the assign action, if this screen has one.
    fn relation(&self) -> Option<EntityKind>;
    fn cells(&self) -> Vec<Vec<String>>;
    fn row_count(&self) -> usize;
    fn summary(&self) -> Option<String>;
    fn loading(&self) -> bool;
    fn error(&self) -> Option<&str>;
    fn editing_row(&self) -> Option<usize>;
    fn choices(&self, kind: FieldKind) -> Vec<(String, String)>;
    /// The create form or the edit buffer in progress.
    fn form(&self, mode: SubmitMode) -> Option<&FormValues>;

    /// Flags the table as loading until the next load, filter, or assign
    /// completes.
    fn begin_load(&mut self);
    fn load(&mut self) -> bool;
    fn apply_filter(&mut self, input: &str) -> bool;
    fn create_form(&mut self) -> &mut FormValues;
    fn reset_create_form(&mut self);
    fn create(&mut self) -> bool;
    fn begin_edit_at(&mut self, row: usize) -> bool;
    fn edit_buffer(&mut self) -> Option<&mut FormValues>;
    fn save_edit(&mut self) -> bool;
    fn cancel_edit(&mut self);
    fn delete_at(&mut self, row: usize, confirm: &mut dyn FnMut(&str) -> bool) -> bool;
    fn assign_at(&mut self, row: usize, related: &str) -> bool;
}

impl<E, R, S> TableScreen for TableController<E, R, S>
where
    E: Entity,
    R: Resource<E>,
    S: ReferenceSource + Sync,
{
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    fn columns(&self) -> &'static [&'static str] {
        E::COLUMNS
    }

    fn fields(&self) -> &'static [FieldSpec] {
        E::FIELDS
    }

    fn relation(&self) -> Option<EntityKind> {
        E::RELATION
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|row| row.cells(&self.index)).collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn summary(&self) -> Option<String> {
        E::summary(&self.rows)
    }

    fn loading(&self) -> bool {
        self.loading
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn editing_row(&self) -> Option<usize> {
        let id = self.editing_id()?;
        self.rows.iter().position(|row| row.id() == id)
    }

    fn choices(&self, kind: FieldKind) -> Vec<(String, String)> {
        field_choices(kind, &self.index)
    }

    fn form(&self, mode: SubmitMode) -> Option<&FormValues> {
        match mode {
            SubmitMode::Create => Some(&self.create_form),
            SubmitMode::Update => self.editing.as_ref().map(|(_, values)| values),
        }
    }

    fn begin_load(&mut self) {
        TableController::begin_load(self);
    }

    fn load(&mut self) -> bool {
        TableController::load(self)
    }

    fn apply_filter(&mut self, input: &str) -> bool {
        TableController::apply_filter(self, input)
    }

    fn create_form(&mut self) -> &mut FormValues {
        self.create_form_mut()
    }

    fn reset_create_form(&mut self) {
        TableController::reset_create_form(self);
    }

    fn create(&mut self) -> bool {
        TableController::create(self)
    }

    fn begin_edit_at(&mut self, row: usize) -> bool {
        match self.rows.get(row).map(Entity::id) {
            Some(id) => self.begin_edit(id),
            None => false,
        }
    }

    fn edit_buffer(&mut self) -> Option<&mut FormValues> {
        self.edit_buffer_mut()
    }

    fn save_edit(&mut self) -> bool {
        TableController::save_edit(self)
    }

    fn cancel_edit(&mut self) {
        TableController::cancel_edit(self);
    }

    fn delete_at(&mut self, row: usize, confirm: &mut dyn FnMut(&str) -> bool) -> bool {
        match self.rows.get(row).map(Entity::id) {
            Some(id) => self.delete(id, |prompt| confirm(prompt)),
            None => false,
        }
    }

    fn assign_at(&mut self, row: usize, related: &str) -> bool {
        let Some(id) = self.rows.get(row).map(Entity::id) else {
            return false;
        };
        let target = E::RELATION.map_or("related", EntityKind::singular);
        match related.trim().parse::<i64>() {
            Ok(related) if related > 0 => self.assign_relation(id, related),
            _ => {
                self.error = None;
                self.fail(
                    "assign",
                    anyhow!("{target} id {related:?} must be a positive number"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TableController, TableScreen, field_choices};
    use crate::forms::{FieldKind, FormValues, SubmitMode};
    use crate::references::{ReferenceIndex, ReferenceSource};
    use crate::resource::Resource;
    use crate::schema::Entity;
    use crate::{
        Aircraft, AircraftId, AirportId, City, CityId, EntityKind, Flight, Gate, GateFilter,
        GateId, Reference,
    };
    use anyhow::{Result, anyhow, bail};
    use std::sync::Mutex;

    type Build<E> = fn(<E as Entity>::Id, &<E as Entity>::Request) -> E;
    type Matches<E> = fn(&E, &<E as Entity>::Filter) -> bool;

    /// In-memory collection that records every call it receives.
    struct FakeResource<E: Entity> {
        rows: Mutex<Vec<E>>,
        calls: Mutex<Vec<String>>,
        next_id: Mutex<i64>,
        fail_list: Mutex<bool>,
        fail_create: Mutex<bool>,
        fail_update: Mutex<bool>,
        fail_delete: Mutex<bool>,
        build: Build<E>,
        matches: Matches<E>,
    }

    impl<E: Entity> FakeResource<E> {
        fn new(rows: Vec<E>, build: Build<E>, matches: Matches<E>) -> Self {
            Self {
                rows: Mutex::new(rows),
                calls: Mutex::new(Vec::new()),
                next_id: Mutex::new(100),
                fail_list: Mutex::new(false),
                fail_create: Mutex::new(false),
                fail_update: Mutex::new(false),
                fail_delete: Mutex::new(false),
                build,
                matches,
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().expect("calls lock").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl<E: Entity> Resource<E> for &FakeResource<E> {
        fn list(&self) -> Result<Vec<E>> {
            self.record("list".to_owned());
            if *self.fail_list.lock().expect("fail lock") {
                bail!("GET /fake failed: 503");
            }
            Ok(self.rows.lock().expect("rows lock").clone())
        }

        fn get(&self, id: E::Id) -> Result<E> {
            self.record(format!("get {id}"));
            self.rows
                .lock()
                .expect("rows lock")
                .iter()
                .find(|row| row.id() == id)
                .cloned()
                .ok_or_else(|| anyhow!("GET /fake/{id} failed: 404"))
        }

        fn list_filtered(&self, filter: &E::Filter) -> Result<Vec<E>> {
            self.record(format!("filtered {filter:?}"));
            Ok(self
                .rows
                .lock()
                .expect("rows lock")
                .iter()
                .filter(|row| (self.matches)(row, filter))
                .cloned()
                .collect())
        }

        fn create(&self, request: &E::Request) -> Result<E> {
            self.record("create".to_owned());
            if *self.fail_create.lock().expect("fail lock") {
                bail!("POST /fake failed: 500");
            }
            let mut next_id = self.next_id.lock().expect("id lock");
            let row = (self.build)(E::Id::from(*next_id), request);
            *next_id += 1;
            self.rows.lock().expect("rows lock").push(row.clone());
            Ok(row)
        }

        fn update(&self, id: E::Id, request: &E::Request) -> Result<E> {
            self.record(format!("update {id}"));
            if *self.fail_update.lock().expect("fail lock") {
                bail!("PUT /fake/{id} failed: 500");
            }
            Ok((self.build)(id, request))
        }

        fn delete(&self, id: E::Id) -> Result<()> {
            self.record(format!("delete {id}"));
            if *self.fail_delete.lock().expect("fail lock") {
                bail!("DELETE /fake/{id} failed: 409");
            }
            self.rows
                .lock()
                .expect("rows lock")
                .retain(|row| row.id() != id);
            Ok(())
        }

        fn assign_relation(&self, id: E::Id, related: i64) -> Result<()> {
            self.record(format!("assign {id} {related}"));
            Ok(())
        }
    }

    struct NoReferences;

    impl ReferenceSource for NoReferences {
        fn reference_labels(&self, _kind: EntityKind) -> Result<Vec<(i64, String)>> {
            Ok(Vec::new())
        }
    }

    struct BrokenReferences;

    impl ReferenceSource for BrokenReferences {
        fn reference_labels(&self, kind: EntityKind) -> Result<Vec<(i64, String)>> {
            bail!("GET {} failed: 500", kind.collection_path())
        }
    }

    fn city(id: i64, name: &str) -> City {
        City {
            id: CityId::new(id),
            name: name.to_owned(),
            state: "NL".to_owned(),
            population: 1000,
        }
    }

    /// The server normalizes names to upper case so tests can tell its
    /// object apart from the request.
    fn build_city(id: CityId, request: &<City as Entity>::Request) -> City {
        City {
            id,
            name: request.name.to_uppercase(),
            state: request.state.clone(),
            population: request.population,
        }
    }

    fn no_filter<E: Entity>(_row: &E, _filter: &E::Filter) -> bool {
        true
    }

    fn cities() -> FakeResource<City> {
        FakeResource::new(
            vec![city(1, "Gander"), city(2, "Halifax"), city(3, "Toronto")],
            build_city,
            no_filter::<City>,
        )
    }

    fn ids(rows: &[City]) -> Vec<i64> {
        rows.iter().map(|row| row.id.get()).collect()
    }

    #[test]
    fn load_on_empty_collection_has_no_rows_and_no_error() {
        let resource = FakeResource::new(Vec::new(), build_city, no_filter::<City>);
        let mut table = TableController::new(&resource, NoReferences);
        assert!(table.load());
        assert!(table.rows().is_empty());
        assert_eq!(table.error(), None);
        assert!(!table.loading());
    }

    #[test]
    fn begin_load_is_visible_until_the_fetch_completes() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.create_form_mut().set("state", "NL");
        assert!(!table.create());
        assert!(table.error().is_some());

        table.begin_load();
        assert!(table.loading());
        assert_eq!(table.error(), None);
        assert!(resource.calls().is_empty());

        assert!(table.load());
        assert!(!table.loading());
        assert_eq!(table.rows().len(), 3);
    }

    #[test]
    fn failure_after_begin_load_ends_loading() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.begin_load();
        assert!(!table.apply_filter("anything"));
        assert!(!table.loading());
        assert!(table.error().is_some());
    }

    #[test]
    fn failed_load_clears_rows_and_sets_error() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        assert!(table.load());
        assert_eq!(table.rows().len(), 3);

        *resource.fail_list.lock().expect("fail lock") = true;
        assert!(!table.load());
        assert!(table.rows().is_empty());
        assert_eq!(table.error(), Some("GET /fake failed: 503"));
        assert!(!table.loading());
    }

    #[test]
    fn reference_failure_fails_the_joined_load() {
        let resource = FakeResource::new(
            Vec::<Gate>::new(),
            |id, request| Gate {
                id,
                gate_number: request.gate_number.clone(),
                terminal: request.terminal.clone(),
                departure_gate: request.departure_gate,
                airport: Some(request.airport),
                aircraft: request.aircraft.flatten(),
            },
            no_filter::<Gate>,
        );
        let mut table = TableController::new(&resource, BrokenReferences);
        assert!(!table.load());
        assert!(table.error().is_some_and(|error| error.contains("500")));
    }

    #[test]
    fn create_prepends_server_object() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.load();

        table.create_form_mut().set("name", "St. John's");
        table.create_form_mut().set("state", "NL");
        table.create_form_mut().set("population", "abc");
        assert!(table.create());

        let first = &table.rows()[0];
        assert_eq!(first.id, CityId::new(100));
        assert_eq!(first.name, "ST. JOHN'S");
        assert_eq!(first.population, 0);
        assert_eq!(ids(table.rows()), vec![100, 1, 2, 3]);
        assert_eq!(table.create_form(), &FormValues::new());
    }

    #[test]
    fn failed_create_request_leaves_rows_and_form() {
        let resource = cities();
        *resource.fail_create.lock().expect("fail lock") = true;
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        let before = table.rows().to_vec();

        table.create_form_mut().set("name", "Moncton");
        table.create_form_mut().set("state", "NB");
        assert!(!table.create());

        assert_eq!(table.rows(), before.as_slice());
        assert_eq!(table.error(), Some("POST /fake failed: 500"));
        assert_eq!(table.create_form().get("name"), "Moncton");
        assert_eq!(table.create_form().get("state"), "NB");
        assert_eq!(resource.calls(), vec!["list".to_owned(), "create".to_owned()]);
    }

    #[test]
    fn invalid_create_issues_no_request() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.create_form_mut().set("state", "NL");
        assert!(!table.create());
        assert!(
            table
                .error()
                .is_some_and(|error| error.contains("city name is required"))
        );
        assert!(resource.calls().is_empty());
    }

    #[test]
    fn flight_without_airline_is_rejected_locally() {
        let resource = FakeResource::new(
            Vec::<Flight>::new(),
            |_, _| unreachable!("no request expected"),
            no_filter::<Flight>,
        );
        let mut table = TableController::new(&resource, NoReferences);
        let form = table.create_form_mut();
        form.set("flightNumber", "AC1");
        form.set("aircraftId", "2");
        form.set("departureAirportId", "3");
        form.set("arrivalAirportId", "4");
        form.set("scheduledDeparture", "2025-08-15T10:00");
        form.set("scheduledArrival", "2025-08-15T11:00");
        assert!(!table.create());
        assert!(
            table
                .error()
                .is_some_and(|error| error.contains("flight airline is required"))
        );
        assert!(resource.calls().is_empty());
    }

    #[test]
    fn save_edit_replaces_only_matching_row() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        let before = table.rows().to_vec();

        assert!(table.begin_edit(CityId::new(2)));
        if let Some(buffer) = table.edit_buffer_mut() {
            buffer.set("name", "Dartmouth");
        }
        assert!(table.save_edit());

        assert_eq!(table.editing_id(), None);
        assert_eq!(ids(table.rows()), vec![1, 2, 3]);
        assert_eq!(table.rows()[1].name, "DARTMOUTH");
        assert_eq!(table.rows()[0], before[0]);
        assert_eq!(table.rows()[2], before[2]);
    }

    #[test]
    fn failed_save_keeps_edit_buffer() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        table.begin_edit(CityId::new(1));
        if let Some(buffer) = table.edit_buffer_mut() {
            buffer.set("name", "");
        }
        assert!(!table.save_edit());
        assert_eq!(table.editing_id(), Some(CityId::new(1)));
        assert!(table.error().is_some());
        assert!(!resource.calls().iter().any(|call| call.starts_with("update")));
    }

    #[test]
    fn failed_update_request_keeps_edit_buffer() {
        let resource = cities();
        *resource.fail_update.lock().expect("fail lock") = true;
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        let before = table.rows().to_vec();

        table.begin_edit(CityId::new(2));
        if let Some(buffer) = table.edit_buffer_mut() {
            buffer.set("name", "Dartmouth");
        }
        assert!(!table.save_edit());

        assert_eq!(table.editing_id(), Some(CityId::new(2)));
        assert_eq!(
            table.edit_buffer_mut().map(|buffer| buffer.get("name").to_owned()),
            Some("Dartmouth".to_owned())
        );
        assert_eq!(table.error(), Some("PUT /fake/2 failed: 500"));
        assert_eq!(table.rows(), before.as_slice());
        assert_eq!(resource.calls().last().map(String::as_str), Some("update 2"));
    }

    #[test]
    fn begin_edit_clears_stale_error() {
        let resource = cities();
        *resource.fail_delete.lock().expect("fail lock") = true;
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        assert!(!table.delete(CityId::new(1), |_| true));
        assert!(table.error().is_some());

        assert!(table.begin_edit(CityId::new(1)));
        assert_eq!(table.error(), None);
    }

    #[test]
    fn beginning_second_edit_abandons_first() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.load();

        table.begin_edit(CityId::new(1));
        if let Some(buffer) = table.edit_buffer_mut() {
            buffer.set("name", "unsaved");
        }
        table.begin_edit(CityId::new(3));

        assert_eq!(table.editing_id(), Some(CityId::new(3)));
        assert_eq!(
            table.edit_buffer_mut().map(|buffer| buffer.get("name").to_owned()),
            Some("Toronto".to_owned())
        );
        assert_eq!(table.rows()[0].name, "Gander");
        assert_eq!(table.editing_row(), Some(2));

        table.cancel_edit();
        assert_eq!(table.editing_id(), None);
    }

    #[test]
    fn declined_delete_issues_no_request() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        let mut prompt = String::new();
        assert!(!table.delete(CityId::new(2), |text| {
            prompt = text.to_owned();
            false
        }));
        assert_eq!(prompt, "delete city Halifax, NL?");
        assert_eq!(table.rows().len(), 3);
        assert_eq!(resource.calls(), vec!["list".to_owned()]);
    }

    #[test]
    fn failed_delete_can_be_retried() {
        let resource = cities();
        *resource.fail_delete.lock().expect("fail lock") = true;
        let mut table = TableController::new(&resource, NoReferences);
        table.load();

        assert!(!table.delete(CityId::new(2), |_| true));
        assert_eq!(ids(table.rows()), vec![1, 2, 3]);
        assert!(table.error().is_some_and(|error| {
            error.contains("409") && error.contains("may still be referenced elsewhere")
        }));

        *resource.fail_delete.lock().expect("fail lock") = false;
        assert!(table.delete(CityId::new(2), |_| true));
        assert_eq!(ids(table.rows()), vec![1, 3]);
        assert_eq!(table.error(), None);
    }

    fn gate(id: i64, airport: i64, departure: bool) -> Gate {
        Gate {
            id: GateId::new(id),
            gate_number: format!("G{id}"),
            terminal: "T1".to_owned(),
            departure_gate: departure,
            airport: Some(Reference::new(AirportId::new(airport))),
            aircraft: None,
        }
    }

    fn gate_matches(row: &Gate, filter: &GateFilter) -> bool {
        let airport = row.airport.map(|reference| reference.id);
        match *filter {
            GateFilter::Airport(id) => airport == Some(id),
            GateFilter::AirportAndType { airport: id, departure } => {
                airport == Some(id) && row.departure_gate == departure
            }
        }
    }

    #[test]
    fn gate_filter_issues_narrow_request() {
        let resource = FakeResource::new(
            vec![gate(1, 3, true), gate(2, 3, false), gate(3, 4, true)],
            |_, _| unreachable!("no create expected"),
            gate_matches,
        );
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        assert_eq!(table.rows().len(), 3);

        assert!(table.apply_filter("3 departure"));
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].id, GateId::new(1));
        assert_eq!(
            resource.calls(),
            vec![
                "list".to_owned(),
                "filtered AirportAndType { airport: AirportId(3), departure: true }".to_owned(),
            ]
        );

        assert!(table.apply_filter(""));
        assert_eq!(table.rows().len(), 3);
        assert_eq!(resource.calls().last().map(String::as_str), Some("list"));
    }

    #[test]
    fn typed_filter_load_matches_airport_only() {
        let resource = FakeResource::new(
            vec![gate(1, 3, true), gate(2, 3, false), gate(3, 4, true)],
            |_, _| unreachable!("no create expected"),
            gate_matches,
        );
        let mut table = TableController::new(&resource, NoReferences);

        let filter = GateFilter::Airport(AirportId::new(3));
        assert!(table.load_filtered(Some(&filter)));
        let ids: Vec<GateId> = table.rows().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![GateId::new(1), GateId::new(2)]);

        assert!(table.load_filtered(None));
        assert_eq!(table.rows().len(), 3);
        assert_eq!(
            resource.calls(),
            vec![
                "filtered Airport(AirportId(3))".to_owned(),
                "list".to_owned(),
            ]
        );
    }

    #[test]
    fn bad_filter_sets_error_without_request() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        assert!(!table.apply_filter("anything"));
        assert!(table.error().is_some());
        assert!(resource.calls().is_empty());
    }

    #[test]
    fn assign_reloads_after_success() {
        let resource = FakeResource::new(
            vec![Aircraft {
                id: AircraftId::new(7),
                aircraft_type: "Dash 8".to_owned(),
                number_of_passengers: 78,
                airports: Vec::new(),
            }],
            |_, _| unreachable!("no create expected"),
            no_filter::<Aircraft>,
        );
        let mut table = TableController::new(&resource, NoReferences);
        table.load();
        assert!(table.assign_at(0, "3"));
        assert_eq!(
            resource.calls(),
            vec!["list".to_owned(), "assign 7 3".to_owned(), "list".to_owned()]
        );

        assert!(!table.assign_at(0, "three"));
        assert!(
            table
                .error()
                .is_some_and(|error| error.contains("airport id"))
        );
    }

    #[test]
    fn screen_view_addresses_rows_by_position() {
        let resource = cities();
        let mut table = TableController::new(&resource, NoReferences);
        let screen: &mut dyn TableScreen = &mut table;
        assert!(screen.load());
        assert_eq!(screen.row_count(), 3);
        assert_eq!(
            screen.summary().as_deref(),
            Some("Total cities: 3 · Total population: 3,000")
        );
        assert_eq!(screen.cells()[1][1], "Halifax");
        assert!(screen.begin_edit_at(1));
        assert_eq!(screen.editing_row(), Some(1));
        assert_eq!(
            screen.form(SubmitMode::Update).map(|values| values.get("name")),
            Some("Halifax")
        );
        assert!(screen.delete_at(0, &mut |_| true));
        assert_eq!(screen.row_count(), 2);
        assert!(!screen.begin_edit_at(9));
    }

    #[test]
    fn optional_reference_choices_start_with_empty_option() {
        let mut index = ReferenceIndex::new();
        index.insert(EntityKind::Gate, vec![(4, "A4 (T1)".to_owned())]);
        let choices = field_choices(FieldKind::OptionalReference(EntityKind::Gate), &index);
        assert_eq!(
            choices,
            vec![
                (String::new(), "—".to_owned()),
                ("4".to_owned(), "A4 (T1)".to_owned()),
            ]
        );
        assert_eq!(field_choices(FieldKind::Status, &index).len(), 6);
        assert!(field_choices(FieldKind::Text, &index).is_empty());
    }
}
