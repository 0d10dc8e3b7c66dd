//! Generic CRUD model over a record store.
//!
//! A `Model` is bound to one collection and forwards every call to the
//! store unchanged. Field policy lives in the service layer.

use crate::model::record::{Patch, Record};
use crate::store::{Filter, RecordStore, StoreResult};

/// Policy-free CRUD wrapper bound to one collection.
pub struct Model<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Model<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn collection(&self) -> &'static str {
        self.store.collection()
    }

    /// Persists `record` as given.
    pub fn create(&self, record: &Record) -> StoreResult<Record> {
        self.store.create(record)
    }

    /// Returns the first record matching `filter`.
    pub fn find(&self, filter: &Filter) -> StoreResult<Option<Record>> {
        self.store.find_one(filter)
    }

    /// Returns every match; `None` means the whole collection.
    pub fn find_all(&self, filter: Option<&Filter>) -> StoreResult<Vec<Record>> {
        self.store.find(filter.unwrap_or(&Filter::All))
    }

    /// Applies `patch` to record `id` and returns the post-update record.
    ///
    /// Fails with `NotFound` when no record has that id.
    pub fn update(&self, id: &str, patch: &Patch) -> StoreResult<Record> {
        self.store.find_one_and_update(&Filter::by_id(id), patch)
    }

    /// Removes record `id` and returns it.
    ///
    /// Fails with `NotFound` when no record has that id.
    pub fn delete(&self, id: &str) -> StoreResult<Record> {
        self.store.find_one_and_delete(&Filter::by_id(id))
    }

    /// Shorthand for `find(Filter::by_id(id))`.
    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Record>> {
        self.find(&Filter::by_id(id))
    }
}

