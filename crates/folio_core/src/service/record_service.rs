//! Generic record service parameterised by a record-kind descriptor.
//!
//! # Responsibility
//! - Apply the kind's field policy before delegating to the model.
//! - Resolve and enforce owner references for subrecords.
//! - Provide literal-safe search over the kind's searchable fields.
//!
//! # Invariants
//! - Record ids are assigned here, once, and never by callers.
//! - Read misses return `None`/empty; write misses return `NotFound`.
//! - A supplied caller identity must own a record before it is deleted.

use crate::model::base::Model;
use crate::model::kind::RecordKind;
use crate::model::record::{Fields, Patch, Record, ID_FIELD};
use crate::service::policy::{check_new_record, check_patch};
use crate::service::search::{build_search_filter, SearchCriteria};
use crate::service::{ServiceError, ServiceResult};
use crate::store::{Filter, RecordStore, StoreError};
use log::{debug, info, warn};
use std::time::Instant;

/// Record use-case service for one entity kind.
pub struct RecordService<S: RecordStore> {
    kind: &'static RecordKind,
    model: Model<S>,
    /// Model of the owner's kind; present exactly for subrecord kinds.
    parent: Option<Model<S>>,
}

impl<S: RecordStore> RecordService<S> {
    /// Creates a service for `kind`.
    ///
    /// # Errors
    /// - `Validation` when `model`/`parent` are bound to collections that do
    ///   not match the descriptor.
    pub fn new(
        kind: &'static RecordKind,
        model: Model<S>,
        parent: Option<Model<S>>,
    ) -> ServiceResult<Self> {
        if model.collection() != kind.collection {
            return Err(ServiceError::Validation(format!(
                "{} service bound to collection `{}`, expected `{}`",
                kind.name,
                model.collection(),
                kind.collection
            )));
        }

        match (kind.owner, parent.as_ref()) {
            (Some(owner), Some(parent)) if parent.collection() == owner.parent.collection => {}
            (None, None) => {}
            _ => {
                return Err(ServiceError::Validation(format!(
                    "{} service parent binding does not match its owner reference",
                    kind.name
                )));
            }
        }

        Ok(Self {
            kind,
            model,
            parent,
        })
    }

    pub fn kind(&self) -> &'static RecordKind {
        self.kind
    }

    /// Validates `fields`, assigns a fresh id and persists the record.
    ///
    /// # Errors
    /// - `Validation` for unknown/missing fields or a dangling owner.
    /// - `DuplicateKey` when a unique field value is taken.
    pub fn create(&self, fields: Fields) -> ServiceResult<Record> {
        let started_at = Instant::now();
        let result = self.create_inner(fields);
        self.log_write("record_create", started_at, &result);
        result
    }

    fn create_inner(&self, fields: Fields) -> ServiceResult<Record> {
        check_new_record(self.kind, &fields)?;
        self.ensure_owner_exists(&fields)?;
        self.ensure_unique(&fields)?;

        let record = Record::with_id(Record::generate_id(), fields);
        self.model
            .create(&record)
            .map_err(|err| self.lift(err, &record.id))
    }

    /// Gets one record by id.
    pub fn get(&self, id: &str) -> ServiceResult<Option<Record>> {
        Ok(self.model.find_by_id(id)?)
    }

    /// Lists records matching `filter`, or all of them.
    pub fn get_all(&self, filter: Option<&Filter>) -> ServiceResult<Vec<Record>> {
        Ok(self.model.find_all(filter)?)
    }

    /// Resolves the owner record of subrecord `id`.
    ///
    /// # Errors
    /// - `NotFound` when the record or its parent is missing.
    /// - `Validation` for kinds without an owner reference.
    pub fn get_parent(&self, id: &str) -> ServiceResult<Record> {
        let (owner, parent) = match (self.kind.owner, self.parent.as_ref()) {
            (Some(owner), Some(parent)) => (owner, parent),
            _ => {
                return Err(ServiceError::Validation(format!(
                    "{} records have no owner",
                    self.kind.name
                )));
            }
        };

        let record = self.require(id)?;
        let parent_id = record.get(owner.field).ok_or_else(|| {
            ServiceError::Store(StoreError::InvalidData(format!(
                "{} `{id}` lacks owner field `{}`",
                self.kind.name, owner.field
            )))
        })?;

        parent
            .find_by_id(parent_id)?
            .ok_or_else(|| ServiceError::NotFound {
                kind: owner.parent.name,
                id: parent_id.to_string(),
            })
    }

    /// Applies `patch` to record `id` and returns the updated record.
    ///
    /// # Errors
    /// - `Forbidden` when the patch targets a non-settable field or the owner.
    /// - `Validation` for an empty patch or a cleared required field.
    /// - `NotFound` when no record has that id.
    pub fn update(&self, id: &str, patch: &Patch) -> ServiceResult<Record> {
        let started_at = Instant::now();
        let result = check_patch(self.kind, patch).and_then(|()| {
            self.model
                .update(id, patch)
                .map_err(|err| self.lift(err, id))
        });
        self.log_write("record_update", started_at, &result);
        result
    }

    /// Deletes record `id`, optionally checking that `current_user_id` owns it.
    ///
    /// For top-level kinds the record owns itself.
    ///
    /// # Errors
    /// - `NotFound` when no record has that id.
    /// - `Forbidden` when `current_user_id` is not the owner.
    pub fn del(&self, id: &str, current_user_id: Option<&str>) -> ServiceResult<Record> {
        let started_at = Instant::now();
        let result = self.del_inner(id, current_user_id);
        self.log_write("record_delete", started_at, &result);
        result
    }

    fn del_inner(&self, id: &str, current_user_id: Option<&str>) -> ServiceResult<Record> {
        let record = self.require(id)?;

        if let Some(current_user_id) = current_user_id {
            let owner_field = self.kind.owner_field().unwrap_or(ID_FIELD);
            if record.get(owner_field) != Some(current_user_id) {
                return Err(ServiceError::Forbidden(format!(
                    "`{current_user_id}` does not own {} `{id}`",
                    self.kind.name
                )));
            }
        }

        self.model.delete(id).map_err(|err| self.lift(err, id))
    }

    /// Searches the kind's searchable fields; terms are OR-combined.
    pub fn search(&self, criteria: &SearchCriteria) -> ServiceResult<Vec<Record>> {
        let filter = build_search_filter(self.kind, criteria)?;
        debug!(
            "event=record_search module=service kind={} filter={}",
            self.kind.name, filter
        );
        Ok(self.model.find_all(Some(&filter))?)
    }

    /// Lists every subrecord owned by `owner_id`.
    pub fn list_by_owner(&self, owner_id: &str) -> ServiceResult<Vec<Record>> {
        let owner_field = self.kind.owner_field().ok_or_else(|| {
            ServiceError::Validation(format!("{} records have no owner", self.kind.name))
        })?;
        Ok(self
            .model
            .find_all(Some(&Filter::eq(owner_field, owner_id)))?)
    }

    /// Gets the first record whose `field` equals `value` exactly.
    pub fn find_by(&self, field: &str, value: &str) -> ServiceResult<Option<Record>> {
        if field != ID_FIELD && !self.kind.is_declared(field) {
            return Err(ServiceError::Validation(format!(
                "unknown field for {}: {field}",
                self.kind.name
            )));
        }
        Ok(self.model.find(&Filter::eq(field, value))?)
    }

    fn require(&self, id: &str) -> ServiceResult<Record> {
        self.model
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound {
                kind: self.kind.name,
                id: id.to_string(),
            })
    }

    fn ensure_owner_exists(&self, fields: &Fields) -> ServiceResult<()> {
        let (Some(owner), Some(parent)) = (self.kind.owner, self.parent.as_ref()) else {
            return Ok(());
        };
        let owner_id = fields.get(owner.field).map(String::as_str).unwrap_or("");
        if parent.find_by_id(owner_id)?.is_none() {
            return Err(ServiceError::Validation(format!(
                "`{}` = `{owner_id}` does not reference an existing {}",
                owner.field, owner.parent.name
            )));
        }
        Ok(())
    }

    // Check-then-insert; a concurrent create can still slip past.
    fn ensure_unique(&self, fields: &Fields) -> ServiceResult<()> {
        for field in self.kind.unique {
            let Some(value) = fields.get(*field) else {
                continue;
            };
            if self.model.find(&Filter::eq(*field, value.as_str()))?.is_some() {
                return Err(ServiceError::DuplicateKey {
                    kind: self.kind.name,
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    fn lift(&self, err: StoreError, id: &str) -> ServiceError {
        match err {
            StoreError::NotFound { .. } => ServiceError::NotFound {
                kind: self.kind.name,
                id: id.to_string(),
            },
            StoreError::DuplicateKey { id, .. } => ServiceError::DuplicateKey {
                kind: self.kind.name,
                field: ID_FIELD.to_string(),
                value: id,
            },
            other => ServiceError::Store(other),
        }
    }

    fn log_write(&self, event: &str, started_at: Instant, result: &ServiceResult<Record>) {
        let duration_ms = started_at.elapsed().as_millis();
        match result {
            Ok(record) => info!(
                "event={} module=service kind={} status=ok id={} duration_ms={}",
                event, self.kind.name, record.id, duration_ms
            ),
            Err(err @ ServiceError::Store(_)) => warn!(
                "event={} module=service kind={} status=error duration_ms={} error_code={} error={}",
                event,
                self.kind.name,
                duration_ms,
                err.code(),
                err
            ),
            Err(err) => info!(
                "event={} module=service kind={} status=rejected duration_ms={} error_code={}",
                event,
                self.kind.name,
                duration_ms,
                err.code()
            ),
        }
    }
}
