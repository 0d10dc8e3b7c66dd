//! Record and patch value types.
//!
//! # Responsibility
//! - Define the flat document shape shared by every collection.
//! - Define the typed patch applied by updates.
//!
//! # Invariants
//! - `id` lives outside `fields`; a `fields` map never carries an `id` key.
//! - All persisted values are strings.
//! - Serialized form is one flat JSON object: `{"id": .., "<field>": ..}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Application-assigned record identifier.
///
/// Opaque to every layer below the service; generated as a UUID v4 string.
pub type RecordId = String;

/// Name of the identifier field inside a persisted document.
pub const ID_FIELD: &str = "id";

/// Field name → value map used for create payloads and record bodies.
pub type Fields = BTreeMap<String, String>;

/// One persisted entity instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable application identifier, never reassigned.
    pub id: RecordId,
    /// Every other field, including the owner reference for subrecords.
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Builds a record with a caller-provided id.
    pub fn with_id(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Generates a fresh globally-unique record id.
    pub fn generate_id() -> RecordId {
        Uuid::new_v4().to_string()
    }

    /// Returns a field value, resolving `id` to the record identifier.
    pub fn get(&self, field: &str) -> Option<&str> {
        if field == ID_FIELD {
            return Some(self.id.as_str());
        }
        self.fields.get(field).map(String::as_str)
    }
}

/// Typed set of field changes applied by an update.
///
/// `Some(value)` assigns, `None` clears the field. When the same field is
/// set more than once, the last change wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    changes: BTreeMap<String, Option<String>>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a patch from `(field, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |patch, (field, value)| patch.set(field, value))
    }

    /// Assigns `value` to `field`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.changes.insert(field.into(), Some(value.into()));
        self
    }

    /// Removes `field` from the record.
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.changes.insert(field.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.changes.contains_key(field)
    }

    /// Iterates targeted field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    /// Iterates changes in sorted field order.
    pub fn changes(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.changes
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_deref()))
    }

    /// Applies every change to `record` in place.
    ///
    /// Callers must reject patches targeting `id` beforehand.
    pub fn apply_to(&self, record: &mut Record) {
        for (field, value) in &self.changes {
            match value {
                Some(value) => {
                    record.fields.insert(field.clone(), value.clone());
                }
                None => {
                    record.fields.remove(field);
                }
            }
        }
    }
}
