//! Record store adapter contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the document-collection interface the model layer consumes.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Records are addressed by their application `id`, never the native key.
//! - `find`/`find_one` report zero matches as empty/`None`, not as errors.
//! - `find_one_and_update`/`find_one_and_delete` report zero matches as
//!   `NotFound`.

use crate::db::DbError;
use crate::model::record::{Patch, Record, RecordId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod filter;
mod sqlite;

pub use filter::Filter;
pub use sqlite::SqliteCollection;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for record store operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Record or patch shape rejected by the store itself.
    Validation(String),
    NotFound {
        collection: &'static str,
        filter: String,
    },
    DuplicateKey {
        collection: &'static str,
        id: RecordId,
    },
    /// Persisted document could not be decoded.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(message) => write!(f, "invalid record: {message}"),
            Self::NotFound { collection, filter } => {
                write!(f, "no record in `{collection}` matches {filter}")
            }
            Self::DuplicateKey { collection, id } => {
                write!(f, "record `{id}` already exists in `{collection}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document collection consumed by [`crate::model::base::Model`].
///
/// One implementation instance is bound to exactly one collection.
pub trait RecordStore {
    /// Name of the bound collection.
    fn collection(&self) -> &'static str;
    fn create(&self, record: &Record) -> StoreResult<Record>;
    fn find_one(&self, filter: &Filter) -> StoreResult<Option<Record>>;
    fn find(&self, filter: &Filter) -> StoreResult<Vec<Record>>;
    /// Applies `patch` to the first match and returns the updated record.
    fn find_one_and_update(&self, filter: &Filter, patch: &Patch) -> StoreResult<Record>;
    /// Removes the first match and returns it.
    fn find_one_and_delete(&self, filter: &Filter) -> StoreResult<Record>;
}
