//! Record use-case services.
//!
//! # Responsibility
//! - Enforce field policy, ownership and search escaping above the model.
//! - Construct every entity service once and hand them out by reference.
//! - Keep callers (HTTP layer, CLI) decoupled from storage details.
//!
//! # Invariants
//! - Policy violations fail before any write reaches the store.
//! - Store failures propagate unchanged except `NotFound`/`DuplicateKey`,
//!   which are lifted to their service counterparts.

use crate::model::record::RecordId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod policy;
pub mod portfolio_service;
pub mod record_service;
pub mod registry;
pub mod search;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for record use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Payload shape rejected: missing, unknown or empty fields.
    Validation(String),
    /// Caller may not perform this change.
    Forbidden(String),
    /// Target record does not exist.
    NotFound { kind: &'static str, id: RecordId },
    /// Value collides with an existing record.
    DuplicateKey {
        kind: &'static str,
        field: String,
        value: String,
    },
    /// Caller-supplied raw pattern cannot be compiled.
    InvalidQuery { pattern: String, message: String },
    /// Persistence-layer failure.
    Store(StoreError),
}

impl ServiceError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::InvalidQuery { .. } => "invalid_query",
            Self::Store(_) => "store",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::Forbidden(message) => write!(f, "forbidden: {message}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DuplicateKey { kind, field, value } => {
                write!(f, "{kind} with {field} `{value}` already exists")
            }
            Self::InvalidQuery { pattern, message } => {
                write!(f, "invalid search pattern `{pattern}`: {message}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
