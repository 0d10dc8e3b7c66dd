//! Field policy checks for create payloads and update patches.
//!
//! # Invariants
//! - Create accepts only owner ∪ required ∪ optional fields, never `id`.
//! - Mandatory fields (owner + required) must be non-blank on create.
//! - Update accepts only settable fields; owner and `id` are immutable.
//! - Update may not blank or unset a required field.

use crate::model::kind::RecordKind;
use crate::model::record::{Fields, Patch, ID_FIELD};
use crate::service::{ServiceError, ServiceResult};

/// Validates a create payload against `kind`.
pub fn check_new_record(kind: &RecordKind, fields: &Fields) -> ServiceResult<()> {
    if fields.contains_key(ID_FIELD) {
        return Err(ServiceError::Validation(format!(
            "`{ID_FIELD}` is assigned by the {} service",
            kind.name
        )));
    }

    let unknown = fields
        .keys()
        .map(String::as_str)
        .filter(|field| !kind.is_declared(field))
        .collect::<Vec<_>>();
    if !unknown.is_empty() {
        return Err(ServiceError::Validation(format!(
            "unknown field(s) for {}: {}",
            kind.name,
            unknown.join(", ")
        )));
    }

    let missing = kind
        .mandatory_fields()
        .filter(|field| is_blank(fields.get(*field).map(String::as_str)))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ServiceError::Validation(format!(
            "missing required field(s) for {}: {}",
            kind.name,
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Validates an update patch against `kind`.
pub fn check_patch(kind: &RecordKind, patch: &Patch) -> ServiceResult<()> {
    if patch.is_empty() {
        return Err(ServiceError::Validation(format!(
            "{} update carries no changes",
            kind.name
        )));
    }

    if let Some(owner_field) = kind.owner_field().filter(|field| patch.contains(field)) {
        return Err(ServiceError::Forbidden(format!(
            "owner reference `{owner_field}` of {} is immutable",
            kind.name
        )));
    }
    if patch.contains(ID_FIELD) {
        return Err(ServiceError::Forbidden(format!(
            "`{ID_FIELD}` of {} is immutable",
            kind.name
        )));
    }

    let not_settable = patch
        .fields()
        .filter(|field| !kind.is_settable(field))
        .collect::<Vec<_>>();
    if !not_settable.is_empty() {
        return Err(ServiceError::Forbidden(format!(
            "field(s) not settable on {}: {}",
            kind.name,
            not_settable.join(", ")
        )));
    }

    if let Some((field, _)) = patch
        .changes()
        .find(|(field, value)| kind.is_required(field) && is_blank(*value))
    {
        return Err(ServiceError::Validation(format!(
            "required field `{field}` of {} cannot be cleared",
            kind.name
        )));
    }

    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}
