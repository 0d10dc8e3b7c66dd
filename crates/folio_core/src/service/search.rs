//! Search criteria and filter construction.
//!
//! # Responsibility
//! - Turn per-field search terms into an OR-combined store filter.
//! - Keep literal terms away from the store's pattern engine.
//!
//! # Invariants
//! - Blank terms are ignored; no effective term means "all records".
//! - Literal terms match as substrings of any length and never fail.
//! - Only raw patterns can produce `InvalidQuery`.
//! - Only fields declared searchable on the kind are accepted.

use crate::model::kind::RecordKind;
use crate::service::{ServiceError, ServiceResult};
use crate::store::Filter;
use regex::RegexBuilder;
use std::collections::BTreeMap;

/// Upper bound for one compiled raw pattern.
const PATTERN_SIZE_LIMIT_BYTES: usize = 256 * 1024;

/// Per-field search terms for [`crate::service::record_service::RecordService::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    terms: BTreeMap<String, String>,
    raw_pattern: bool,
    ignore_case: bool,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term for `field`, replacing any previous term for it.
    pub fn term(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.terms.insert(field.into(), text.into());
        self
    }

    /// Treats every term as a regex instead of literal text.
    ///
    /// Off by default, so user text always matches literally.
    pub fn raw_pattern(mut self, enabled: bool) -> Self {
        self.raw_pattern = enabled;
        self
    }

    pub fn ignore_case(mut self, enabled: bool) -> Self {
        self.ignore_case = enabled;
        self
    }

    /// Whether no non-blank term is present.
    pub fn is_empty(&self) -> bool {
        self.effective_terms().next().is_none()
    }

    fn effective_terms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms
            .iter()
            .map(|(field, text)| (field.as_str(), text.trim()))
            .filter(|(_, text)| !text.is_empty())
    }
}

/// Builds the store filter for `criteria` on `kind`.
///
/// # Errors
/// - `Validation` when a term targets a non-searchable field.
/// - `InvalidQuery` when a raw pattern does not compile.
pub fn build_search_filter(kind: &RecordKind, criteria: &SearchCriteria) -> ServiceResult<Filter> {
    if let Some(field) = criteria
        .terms
        .keys()
        .find(|field| !kind.is_searchable(field))
    {
        return Err(ServiceError::Validation(format!(
            "field `{field}` is not searchable on {}",
            kind.name
        )));
    }

    let mut clauses = Vec::new();
    for (field, text) in criteria.effective_terms() {
        if !criteria.raw_pattern {
            clauses.push(Filter::contains(field, text, criteria.ignore_case));
            continue;
        }
        let pattern = RegexBuilder::new(text)
            .case_insensitive(criteria.ignore_case)
            .size_limit(PATTERN_SIZE_LIMIT_BYTES)
            .build()
            .map_err(|err| ServiceError::InvalidQuery {
                pattern: text.to_string(),
                message: err.to_string(),
            })?;
        clauses.push(Filter::pattern(field, pattern));
    }

    Ok(match clauses.len() {
        0 => Filter::All,
        1 => clauses.remove(0),
        _ => Filter::Or(clauses),
    })
}
