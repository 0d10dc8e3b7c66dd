//! Store query filters.
//!
//! # Invariants
//! - `Or([])` matches nothing, `And([])` matches everything.
//! - A missing field never matches `Eq`, `Contains` or `Pattern`.
//! - `Contains` is a plain substring test with no size limit.
//! - `Pattern` applies the regex as-is; escaping literal input is the
//!   caller's job.

use crate::model::record::{Record, ID_FIELD};
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Predicate over records of one collection.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Every record.
    All,
    /// Exact field equality.
    Eq { field: String, value: String },
    /// Literal substring match against a field value.
    Contains {
        field: String,
        needle: String,
        ignore_case: bool,
    },
    /// Unanchored regex match against a field value.
    Pattern { field: String, pattern: Regex },
    /// At least one clause matches.
    Or(Vec<Filter>),
    /// Every clause matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, id)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(
        field: impl Into<String>,
        needle: impl Into<String>,
        ignore_case: bool,
    ) -> Self {
        let needle = needle.into();
        Self::Contains {
            field: field.into(),
            needle: if ignore_case {
                needle.to_lowercase()
            } else {
                needle
            },
            ignore_case,
        }
    }

    pub fn pattern(field: impl Into<String>, pattern: Regex) -> Self {
        Self::Pattern {
            field: field.into(),
            pattern,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => record.get(field) == Some(value.as_str()),
            Self::Contains {
                field,
                needle,
                ignore_case,
            } => record.get(field).is_some_and(|value| {
                if *ignore_case {
                    value.to_lowercase().contains(needle.as_str())
                } else {
                    value.contains(needle.as_str())
                }
            }),
            Self::Pattern { field, pattern } => record
                .get(field)
                .is_some_and(|value| pattern.is_match(value)),
            Self::Or(clauses) => clauses.iter().any(|clause| clause.matches(record)),
            Self::And(clauses) => clauses.iter().all(|clause| clause.matches(record)),
        }
    }

    /// Returns the id this filter pins, if any.
    ///
    /// Stores use it to narrow scans through the id index.
    pub fn pinned_id(&self) -> Option<&str> {
        match self {
            Self::Eq { field, value } if field == ID_FIELD => Some(value.as_str()),
            Self::And(clauses) => clauses.iter().find_map(Filter::pinned_id),
            _ => None,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Eq { field, value } => write!(f, "{field} = {value:?}"),
            Self::Contains {
                field,
                needle,
                ignore_case,
            } => {
                let op = if *ignore_case { "icontains" } else { "contains" };
                write!(f, "{field} {op} {}", Preview(needle))
            }
            Self::Pattern { field, pattern } => write!(f, "{field} ~ /{}/", pattern.as_str()),
            Self::Or(clauses) => write_joined(f, clauses, " OR "),
            Self::And(clauses) => write_joined(f, clauses, " AND "),
        }
    }
}

const PREVIEW_CHARS: usize = 64;

// Long needles are cut so log lines stay bounded.
struct Preview<'a>(&'a str);

impl Display for Preview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => write!(f, "{:?}...", &self.0[..cut]),
            None => write!(f, "{:?}", self.0),
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, clauses: &[Filter], separator: &str) -> std::fmt::Result {
    write!(f, "(")?;
    for (index, clause) in clauses.iter().enumerate() {
        if index > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{clause}")?;
    }
    write!(f, ")")
}
