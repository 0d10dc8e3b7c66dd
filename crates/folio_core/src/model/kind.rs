//! Record-kind descriptors.
//!
//! # Responsibility
//! - Declare, as data, the field policy of every entity kind.
//! - Name the collection each kind is stored in.
//!
//! # Invariants
//! - `settable` ⊆ `required` ∪ `optional`.
//! - Neither `id` nor the owner field is ever settable.
//! - `searchable` and `unique` fields are declared fields.

/// Owner reference carried by subrecord kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerRef {
    /// Field holding the parent id, e.g. `user_id`.
    pub field: &'static str,
    /// Kind of the parent record.
    pub parent: &'static RecordKind,
}

/// Static description of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKind {
    /// Stable kind name used in logs, errors and registry lookup.
    pub name: &'static str,
    /// Store collection holding records of this kind.
    pub collection: &'static str,
    /// `None` for top-level kinds.
    pub owner: Option<OwnerRef>,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub settable: &'static [&'static str],
    /// Text fields that `search` may pattern-match.
    pub searchable: &'static [&'static str],
    /// Fields whose values must not repeat within the collection.
    pub unique: &'static [&'static str],
}

impl RecordKind {
    pub fn owner_field(&self) -> Option<&'static str> {
        self.owner.map(|owner| owner.field)
    }

    pub fn is_subrecord(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether `field` may appear in a create payload.
    pub fn is_declared(&self, field: &str) -> bool {
        self.owner_field() == Some(field)
            || self.required.contains(&field)
            || self.optional.contains(&field)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.contains(&field)
    }

    pub fn is_settable(&self, field: &str) -> bool {
        self.settable.contains(&field)
    }

    pub fn is_searchable(&self, field: &str) -> bool {
        self.searchable.contains(&field)
    }

    /// Fields that must be present and non-empty on create.
    pub fn mandatory_fields(&self) -> impl Iterator<Item = &'static str> {
        self.owner_field()
            .into_iter()
            .chain(self.required.iter().copied())
    }
}

pub const USER: RecordKind = RecordKind {
    name: "user",
    collection: "users",
    owner: None,
    required: &["email", "name"],
    optional: &["description", "profile_image"],
    settable: &["name", "description", "profile_image"],
    searchable: &["name", "description"],
    unique: &["email"],
};

const OWNED_BY_USER: Option<OwnerRef> = Some(OwnerRef {
    field: "user_id",
    parent: &USER,
});

pub const AWARD: RecordKind = RecordKind {
    name: "award",
    collection: "awards",
    owner: OWNED_BY_USER,
    required: &["title"],
    optional: &["description"],
    settable: &["title", "description"],
    searchable: &["title", "description"],
    unique: &[],
};

pub const EDUCATION: RecordKind = RecordKind {
    name: "education",
    collection: "educations",
    owner: OWNED_BY_USER,
    required: &["school", "major", "position"],
    optional: &[],
    settable: &["school", "major", "position"],
    searchable: &["school", "major"],
    unique: &[],
};

pub const CERTIFICATE: RecordKind = RecordKind {
    name: "certificate",
    collection: "certificates",
    owner: OWNED_BY_USER,
    required: &["title", "when_date"],
    optional: &["description"],
    settable: &["title", "description", "when_date"],
    searchable: &["title", "description"],
    unique: &[],
};

pub const CAREER: RecordKind = RecordKind {
    name: "career",
    collection: "careers",
    owner: OWNED_BY_USER,
    required: &["title", "from_date", "to_date"],
    optional: &["description"],
    settable: &["title", "description", "from_date", "to_date"],
    searchable: &["title", "description"],
    unique: &[],
};

pub const PROJECT: RecordKind = RecordKind {
    name: "project",
    collection: "projects",
    owner: OWNED_BY_USER,
    required: &["title", "from_date", "to_date"],
    optional: &["description"],
    settable: &["title", "description", "from_date", "to_date"],
    searchable: &["title", "description"],
    unique: &[],
};

pub const TECH_STACK: RecordKind = RecordKind {
    name: "tech_stack",
    collection: "tech_stacks",
    owner: OWNED_BY_USER,
    required: &["title"],
    optional: &["description"],
    settable: &["title", "description"],
    searchable: &["title", "description"],
    unique: &[],
};

/// Every kind, parents before subrecords.
pub const ALL_KINDS: &[&RecordKind] = &[
    &USER,
    &EDUCATION,
    &AWARD,
    &PROJECT,
    &CERTIFICATE,
    &CAREER,
    &TECH_STACK,
];

/// Looks a kind up by its stable name.
pub fn kind_by_name(name: &str) -> Option<&'static RecordKind> {
    ALL_KINDS.iter().copied().find(|kind| kind.name == name)
}

#[cfg(test)]
mod tests {
    use super::{kind_by_name, ALL_KINDS, AWARD, USER};
    use crate::model::record::ID_FIELD;
    use std::collections::HashSet;

    #[test]
    fn settable_fields_are_declared_and_exclude_owner_and_id() {
        for kind in ALL_KINDS {
            for field in kind.settable {
                assert!(
                    kind.required.contains(field) || kind.optional.contains(field),
                    "{}: settable `{field}` is not declared",
                    kind.name
                );
                assert_ne!(*field, ID_FIELD, "{}: id must not be settable", kind.name);
                assert_ne!(
                    Some(*field),
                    kind.owner_field(),
                    "{}: owner field must not be settable",
                    kind.name
                );
            }
        }
    }

    #[test]
    fn searchable_and_unique_fields_are_declared() {
        for kind in ALL_KINDS {
            for field in kind.searchable.iter().chain(kind.unique) {
                assert!(kind.is_declared(field), "{}: `{field}` undeclared", kind.name);
            }
        }
    }

    #[test]
    fn names_and_collections_are_distinct() {
        let names: HashSet<_> = ALL_KINDS.iter().map(|kind| kind.name).collect();
        let collections: HashSet<_> = ALL_KINDS.iter().map(|kind| kind.collection).collect();
        assert_eq!(names.len(), ALL_KINDS.len());
        assert_eq!(collections.len(), ALL_KINDS.len());
    }

    #[test]
    fn subrecords_point_at_user() {
        for kind in ALL_KINDS.iter().filter(|kind| kind.is_subrecord()) {
            let owner = kind.owner.unwrap();
            assert_eq!(owner.field, "user_id");
            assert_eq!(owner.parent.name, USER.name);
        }
    }

    #[test]
    fn mandatory_fields_lead_with_owner() {
        assert_eq!(
            AWARD.mandatory_fields().collect::<Vec<_>>(),
            ["user_id", "title"]
        );
        assert_eq!(kind_by_name("award"), Some(&AWARD));
        assert_eq!(kind_by_name("nope"), None);
    }
}
