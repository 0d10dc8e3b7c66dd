use folio_core::db::open_db_in_memory;
use folio_core::{Fields, Record, SearchCriteria, ServiceError, ServiceRegistry};

fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

fn seed(registry: &ServiceRegistry<'_>) -> (Record, Vec<Record>) {
    let user = registry
        .users
        .create(fields(&[
            ("email", "kim@example.com"),
            ("name", "Kim"),
            ("description", "backend engineer"),
        ]))
        .unwrap();
    let projects = [
        ("a+b", "literal plus"),
        ("aab", "would match a+b as a pattern"),
        ("Folio Rewrite", "storage layer"),
        ("Search UI", "filters (beta)"),
    ]
    .into_iter()
    .map(|(title, description)| {
        registry
            .projects
            .create(fields(&[
                ("user_id", user.id.as_str()),
                ("title", title),
                ("from_date", "2023-01-01"),
                ("to_date", "2023-12-31"),
                ("description", description),
            ]))
            .unwrap()
    })
    .collect();
    (user, projects)
}

fn titles(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|record| record.get("title"))
        .collect()
}

#[test]
fn empty_criteria_returns_every_record() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    let (_, projects) = seed(&registry);

    let found = registry.projects.search(&SearchCriteria::new()).unwrap();
    assert_eq!(found, projects);

    let blank = SearchCriteria::new().term("title", "   ");
    assert_eq!(registry.projects.search(&blank).unwrap().len(), projects.len());
}

#[test]
fn metacharacters_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    seed(&registry);

    let found = registry
        .projects
        .search(&SearchCriteria::new().term("title", "a+b"))
        .unwrap();
    assert_eq!(titles(&found), ["a+b"]);

    let found = registry
        .projects
        .search(&SearchCriteria::new().term("description", "(beta)"))
        .unwrap();
    assert_eq!(titles(&found), ["Search UI"]);
}

#[test]
fn raw_pattern_opt_in_uses_regex_semantics() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    seed(&registry);

    let criteria = SearchCriteria::new()
        .term("title", "^a+b$")
        .raw_pattern(true);
    let found = registry.projects.search(&criteria).unwrap();
    assert_eq!(titles(&found), ["aab"]);

    let broken = SearchCriteria::new()
        .term("title", "(unclosed")
        .raw_pattern(true);
    assert!(matches!(
        registry.projects.search(&broken),
        Err(ServiceError::InvalidQuery { .. })
    ));
}

#[test]
fn terms_are_or_combined_and_case_folding_is_optional() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    seed(&registry);

    let criteria = SearchCriteria::new()
        .term("title", "folio")
        .term("description", "storage");
    let found = registry.projects.search(&criteria).unwrap();
    assert_eq!(titles(&found), ["Folio Rewrite"]);

    let folded = SearchCriteria::new()
        .term("title", "folio")
        .term("description", "plus")
        .ignore_case(true);
    let found = registry.projects.search(&folded).unwrap();
    assert_eq!(titles(&found), ["a+b", "Folio Rewrite"]);
}

#[test]
fn long_literal_terms_find_stored_text() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    let (user, _) = seed(&registry);
    let long_text = "x".repeat(20_000);
    let award = registry
        .awards
        .create(fields(&[
            ("user_id", user.id.as_str()),
            ("title", "Essay"),
            ("description", long_text.as_str()),
        ]))
        .unwrap();

    for ignore_case in [false, true] {
        let criteria = SearchCriteria::new()
            .term("description", long_text.as_str())
            .ignore_case(ignore_case);
        let found = registry.awards.search(&criteria).unwrap();
        assert_eq!(found, vec![award.clone()], "ignore_case={ignore_case}");
    }

    let upper = SearchCriteria::new()
        .term("description", "X".repeat(5_000))
        .ignore_case(true);
    assert_eq!(registry.awards.search(&upper).unwrap().len(), 1);
    let upper_exact = SearchCriteria::new().term("description", "X".repeat(5_000));
    assert!(registry.awards.search(&upper_exact).unwrap().is_empty());
}

#[test]
fn no_match_yields_empty_list() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    seed(&registry);

    let found = registry
        .projects
        .search(&SearchCriteria::new().term("title", "nothing like this"))
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn non_searchable_field_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let registry = ServiceRegistry::new(&conn).unwrap();
    seed(&registry);

    assert!(matches!(
        registry
            .users
            .search(&SearchCriteria::new().term("email", "kim")),
        Err(ServiceError::Validation(message)) if message.contains("email")
    ));

    let found = registry
        .users
        .search(&SearchCriteria::new().term("description", "backend"))
        .unwrap();
    assert_eq!(found.len(), 1);
}
