use folio_core::db::migrations::latest_version;
use folio_core::db::open_db_in_memory;
use folio_core::{Fields, Filter, Model, Patch, Record, RecordStore, SqliteCollection, StoreError};
use regex::Regex;
use rusqlite::Connection;

fn award(id: &str, title: &str) -> Record {
    let mut fields = Fields::new();
    fields.insert("user_id".to_string(), "u-1".to_string());
    fields.insert("title".to_string(), title.to_string());
    Record::with_id(id, fields)
}

#[test]
fn create_then_find_one_by_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();

    let created = store.create(&award("a-1", "Best Paper")).unwrap();
    assert_eq!(created.id, "a-1");

    let loaded = store.find_one(&Filter::by_id("a-1")).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert!(store.find_one(&Filter::by_id("missing")).unwrap().is_none());
}

#[test]
fn duplicate_id_is_rejected_per_collection() {
    let conn = open_db_in_memory().unwrap();
    let awards = SqliteCollection::try_new(&conn, "awards").unwrap();
    let projects = SqliteCollection::try_new(&conn, "projects").unwrap();

    awards.create(&award("same", "first")).unwrap();
    let err = awards.create(&award("same", "second")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::DuplicateKey { collection: "awards", ref id } if id == "same"
    ));

    projects.create(&award("same", "other collection")).unwrap();
}

#[test]
fn create_rejects_empty_id_and_id_inside_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();

    let err = store.create(&award("", "untitled")).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let mut smuggled = award("a-1", "t");
    smuggled.fields.insert("id".to_string(), "a-2".to_string());
    assert!(matches!(
        store.create(&smuggled).unwrap_err(),
        StoreError::Validation(_)
    ));
}

#[test]
fn find_returns_insertion_order_and_empty_on_no_match() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();
    store.create(&award("a-2", "second")).unwrap();
    store.create(&award("a-1", "first")).unwrap();

    let all = store.find(&Filter::All).unwrap();
    let ids: Vec<_> = all.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, ["a-2", "a-1"]);

    let none = store.find(&Filter::eq("title", "absent")).unwrap();
    assert!(none.is_empty());
}

#[test]
fn collections_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let awards = SqliteCollection::try_new(&conn, "awards").unwrap();
    let careers = SqliteCollection::try_new(&conn, "careers").unwrap();
    awards.create(&award("a-1", "award")).unwrap();

    assert!(careers.find(&Filter::All).unwrap().is_empty());
    assert_eq!(awards.collection(), "awards");
}

#[test]
fn pattern_filters_use_live_regex() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();
    store.create(&award("a-1", "aab")).unwrap();
    store.create(&award("a-2", "a+b")).unwrap();

    let live = Filter::pattern("title", Regex::new("a+b").unwrap());
    let hits = store.find(&live).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a-1");
}

#[test]
fn find_one_and_update_returns_post_update_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();
    store.create(&award("a-1", "draft")).unwrap();

    let updated = store
        .find_one_and_update(
            &Filter::by_id("a-1"),
            &Patch::new().set("title", "final").set("description", "added"),
        )
        .unwrap();
    assert_eq!(updated.get("title"), Some("final"));
    assert_eq!(updated.get("description"), Some("added"));
    assert_eq!(updated.get("user_id"), Some("u-1"));

    let reloaded = store.find_one(&Filter::by_id("a-1")).unwrap().unwrap();
    assert_eq!(reloaded, updated);
}

#[test]
fn find_one_and_update_rejects_id_change_and_missing_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();
    store.create(&award("a-1", "draft")).unwrap();

    let err = store
        .find_one_and_update(&Filter::by_id("a-1"), &Patch::new().set("id", "a-9"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = store
        .find_one_and_update(&Filter::by_id("nope"), &Patch::new().set("title", "x"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { collection: "awards", .. }));
}

#[test]
fn find_one_and_delete_removes_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn, "awards").unwrap();
    store.create(&award("a-1", "gone")).unwrap();

    let removed = store.find_one_and_delete(&Filter::by_id("a-1")).unwrap();
    assert_eq!(removed.get("title"), Some("gone"));
    assert!(store.find_one(&Filter::by_id("a-1")).unwrap().is_none());

    let err = store.find_one_and_delete(&Filter::by_id("a-1")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn corrupt_body_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO records (collection, id, body) VALUES ('awards', 'a-1', 'not json');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO records (collection, id, body) VALUES ('careers', 'c-1', '{\"id\":\"c-2\"}');",
        [],
    )
    .unwrap();

    let awards = SqliteCollection::try_new(&conn, "awards").unwrap();
    assert!(matches!(
        awards.find(&Filter::All).unwrap_err(),
        StoreError::InvalidData(_)
    ));

    let careers = SqliteCollection::try_new(&conn, "careers").unwrap();
    assert!(matches!(
        careers.find_one(&Filter::by_id("c-1")).unwrap_err(),
        StoreError::InvalidData(message) if message.contains("mismatched")
    ));
}

#[test]
fn model_is_a_pass_through() {
    let conn = open_db_in_memory().unwrap();
    let model = Model::new(SqliteCollection::try_new(&conn, "awards").unwrap());

    model.create(&award("a-1", "one")).unwrap();
    model.create(&award("a-2", "two")).unwrap();

    assert_eq!(model.find_all(None).unwrap().len(), 2);
    assert_eq!(
        model
            .find_all(Some(&Filter::eq("title", "two")))
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        model.find(&Filter::eq("title", "one")).unwrap().unwrap().id,
        "a-1"
    );

    let updated = model.update("a-1", &Patch::new().set("title", "uno")).unwrap();
    assert_eq!(updated.get("title"), Some("uno"));
    assert!(matches!(
        model.update("zzz", &Patch::new().set("title", "x")),
        Err(StoreError::NotFound { .. })
    ));

    let deleted = model.delete("a-2").unwrap();
    assert_eq!(deleted.id, "a-2");
    assert!(model.find_by_id("a-2").unwrap().is_none());
    assert!(matches!(model.delete("a-2"), Err(StoreError::NotFound { .. })));
}

#[test]
fn collection_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCollection::try_new(&conn, "awards") {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn collection_rejects_connection_without_records_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteCollection::try_new(&conn, "awards"),
        Err(StoreError::MissingRequiredTable("records"))
    ));
}

#[test]
fn collection_rejects_records_table_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE records (
            seq INTEGER PRIMARY KEY,
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteCollection::try_new(&conn, "awards"),
        Err(StoreError::MissingRequiredColumn {
            table: "records",
            column: "updated_at"
        })
    ));
}
