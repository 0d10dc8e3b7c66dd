//! SQLite-backed document collection.
//!
//! # Responsibility
//! - Persist records as JSON documents in the shared `records` table.
//! - Evaluate [`Filter`]s, pushing `id` lookups down to the unique index.
//!
//! # Invariants
//! - `(collection, id)` is unique; duplicates surface as `DuplicateKey`.
//! - Each update/delete reads and writes inside one transaction.
//! - Read paths reject documents whose body disagrees with the `id` column.

use super::{Filter, RecordStore, StoreError, StoreResult};
use crate::db::migrations::latest_version;
use crate::model::record::{Patch, Record, ID_FIELD};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};

const RECORDS_TABLE: &str = "records";
const REQUIRED_COLUMNS: &[&str] = &["seq", "collection", "id", "body", "updated_at"];

/// One collection of the `records` table.
pub struct SqliteCollection<'conn> {
    conn: &'conn Connection,
    name: &'static str,
}

impl<'conn> SqliteCollection<'conn> {
    /// Binds `name` on a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the `records` table is absent.
    /// - `Validation` when `name` is blank.
    pub fn try_new(conn: &'conn Connection, name: &'static str) -> StoreResult<Self> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation(
                "collection name must not be empty".to_string(),
            ));
        }
        ensure_connection_ready(conn)?;
        Ok(Self { conn, name })
    }
}

impl RecordStore for SqliteCollection<'_> {
    fn collection(&self) -> &'static str {
        self.name
    }

    fn create(&self, record: &Record) -> StoreResult<Record> {
        check_record_shape(record)?;
        let body = encode_body(record)?;

        let inserted = self.conn.execute(
            "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3);",
            params![self.name, record.id.as_str(), body],
        );
        match inserted {
            Ok(_) => Ok(record.clone()),
            Err(err) if is_constraint_violation(&err) => Err(StoreError::DuplicateKey {
                collection: self.name,
                id: record.id.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn find_one(&self, filter: &Filter) -> StoreResult<Option<Record>> {
        Ok(scan(self.conn, self.name, filter, Some(1))?.into_iter().next())
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<Record>> {
        scan(self.conn, self.name, filter, None)
    }

    fn find_one_and_update(&self, filter: &Filter, patch: &Patch) -> StoreResult<Record> {
        if patch.contains(ID_FIELD) {
            return Err(StoreError::Validation("`id` cannot be modified".to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut record = self.first_match(&tx, filter)?;
        patch.apply_to(&mut record);
        let body = encode_body(&record)?;
        tx.execute(
            "UPDATE records
             SET
                body = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?2
               AND id = ?3;",
            params![body, self.name, record.id.as_str()],
        )?;
        tx.commit()?;

        Ok(record)
    }

    fn find_one_and_delete(&self, filter: &Filter) -> StoreResult<Record> {
        let tx = self.conn.unchecked_transaction()?;
        let record = self.first_match(&tx, filter)?;
        tx.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2;",
            params![self.name, record.id.as_str()],
        )?;
        tx.commit()?;

        Ok(record)
    }
}

impl SqliteCollection<'_> {
    fn first_match(&self, conn: &Connection, filter: &Filter) -> StoreResult<Record> {
        scan(conn, self.name, filter, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                collection: self.name,
                filter: filter.to_string(),
            })
    }
}

fn scan(
    conn: &Connection,
    collection: &str,
    filter: &Filter,
    limit: Option<usize>,
) -> StoreResult<Vec<Record>> {
    let mut sql = String::from("SELECT id, body FROM records WHERE collection = ?");
    let mut bind_values: Vec<Value> = vec![Value::Text(collection.to_string())];

    if let Some(id) = filter.pinned_id() {
        sql.push_str(" AND id = ?");
        bind_values.push(Value::Text(id.to_string()));
    }
    sql.push_str(" ORDER BY seq ASC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        let record = parse_record_row(row)?;
        if !filter.matches(&record) {
            continue;
        }
        records.push(record);
        if limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }
    }

    Ok(records)
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let id: String = row.get("id")?;
    let body: String = row.get("body")?;
    let record: Record = serde_json::from_str(&body).map_err(|err| {
        StoreError::InvalidData(format!("record `{id}` has an undecodable body: {err}"))
    })?;

    if record.id != id {
        return Err(StoreError::InvalidData(format!(
            "record `{id}` carries mismatched body id `{}`",
            record.id
        )));
    }

    Ok(record)
}

fn check_record_shape(record: &Record) -> StoreResult<()> {
    if record.id.trim().is_empty() {
        return Err(StoreError::Validation("`id` must not be empty".to_string()));
    }
    if record.fields.contains_key(ID_FIELD) {
        return Err(StoreError::Validation(
            "`id` must not be duplicated inside fields".to_string(),
        ));
    }
    Ok(())
}

fn encode_body(record: &Record) -> StoreResult<String> {
    serde_json::to_string(record)
        .map_err(|err| StoreError::InvalidData(format!("record `{}`: {err}", record.id)))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [RECORDS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(StoreError::MissingRequiredTable(RECORDS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([RECORDS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !columns.iter().any(|name| name.as_str() == **column))
    {
        return Err(StoreError::MissingRequiredColumn {
            table: RECORDS_TABLE,
            column: *column,
        });
    }

    Ok(())
}
