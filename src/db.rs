// Database layer - SQLite schema and entry rows
//
// The file holds the entries table and nothing else: a deleted entry leaves
// no trace of its source, sum or timestamp.

use crate::entities::{Amount, Entry, EntryId, Source};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases stay "memory")
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(journal_mode = %journal_mode, "database journal mode set");

    // ==========================================================================
    // Entries Table
    // seq keeps insertion order; entry_uuid is the identity handed to callers
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_uuid TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            source TEXT NOT NULL,
            sum INTEGER NOT NULL CHECK (sum >= 0)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_source ON entries(source)",
        [],
    )?;

    Ok(())
}

/// Insert one entry. Callers run this inside a transaction.
pub fn insert_entry(conn: &Connection, entry: &Entry) -> Result<()> {
    conn.execute(
        "INSERT INTO entries (entry_uuid, timestamp, source, sum)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.id().to_string(),
            entry.timestamp().to_rfc3339(),
            entry.source().as_str(),
            sum_to_sql(entry.sum())?,
        ],
    )?;

    Ok(())
}

/// Delete one entry by identity. Returns the removed entry, or None if it was already gone.
pub fn delete_entry(conn: &Connection, id: &EntryId) -> Result<Option<Entry>> {
    let existing = get_entry(conn, id)?;

    if existing.is_some() {
        conn.execute(
            "DELETE FROM entries WHERE entry_uuid = ?1",
            params![id.to_string()],
        )?;
    }

    Ok(existing)
}

pub fn get_entry(conn: &Connection, id: &EntryId) -> Result<Option<Entry>> {
    let entry = conn
        .query_row(
            "SELECT entry_uuid, timestamp, source, sum
             FROM entries
             WHERE entry_uuid = ?1",
            params![id.to_string()],
            entry_from_row,
        )
        .optional()?;

    Ok(entry)
}

/// All entries in insertion order
pub fn get_all_entries(conn: &Connection) -> Result<Vec<Entry>> {
    let mut stmt = conn.prepare(
        "SELECT entry_uuid, timestamp, source, sum
         FROM entries
         ORDER BY seq ASC",
    )?;

    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;

    Ok(count)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let uuid_str: String = row.get(0)?;
    let timestamp_str: String = row.get(1)?;
    let source_str: String = row.get(2)?;
    let sum: i64 = row.get(3)?;

    let id = uuid_str
        .parse::<EntryId>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    let source = source_str
        .parse::<Source>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let sum = Amount::try_from(sum)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?;

    Ok(Entry::restore(id, timestamp, source, sum))
}

fn sum_to_sql(sum: Amount) -> Result<i64> {
    i64::try_from(sum)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_read_back_in_order() {
        let conn = test_db();

        let later = Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 19, 9, 0, 0).unwrap();

        // Inserted out of timestamp order on purpose
        let first = Entry::at(later, Source::Binance, 250);
        let second = Entry::at(earlier, Source::ApoalimStocks, 100);
        insert_entry(&conn, &first).unwrap();
        insert_entry(&conn, &second).unwrap();

        let entries = get_all_entries(&conn).unwrap();
        assert_eq!(entries, vec![first, second]);
        assert_eq!(verify_count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let conn = test_db();
        let entry = Entry::new(Source::KupatGemel, 40);
        insert_entry(&conn, &entry).unwrap();

        let removed = delete_entry(&conn, &entry.id()).unwrap();
        assert_eq!(removed, Some(entry.clone()));

        let again = delete_entry(&conn, &entry.id()).unwrap();
        assert_eq!(again, None);
        assert_eq!(verify_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_identity_is_rejected() {
        let conn = test_db();
        let entry = Entry::new(Source::Binance, 1);
        insert_entry(&conn, &entry).unwrap();

        assert!(insert_entry(&conn, &entry).is_err());
        assert_eq!(verify_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_corrupt_source_surfaces_as_error() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO entries (entry_uuid, timestamp, source, sum) VALUES (?1, ?2, ?3, ?4)",
            params![EntryId::new().to_string(), Utc::now().to_rfc3339(), "piggy_bank", 5],
        )
        .unwrap();

        let err = get_all_entries(&conn).unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn test_negative_sum_is_refused_by_schema() {
        let conn = test_db();
        let result = conn.execute(
            "INSERT INTO entries (entry_uuid, timestamp, source, sum) VALUES (?1, ?2, ?3, ?4)",
            params![EntryId::new().to_string(), Utc::now().to_rfc3339(), "binance", -1],
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_schema_holds_entry_fields_only() {
        let conn = test_db();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["entries"]);

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('entries')").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(columns, vec!["seq", "entry_uuid", "timestamp", "source", "sum"]);
    }
}
