//! Table presence checks for the Cyclus output schema.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Tables every analysis reads.
pub const REQUIRED_TABLES: &[&str] = &[
    "AgentEntry",
    "Transactions",
    "Resources",
    "Compositions",
    "Info",
];

/// Fails with [`DbError::MissingTable`] on the first absent required table.
pub fn validate_schema(conn: &Connection) -> DbResult<()> {
    for table in REQUIRED_TABLES {
        require_table(conn, table)?;
    }
    Ok(())
}

/// Table names compare case-insensitively, as SQLite identifiers do.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub fn require_table(conn: &Connection, table: &'static str) -> DbResult<()> {
    if table_exists(conn, table)? {
        Ok(())
    } else {
        Err(DbError::MissingTable(table))
    }
}

#[cfg(test)]
mod tests {
    use super::{table_exists, validate_schema};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn table_lookup_ignores_case() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE agententry (AgentId INTEGER);")
            .unwrap();
        assert!(table_exists(&conn, "AgentEntry").unwrap());
        assert!(!table_exists(&conn, "AgentExit").unwrap());
    }

    #[test]
    fn validation_names_first_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE AgentEntry (AgentId INTEGER);
             CREATE TABLE Transactions (TransactionId INTEGER);",
        )
        .unwrap();
        let err = validate_schema(&conn).unwrap_err();
        assert!(matches!(err, DbError::MissingTable("Resources")));
    }
}
