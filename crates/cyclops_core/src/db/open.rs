//! Connection bootstrap for simulator output files.
//!
//! # Responsibility
//! - Open file (read-only) or in-memory SQLite connections.
//! - Validate the analysis schema before handing the connection out.

use super::schema::validate_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a Cyclus output file read-only and validates its schema.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file path={}",
        path.display()
    );

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    let checked = conn
        .busy_timeout(Duration::from_secs(5))
        .map_err(DbError::from)
        .and_then(|()| validate_schema(&conn));
    match checked {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_schema_invalid error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an empty writable in-memory database.
///
/// Used to assemble fixture databases; callers create the schema themselves
/// and run [`validate_schema`] once populated.
pub fn open_db_in_memory() -> DbResult<Connection> {
    info!("event=db_open module=db status=start mode=memory");
    let conn = Connection::open_in_memory()?;
    info!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}
