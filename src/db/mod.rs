// src/db/mod.rs

//! SQLite-backed unit store
//!
//! The store is the external collaborator holding unit records: JSON
//! documents keyed by (repo, unit id), queried by repo name at load time.
//! Connection handling follows the usual pattern: create-and-migrate on
//! init, pragma setup on every open, explicit transactions for batch
//! imports.

pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Initialize a unit store at the given path.
///
/// Creates parent directories and the schema; idempotent on an existing
/// store.
pub fn init(db_path: &str) -> Result<()> {
    debug!("initializing unit store at {}", db_path);

    if let Some(parent) = Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )?;
    schema::migrate(&conn)?;

    info!("unit store initialized at {}", db_path);
    Ok(())
}

/// Open an existing unit store.
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::DatabaseNotFound(db_path.to_string()));
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )?;
    Ok(conn)
}

/// Run a closure inside one SQLite transaction.
pub fn transaction<T>(
    conn: &mut Connection,
    f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_init_creates_store() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();
        drop(temp_file);

        init(&db_path).unwrap();
        assert!(Path::new(&db_path).exists());

        let conn = open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM units", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();
        drop(temp_file);

        init(&db_path).unwrap();
        init(&db_path).unwrap();
    }

    #[test]
    fn test_open_missing_store_fails() {
        let result = open("/nonexistent/path/units.db");
        assert!(matches!(result, Err(Error::DatabaseNotFound(_))));
    }
}
