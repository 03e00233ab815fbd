// src/db/models.rs

//! Stored unit documents
//!
//! One row per unit: the repo it belongs to, its external identity, its kind,
//! and the full JSON payload. Rows convert to in-memory [`Unit`] values at
//! query time.

use crate::error::Result;
use crate::unit::Unit;
use rusqlite::{params, Connection, Row};
use serde_json::Value;

/// A unit document as stored
#[derive(Debug, Clone)]
pub struct UnitRow {
    pub id: Option<i64>,
    pub repo: String,
    pub unit_id: String,
    pub kind: String,
    pub payload: String,
}

impl UnitRow {
    /// Build a row from a parsed unit document.
    pub fn from_document(repo: &str, document: &Value) -> Result<Self> {
        let unit = Unit::from_value(document.clone())?;
        Ok(Self {
            id: None,
            repo: repo.to_string(),
            unit_id: unit.id.clone(),
            kind: unit.kind.clone(),
            payload: serde_json::to_string(document)?,
        })
    }

    /// Insert this row, keeping the first document when the (repo, unit id)
    /// pair already exists. Returns true when a new row was written.
    pub fn insert(&mut self, conn: &Connection) -> Result<bool> {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO units (repo, unit_id, kind, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![&self.repo, &self.unit_id, &self.kind, &self.payload],
        )?;
        if changed > 0 {
            self.id = Some(conn.last_insert_rowid());
        }
        Ok(changed > 0)
    }

    /// All units of a repo, in import order.
    pub fn find_by_repo(conn: &Connection, repo: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, repo, unit_id, kind, payload FROM units
             WHERE repo = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([repo], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fetch one unit document by repo and external identity.
    pub fn find_by_unit_id(conn: &Connection, repo: &str, unit_id: &str) -> Result<Option<Self>> {
        use rusqlite::OptionalExtension;
        let mut stmt = conn.prepare(
            "SELECT id, repo, unit_id, kind, payload FROM units
             WHERE repo = ?1 AND unit_id = ?2",
        )?;
        let row = stmt.query_row([repo, unit_id], Self::from_row).optional()?;
        Ok(row)
    }

    pub fn count_by_repo(conn: &Connection, repo: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM units WHERE repo = ?1",
            [repo],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Parse the stored payload back into a unit.
    pub fn to_unit(&self) -> Result<Unit> {
        let document: Value = serde_json::from_str(&self.payload)?;
        Unit::from_value(document)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            repo: row.get(1)?,
            unit_id: row.get(2)?,
            kind: row.get(3)?,
            payload: row.get(4)?,
        })
    }
}

/// Load every unit of a repo from the store.
pub fn units_in_repo(conn: &Connection, repo: &str) -> Result<Vec<Unit>> {
    UnitRow::find_by_repo(conn, repo)?
        .iter()
        .map(UnitRow::to_unit)
        .collect()
}
