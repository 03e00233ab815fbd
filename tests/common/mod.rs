// tests/common/mod.rs

//! Shared test fixtures for integration tests.

use depsolv::db;
use depsolv::db::models::UnitRow;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Create an on-disk unit store. Keep the TempDir alive until the test ends.
pub fn setup_store() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("units.db")
        .to_str()
        .unwrap()
        .to_string();
    db::init(&db_path).unwrap();
    (temp_dir, db_path)
}

/// Import unit documents into a repo of the store.
pub fn import_units(db_path: &str, repo: &str, documents: &[Value]) {
    let mut conn = db::open(db_path).unwrap();
    db::transaction(&mut conn, |tx| {
        for document in documents {
            UnitRow::from_document(repo, document)?.insert(tx)?;
        }
        Ok(())
    })
    .unwrap();
}

/// A binary RPM document with an explicit self-provide.
pub fn rpm_doc(id: &str, name: &str, version: &str, release: &str) -> Value {
    json!({
        "id": id,
        "kind": "rpm",
        "name": name,
        "version": version,
        "release": release,
        "arch": "x86_64",
        "vendor": "zoo",
        "provides": [
            {"name": name, "flags": "EQ", "version": version, "release": release}
        ]
    })
}

/// Attach a requirement record to an rpm document.
pub fn with_require(mut doc: Value, record: Value) -> Value {
    match doc["requires"].as_array_mut() {
        Some(requires) => requires.push(record),
        None => doc["requires"] = json!([record]),
    }
    doc
}
