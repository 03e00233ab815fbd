// src/unit/mod.rs

//! Unit records and the field-reader boundary
//!
//! A unit is an externally supplied metadata record describing one package,
//! source package, or advisory. Units reach the core as JSON documents; all
//! field access from that point on goes through the narrow [`FieldSource`]
//! capability so the projection framework never branches on the concrete
//! representation.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Unit kinds with a registered node factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Rpm,
    Srpm,
    Erratum,
}

impl UnitKind {
    pub fn as_str(&self) -> &str {
        match self {
            UnitKind::Rpm => "rpm",
            UnitKind::Srpm => "srpm",
            UnitKind::Erratum => "erratum",
        }
    }
}

impl FromStr for UnitKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rpm" => Ok(UnitKind::Rpm),
            "srpm" => Ok(UnitKind::Srpm),
            "erratum" => Ok(UnitKind::Erratum),
            other => Err(Error::UnknownUnitKind(other.to_string())),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrow field-reader capability over a unit-shaped value.
///
/// Implemented once for [`Unit`] and once for the throwaway [`Adaptor`] used
/// by compound projections; the projection framework only ever sees this
/// trait.
pub trait FieldSource {
    /// Read a named field, `None` when absent.
    fn get(&self, name: &str) -> Option<Value>;

    /// A short label for diagnostics.
    fn describe(&self) -> String;
}

/// An externally supplied unit record
#[derive(Debug, Clone)]
pub struct Unit {
    /// Stable external identity, unique across all loaded graphs
    pub id: String,
    /// Unit type name, resolved to a node factory at load time
    pub kind: String,
    fields: Map<String, Value>,
}

impl Unit {
    pub fn new(id: String, kind: String, fields: Map<String, Value>) -> Self {
        Self { id, kind, fields }
    }

    /// Build a unit from one imported JSON document.
    ///
    /// The document must be an object carrying string `id` and `kind` fields;
    /// everything else is type-specific payload.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::MalformedUnit("unit record is not an object".to_string()));
        };
        let id = match fields.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(Error::MalformedUnit(
                    "unit record is missing a string 'id'".to_string(),
                ))
            }
        };
        let kind = match fields.get("kind") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(Error::MalformedUnit(format!(
                    "unit '{}' is missing a string 'kind'",
                    id
                )))
            }
        };
        Ok(Self { id, kind, fields })
    }
}

impl FieldSource for Unit {
    fn get(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// Throwaway value a compound projection assembles before its final step.
///
/// Adaptors are transient by design: they never reach the identity registry
/// and are dropped as soon as the finishing projector has consumed them.
#[derive(Debug, Default)]
pub struct Adaptor(Map<String, Value>);

impl Adaptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_object(fields: &Map<String, Value>) -> Self {
        Self(fields.clone())
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }
}

impl FieldSource for Adaptor {
    fn get(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }

    fn describe(&self) -> String {
        "<adaptor>".to_string()
    }
}

/// Render a JSON scalar the way it should appear as a node attribute.
///
/// Strings pass through without quoting; numbers use their decimal form.
/// `Null` yields `None`, matching "absent" semantics.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_kind_round_trip() {
        for kind in ["rpm", "srpm", "erratum"] {
            assert_eq!(UnitKind::from_str(kind).unwrap().as_str(), kind);
        }
    }

    #[test]
    fn test_unit_kind_unknown() {
        let err = UnitKind::from_str("iso").unwrap_err();
        assert!(matches!(err, Error::UnknownUnitKind(k) if k == "iso"));
    }

    #[test]
    fn test_unit_from_value() {
        let unit = Unit::from_value(json!({
            "id": "u-1",
            "kind": "rpm",
            "name": "penguin",
            "version": "1.0"
        }))
        .unwrap();
        assert_eq!(unit.id, "u-1");
        assert_eq!(unit.kind, "rpm");
        assert_eq!(unit.get("name"), Some(json!("penguin")));
        assert_eq!(unit.get("vendor"), None);
    }

    #[test]
    fn test_unit_from_value_requires_id_and_kind() {
        assert!(Unit::from_value(json!({"kind": "rpm"})).is_err());
        assert!(Unit::from_value(json!({"id": "u-1"})).is_err());
        assert!(Unit::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_adaptor_set_get() {
        let mut adaptor = Adaptor::new();
        adaptor.set("version", json!("1.0"));
        assert_eq!(adaptor.get("version"), Some(json!("1.0")));
        assert_eq!(adaptor.describe(), "<adaptor>");
    }

    #[test]
    fn test_value_as_string() {
        assert_eq!(value_as_string(&json!("x")), Some("x".to_string()));
        assert_eq!(value_as_string(&json!(3)), Some("3".to_string()));
        assert_eq!(value_as_string(&Value::Null), None);
    }
}
