// src/project/mod.rs

//! Composable unit-to-node projection steps
//!
//! A node factory is an ordered list of small projection steps, each
//! implementing the single [`ProjectStep`] capability. Plain steps copy one
//! named unit field onto a node attribute; the compound step assembles a
//! throwaway adaptor from several fields and feeds the adaptor, not the raw
//! unit, into a finishing step. The EVR identity is synthesized this way so
//! it is written exactly once.

pub mod deps;
pub mod factory;

use crate::error::Result;
use crate::evr::format_evr;
use crate::graph::{NodeId, Pool};
use crate::unit::{value_as_string, Adaptor, FieldSource};
use serde_json::Value;
use tracing::debug;

/// One projection capability: read from the unit, write onto the node.
pub trait ProjectStep {
    fn apply(&self, pool: &mut Pool, node: NodeId, unit: &dyn FieldSource) -> Result<()>;
}

/// Value conversions available to plain field projection
#[derive(Debug, Clone, Copy)]
pub enum Convert {
    /// Render the field as a string attribute
    Stringify,
    /// Render as a string with a fixed prefix, e.g. `errata:` for advisories
    Prefix(&'static str),
}

/// Project one named unit field onto a node attribute.
///
/// Absent (or null) fields fall back to the default when one is declared and
/// are skipped otherwise; skipping is not an error.
pub struct FieldProject {
    pub field: &'static str,
    /// Attribute to write; the field name itself when `None`
    pub target: Option<&'static str>,
    pub default: Option<Value>,
    pub convert: Convert,
}

impl FieldProject {
    pub fn named(field: &'static str) -> Self {
        Self {
            field,
            target: None,
            default: None,
            convert: Convert::Stringify,
        }
    }
}

impl ProjectStep for FieldProject {
    fn apply(&self, pool: &mut Pool, node: NodeId, unit: &dyn FieldSource) -> Result<()> {
        let target = self.target.unwrap_or(self.field);
        let value = unit
            .get(self.field)
            .filter(|v| !v.is_null())
            .or_else(|| self.default.clone());
        debug!(
            "projecting {} of {} as {}: {:?}",
            self.field,
            unit.describe(),
            target,
            value
        );
        let Some(value) = value else {
            return Ok(());
        };
        let text = match self.convert {
            Convert::Stringify => value_as_string(&value),
            Convert::Prefix(prefix) => value_as_string(&value).map(|s| format!("{}{}", prefix, s)),
        };
        match text {
            Some(text) => pool.node_mut(node).set_attr(target, text),
            None => Ok(()),
        }
    }
}

/// Copy several fields into a scratch adaptor, then run a finishing step
/// against the adaptor instead of the raw unit.
pub struct CompoundProject {
    copies: Vec<&'static str>,
    finish: Box<dyn ProjectStep>,
}

impl CompoundProject {
    pub fn new(copies: Vec<&'static str>, finish: Box<dyn ProjectStep>) -> Self {
        Self { copies, finish }
    }
}

impl ProjectStep for CompoundProject {
    fn apply(&self, pool: &mut Pool, node: NodeId, unit: &dyn FieldSource) -> Result<()> {
        let mut adaptor = Adaptor::new();
        for field in &self.copies {
            if let Some(value) = unit.get(field) {
                adaptor.set(field, value);
            }
        }
        self.finish.apply(pool, node, &adaptor)
    }
}

/// Finishing step of the EVR compound: formats `epoch:version-release` from
/// the adaptor and writes it once. A missing version suppresses the identity
/// entirely.
struct EvrFinish;

impl ProjectStep for EvrFinish {
    fn apply(&self, pool: &mut Pool, node: NodeId, unit: &dyn FieldSource) -> Result<()> {
        let Some(version) = unit.get("version").as_ref().and_then(value_as_string) else {
            debug!("no version on {}, skipping evr", unit.describe());
            return Ok(());
        };
        let epoch = unit.get("epoch").as_ref().and_then(value_as_string);
        let release = unit.get("release").as_ref().and_then(value_as_string);
        let evr = format_evr(&version, epoch.as_deref(), release.as_deref());
        debug!("projecting evr of {}: {}", unit.describe(), evr);
        pool.node_mut(node).set_attr("evr", evr)
    }
}

/// The epoch/version/release compound projection.
pub fn evr_project() -> CompoundProject {
    CompoundProject::new(vec!["epoch", "version", "release"], Box::new(EvrFinish))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphId;
    use crate::unit::Unit;
    use serde_json::json;

    fn scratch_node(pool: &mut Pool) -> (GraphId, NodeId) {
        let graph = pool.add_graph("test");
        let node = pool.add_node(graph).unwrap();
        (graph, node)
    }

    fn unit(fields: Value) -> Unit {
        Unit::from_value(fields).unwrap()
    }

    #[test]
    fn test_field_project_basic() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "rpm", "name": "penguin"}));
        FieldProject::named("name").apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).name, "penguin");
    }

    #[test]
    fn test_field_project_skips_absent_without_default() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "rpm"}));
        FieldProject::named("vendor").apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).vendor, None);
    }

    #[test]
    fn test_field_project_default_and_rename() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "erratum", "errata_from": "secteam"}));

        let arch = FieldProject {
            field: "arch",
            target: None,
            default: Some(json!("noarch")),
            convert: Convert::Stringify,
        };
        arch.apply(&mut pool, node, &unit).unwrap();

        let vendor = FieldProject {
            field: "errata_from",
            target: Some("vendor"),
            default: None,
            convert: Convert::Stringify,
        };
        vendor.apply(&mut pool, node, &unit).unwrap();

        let node = pool.node(node);
        assert_eq!(node.arch.as_deref(), Some("noarch"));
        assert_eq!(node.vendor.as_deref(), Some("secteam"));
    }

    #[test]
    fn test_field_project_prefix_conversion() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "erratum", "errata_id": "RHSA-1"}));
        let step = FieldProject {
            field: "errata_id",
            target: Some("name"),
            default: None,
            convert: Convert::Prefix("errata:"),
        };
        step.apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).name, "errata:RHSA-1");
    }

    #[test]
    fn test_evr_compound_full() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({
            "id": "u", "kind": "rpm",
            "epoch": "2", "version": "1.2.3", "release": "4.el8"
        }));
        evr_project().apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).evr.as_deref(), Some("2:1.2.3-4.el8"));
    }

    #[test]
    fn test_evr_compound_omits_absent_parts() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "rpm", "version": "1.0"}));
        evr_project().apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).evr.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_evr_compound_without_version_sets_nothing() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "rpm", "epoch": "1", "release": "9"}));
        evr_project().apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).evr, None);
    }

    #[test]
    fn test_evr_compound_numeric_epoch() {
        let mut pool = Pool::new();
        let (_, node) = scratch_node(&mut pool);
        let unit = unit(json!({"id": "u", "kind": "rpm", "epoch": 1, "version": "2.0"}));
        evr_project().apply(&mut pool, node, &unit).unwrap();
        assert_eq!(pool.node(node).evr.as_deref(), Some("1:2.0"));
    }
}
