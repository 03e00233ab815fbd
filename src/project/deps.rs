// src/project/deps.rs

//! Dependency-slot projection: compiling expressions onto node edges
//!
//! Each dependency-bearing slot of a unit holds an ordered list of dependency
//! records. A record whose `name` opens with `(` is a rich boolean expression
//! and every other field of the record is ignored; otherwise the record
//! compiles to a plain name term, optionally wrapped in a relational term
//! against the EVR synthesized from the record's own fields.

use crate::error::Result;
use crate::evr::format_evr;
use crate::graph::dep::{parse_rich_dep, Dep, RelOp};
use crate::graph::{DepKind, NodeId, Pool};
use crate::project::ProjectStep;
use crate::unit::{value_as_string, Adaptor, FieldSource};
use serde_json::Value;
use tracing::{debug, warn};

/// Compile every record of one dependency slot onto the node.
pub struct DepProject {
    pub slot: &'static str,
    /// Explicit edge kind, for slots whose native name must be remapped
    /// (advisory search records register as weak recommends).
    pub kind: Option<DepKind>,
}

impl DepProject {
    pub fn slot(slot: &'static str) -> Self {
        Self { slot, kind: None }
    }

    pub fn remapped(slot: &'static str, kind: DepKind) -> Self {
        Self {
            slot,
            kind: Some(kind),
        }
    }
}

impl ProjectStep for DepProject {
    fn apply(&self, pool: &mut Pool, node: NodeId, unit: &dyn FieldSource) -> Result<()> {
        let kind = match self.kind {
            Some(kind) => kind,
            None => DepKind::from_slot(self.slot)
                .ok_or_else(|| crate::error::Error::UnknownSlot(self.slot.to_string()))?,
        };
        let Some(Value::Array(records)) = unit.get(self.slot) else {
            return Ok(());
        };
        debug!(
            "projecting {} {} records of {} as {}",
            records.len(),
            self.slot,
            unit.describe(),
            kind.as_str()
        );
        for record in &records {
            let Value::Object(fields) = record else {
                warn!("skipping non-object {} record on {}", self.slot, unit.describe());
                continue;
            };
            compile_record(pool, node, kind, &Adaptor::from_object(fields))?;
        }
        Ok(())
    }
}

/// Compile one dependency record and register it under the edge kind.
fn compile_record(
    pool: &mut Pool,
    node: NodeId,
    kind: DepKind,
    record: &dyn FieldSource,
) -> Result<()> {
    let Some(name) = record.get("name").as_ref().and_then(value_as_string) else {
        warn!("skipping dependency record without a name");
        return Ok(());
    };

    if name.starts_with('(') {
        // rich form dominates: the string is self-contained and the
        // version/epoch/release/flags fields play no part
        let rich = parse_rich_dep(&name)?;
        pool.node_mut(node).add_dep(kind, Dep::Rich(rich));
        return Ok(());
    }

    let dep = match record.get("flags").as_ref().and_then(value_as_string) {
        None => Dep::Name(name),
        Some(flag) => {
            let op = RelOp::from_flag(&flag)?;
            match record.get("version").as_ref().and_then(value_as_string) {
                Some(version) => {
                    let epoch = record.get("epoch").as_ref().and_then(value_as_string);
                    let release = record.get("release").as_ref().and_then(value_as_string);
                    Dep::Rel {
                        name,
                        op,
                        evr: format_evr(&version, epoch.as_deref(), release.as_deref()),
                    }
                }
                None => {
                    warn!("dependency '{}' carries flags but no version, matching by name", name);
                    Dep::Name(name)
                }
            }
        }
    };
    pool.node_mut(node).add_dep(kind, dep);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::dep::RichDep;
    use crate::unit::Unit;
    use serde_json::json;

    fn apply_slot(unit_fields: Value, step: DepProject) -> (Pool, NodeId) {
        let mut pool = Pool::new();
        let graph = pool.add_graph("test");
        let node = pool.add_node(graph).unwrap();
        let unit = Unit::from_value(unit_fields).unwrap();
        step.apply(&mut pool, node, &unit).unwrap();
        (pool, node)
    }

    #[test]
    fn test_plain_name_dependency() {
        let (pool, node) = apply_slot(
            json!({"id": "u", "kind": "rpm", "requires": [{"name": "bar"}]}),
            DepProject::slot("requires"),
        );
        assert_eq!(
            pool.node(node).deps(DepKind::Requires),
            &[Dep::Name("bar".to_string())]
        );
    }

    #[test]
    fn test_relational_dependency_builds_evr() {
        let (pool, node) = apply_slot(
            json!({"id": "u", "kind": "rpm", "requires": [
                {"name": "bar", "flags": "GE", "epoch": "1", "version": "0.9", "release": "3"}
            ]}),
            DepProject::slot("requires"),
        );
        assert_eq!(
            pool.node(node).deps(DepKind::Requires),
            &[Dep::rel("bar", RelOp::Ge, "1:0.9-3")]
        );
    }

    #[test]
    fn test_rich_form_dominates() {
        // version and flags on a rich record must be ignored outright
        let (pool, node) = apply_slot(
            json!({"id": "u", "kind": "rpm", "requires": [
                {"name": "(foo >= 1.0 AND bar)", "flags": "LT", "version": "9.9"}
            ]}),
            DepProject::slot("requires"),
        );
        let deps = pool.node(node).deps(DepKind::Requires);
        assert_eq!(deps.len(), 1);
        match &deps[0] {
            Dep::Rich(RichDep::And(_, _)) => {}
            other => panic!("expected rich And, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_flags_token_fails_operator_lookup() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("test");
        let node = pool.add_node(graph).unwrap();
        let unit = Unit::from_value(json!({
            "id": "u", "kind": "rpm",
            "requires": [{"name": "bar", "flags": "BOGUS", "version": "1.0"}]
        }))
        .unwrap();
        let err = DepProject::slot("requires")
            .apply(&mut pool, node, &unit)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOperator(t) if t == "BOGUS"));
    }

    #[test]
    fn test_absent_slot_is_a_noop() {
        let (pool, node) = apply_slot(
            json!({"id": "u", "kind": "rpm"}),
            DepProject::slot("requires"),
        );
        assert!(pool.node(node).deps(DepKind::Requires).is_empty());
    }

    #[test]
    fn test_remapped_slot_registers_under_override_kind() {
        let (pool, node) = apply_slot(
            json!({"id": "u", "kind": "erratum", "rpm_search_dicts": [
                {"name": "penguin", "flags": "EQ", "version": "0.9", "release": "1"}
            ]}),
            DepProject::remapped("rpm_search_dicts", DepKind::Recommends),
        );
        assert_eq!(
            pool.node(node).deps(DepKind::Recommends),
            &[Dep::rel("penguin", RelOp::Eq, "0.9-1")]
        );
        assert!(pool.node(node).deps(DepKind::Requires).is_empty());
    }

    #[test]
    fn test_unmapped_slot_without_override_is_an_error() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("test");
        let node = pool.add_node(graph).unwrap();
        let unit = Unit::from_value(json!({
            "id": "u", "kind": "erratum",
            "rpm_search_dicts": [{"name": "x"}]
        }))
        .unwrap();
        let err = DepProject::slot("rpm_search_dicts")
            .apply(&mut pool, node, &unit)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSlot(s) if s == "rpm_search_dicts"));
    }

    #[test]
    fn test_flags_without_version_degrade_to_name() {
        let (pool, node) = apply_slot(
            json!({"id": "u", "kind": "rpm", "requires": [{"name": "bar", "flags": "GE"}]}),
            DepProject::slot("requires"),
        );
        assert_eq!(
            pool.node(node).deps(DepKind::Requires),
            &[Dep::Name("bar".to_string())]
        );
    }
}
