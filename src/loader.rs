// src/loader.rs

//! Loading unit collections into named graphs
//!
//! A load either fully populates a graph or aborts: the strict policy makes
//! an unknown unit kind fatal for the whole load rather than skipping the
//! offending unit. The target graph is created on first use and reused (with
//! its metadata table) on subsequent loads under the same name.

use crate::error::Result;
use crate::graph::{GraphId, Pool};
use crate::project::factory::NodeFactory;
use crate::registry::Registry;
use crate::unit::{FieldSource, Unit};
use serde_json::Value;
use tracing::{debug, info};

/// Load a unit collection into the graph named `graph_name`.
///
/// Each unit dispatches through its kind's node factory and registers its
/// identity. Per-node file lists, when present, land in the graph's shared
/// metadata table. After all units are in, the graph is internalized so
/// queries see a consistent snapshot; with `installed` set the graph becomes
/// the pool's baseline, superseding any previous designation.
pub fn load_units(
    pool: &mut Pool,
    registry: &mut Registry,
    units: &[Unit],
    graph_name: &str,
    installed: bool,
) -> Result<GraphId> {
    let graph = match pool.graph_by_name(graph_name) {
        Some(existing) => {
            pool.graph_mut(existing).reopen();
            existing
        }
        None => pool.add_graph(graph_name),
    };

    for unit in units {
        let factory = NodeFactory::for_kind(&unit.kind)?;
        let node = factory.build(pool, graph, unit, registry)?;
        if let Some(Value::Array(files)) = unit.get("files") {
            let paths: Vec<String> = files
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect();
            pool.graph_mut(graph).meta.set_files(node, paths);
        }
        debug!("loaded {}", unit.describe());
    }

    pool.graph_mut(graph).internalize();
    if installed {
        pool.set_installed(graph);
    }
    info!(
        "loaded {} units into graph '{}'{}",
        units.len(),
        graph_name,
        if installed { " (installed)" } else { "" }
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn unit(fields: serde_json::Value) -> Unit {
        Unit::from_value(fields).unwrap()
    }

    fn rpm(id: &str, name: &str, version: &str) -> Unit {
        unit(json!({
            "id": id,
            "kind": "rpm",
            "name": name,
            "version": version,
            "provides": [{"name": name, "flags": "EQ", "version": version}]
        }))
    }

    #[test]
    fn test_load_populates_graph_and_registry() {
        let mut pool = Pool::new();
        let mut registry = Registry::new();
        let units = vec![rpm("u-foo", "foo", "1.0"), rpm("u-bar", "bar", "2.0")];

        let graph = load_units(&mut pool, &mut registry, &units, "source", false).unwrap();

        assert_eq!(pool.graph(graph).nodes().len(), 2);
        assert!(pool.graph(graph).is_finalized());
        assert_eq!(registry.len(), 2);
        assert_eq!(pool.installed(), None);
    }

    #[test]
    fn test_unknown_kind_aborts_whole_load() {
        let mut pool = Pool::new();
        let mut registry = Registry::new();
        let units = vec![
            rpm("u-foo", "foo", "1.0"),
            unit(json!({"id": "u-odd", "kind": "flatpak", "name": "odd"})),
        ];

        let err = load_units(&mut pool, &mut registry, &units, "source", false).unwrap_err();
        assert!(matches!(err, Error::UnknownUnitKind(k) if k == "flatpak"));
    }

    #[test]
    fn test_installed_flag_marks_baseline() {
        let mut pool = Pool::new();
        let mut registry = Registry::new();

        let source =
            load_units(&mut pool, &mut registry, &[rpm("a", "a", "1")], "source", false).unwrap();
        let target =
            load_units(&mut pool, &mut registry, &[rpm("b", "b", "1")], "target", true).unwrap();
        assert_eq!(pool.installed(), Some(target));

        // a later installed load supersedes the designation
        let newer =
            load_units(&mut pool, &mut registry, &[rpm("c", "c", "1")], "newer", true).unwrap();
        assert_eq!(pool.installed(), Some(newer));
        assert_ne!(source, newer);
    }

    #[test]
    fn test_reload_reuses_graph_and_meta_table() {
        let mut pool = Pool::new();
        let mut registry = Registry::new();

        let first = unit(json!({
            "id": "u-1", "kind": "rpm", "name": "one", "version": "1.0",
            "files": ["/usr/bin/one"]
        }));
        let graph = load_units(&mut pool, &mut registry, &[first], "repo", false).unwrap();
        assert_eq!(pool.graph(graph).meta.len(), 1);

        let second = rpm("u-2", "two", "1.0");
        let again = load_units(&mut pool, &mut registry, &[second], "repo", false).unwrap();
        assert_eq!(graph, again);
        assert_eq!(pool.graph(graph).nodes().len(), 2);
        // the original metadata survives the reload
        assert_eq!(pool.graph(graph).meta.len(), 1);
    }
}
