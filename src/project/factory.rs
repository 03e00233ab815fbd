// src/project/factory.rs

//! Per-unit-kind node factories
//!
//! A factory is the ordered step list that turns one unit into one node.
//! Step order matters only where steps feed each other (the EVR compound
//! must run before anything references the identity); unrelated attributes
//! are independent. Advisory nodes additionally receive the self-provides
//! augmentation so other nodes can depend on them by name and version.

use crate::error::Result;
use crate::graph::dep::{Dep, RelOp};
use crate::graph::{DepKind, GraphId, NodeId, Pool};
use crate::project::deps::DepProject;
use crate::project::{evr_project, Convert, FieldProject, ProjectStep};
use crate::registry::Registry;
use crate::unit::{FieldSource, Unit, UnitKind};
use serde_json::json;
use std::str::FromStr;
use tracing::debug;

/// Ordered projection steps for one unit kind
pub struct NodeFactory {
    pub kind: UnitKind,
    steps: Vec<Box<dyn ProjectStep>>,
    self_provides: bool,
}

impl std::fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeFactory")
            .field("kind", &self.kind)
            .field("steps", &self.steps.len())
            .field("self_provides", &self.self_provides)
            .finish()
    }
}

impl NodeFactory {
    /// Resolve the factory for a unit-kind name. Unknown kinds fail here,
    /// which under the strict load policy aborts the whole load.
    pub fn for_kind(kind: &str) -> Result<Self> {
        Ok(match UnitKind::from_str(kind)? {
            UnitKind::Rpm => Self::rpm(),
            UnitKind::Srpm => Self::srpm(),
            UnitKind::Erratum => Self::erratum(),
        })
    }

    /// Binary RPM units: full attribute set and all eight dependency slots.
    pub fn rpm() -> Self {
        Self {
            kind: UnitKind::Rpm,
            steps: vec![
                Box::new(FieldProject::named("name")),
                Box::new(evr_project()),
                Box::new(FieldProject::named("arch")),
                Box::new(FieldProject::named("vendor")),
                Box::new(DepProject::slot("requires")),
                Box::new(DepProject::slot("conflicts")),
                Box::new(DepProject::slot("provides")),
                Box::new(DepProject::slot("obsoletes")),
                Box::new(DepProject::slot("recommends")),
                Box::new(DepProject::slot("suggests")),
                Box::new(DepProject::slot("supplements")),
                Box::new(DepProject::slot("enhances")),
            ],
            self_provides: false,
        }
    }

    /// Source RPM units: no weak dependencies, no provides/obsoletes.
    pub fn srpm() -> Self {
        Self {
            kind: UnitKind::Srpm,
            steps: vec![
                Box::new(FieldProject::named("name")),
                Box::new(evr_project()),
                Box::new(FieldProject::named("arch")),
                Box::new(FieldProject::named("vendor")),
                Box::new(DepProject::slot("requires")),
                Box::new(DepProject::slot("conflicts")),
            ],
            self_provides: false,
        }
    }

    /// Advisory units: the errata id becomes the node name under the
    /// `errata:` namespace, the arch defaults to noarch, and the package
    /// search records register as weak recommends. Advisories do not
    /// naturally provide themselves, so the factory adds the provide.
    pub fn erratum() -> Self {
        Self {
            kind: UnitKind::Erratum,
            steps: vec![
                Box::new(FieldProject {
                    field: "errata_id",
                    target: Some("name"),
                    default: None,
                    convert: Convert::Prefix("errata:"),
                }),
                Box::new(FieldProject {
                    field: "arch",
                    target: None,
                    default: Some(json!("noarch")),
                    convert: Convert::Stringify,
                }),
                Box::new(FieldProject {
                    field: "errata_from",
                    target: Some("vendor"),
                    default: None,
                    convert: Convert::Stringify,
                }),
                Box::new(evr_project()),
                Box::new(DepProject::remapped("rpm_search_dicts", DepKind::Recommends)),
            ],
            self_provides: true,
        }
    }

    /// Allocate a node, run every step in order, augment, register.
    ///
    /// Only real units pass through here, so the registry never sees the
    /// transient adaptors that compound steps build internally.
    pub fn build(
        &self,
        pool: &mut Pool,
        graph: GraphId,
        unit: &Unit,
        registry: &mut Registry,
    ) -> Result<NodeId> {
        let node = pool.add_node(graph)?;
        for step in &self.steps {
            step.apply(pool, node, unit)?;
        }
        if self.self_provides {
            add_self_provides(pool, node);
        }
        registry.register(&unit.id, node);
        debug!("built node {} for unit {}", pool.node(node), unit.describe());
        Ok(node)
    }
}

/// Provide the node's own name, refined to `name = evr` when the node has an
/// EVR identity, so dependency expressions can target it by version.
fn add_self_provides(pool: &mut Pool, node: NodeId) {
    let (name, evr) = {
        let node = pool.node(node);
        (node.name.clone(), node.evr.clone())
    };
    let dep = match evr {
        Some(evr) => Dep::rel(name, RelOp::Eq, evr),
        None => Dep::Name(name),
    };
    pool.node_mut(node).add_dep(DepKind::Provides, dep);
}
