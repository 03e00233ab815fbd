// src/report.rs

//! Interpreting a transaction for presentation
//!
//! The interpreter is a read-only formatter: it walks the transaction's
//! classification groups, pairs upgraded and downgraded nodes with their
//! previous versions through the transaction's own reverse lookup, and
//! translates every node back to its originating unit via the identity
//! registry. No solving happens here.

use crate::graph::{Node, NodeId, Pool};
use crate::registry::Registry;
use crate::solver::transaction::{ClassifyMode, OpClass, Transaction};
use std::fmt;

/// Presentation view of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub name: String,
    pub evr: Option<String>,
    pub arch: Option<String>,
}

impl NodeSummary {
    fn of(node: &Node) -> Self {
        Self {
            name: node.name.clone(),
            evr: node.evr.clone(),
            arch: node.arch.clone(),
        }
    }
}

impl fmt::Display for NodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(ref evr) = self.evr {
            write!(f, "-{}", evr)?;
        }
        if let Some(ref arch) = self.arch {
            write!(f, ".{}", arch)?;
        }
        Ok(())
    }
}

/// One classified operation, with its before/after pairing when applicable
#[derive(Debug, Clone)]
pub struct Operation {
    pub node: NodeSummary,
    pub unit_id: Option<String>,
    pub previous: Option<NodeSummary>,
    pub previous_unit_id: Option<String>,
}

/// A classification group with interpreted members
#[derive(Debug, Clone)]
pub struct OperationGroup {
    pub class: OpClass,
    pub operations: Vec<Operation>,
}

/// The full interpreted transaction
#[derive(Debug, Clone)]
pub struct OperationReport {
    pub groups: Vec<OperationGroup>,
}

impl OperationReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.groups.iter().map(|g| g.operations.len()).sum()
    }
}

/// Interpret a solved transaction into classified, unit-annotated groups.
pub fn interpret(
    pool: &Pool,
    registry: &Registry,
    txn: &Transaction,
    mode: ClassifyMode,
) -> OperationReport {
    let groups = txn
        .classify(mode)
        .into_iter()
        .map(|group| OperationGroup {
            class: group.class,
            operations: group
                .nodes
                .iter()
                .map(|&node| operation_for(pool, registry, txn, group.class, node))
                .collect(),
        })
        .collect();
    OperationReport { groups }
}

fn operation_for(
    pool: &Pool,
    registry: &Registry,
    txn: &Transaction,
    class: OpClass,
    node: NodeId,
) -> Operation {
    let previous = match class {
        OpClass::Upgraded | OpClass::Downgraded | OpClass::Obsoleted => txn.othersolvable(node),
        OpClass::Install => None,
    };
    Operation {
        node: NodeSummary::of(pool.node(node)),
        unit_id: registry.unit_for(node).map(str::to_string),
        previous: previous.map(|old| NodeSummary::of(pool.node(old))),
        previous_unit_id: previous.and_then(|old| registry.unit_for(old)).map(str::to_string),
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(f, "{}:", group.class)?;
            for op in &group.operations {
                match op.previous {
                    Some(ref previous) => write!(f, "  - {} -> {}", previous, op.node)?,
                    None => write!(f, "  - {}", op.node)?,
                }
                if let Some(ref unit_id) = op.unit_id {
                    write!(f, " (unit: {})", unit_id)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
