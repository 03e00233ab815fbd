// src/solver/transaction.rs

//! Solve results: new nodes, reverse pairing, and classification
//!
//! A transaction is a read-only view of what a successful solve decided. It
//! knows the new nodes, which baseline node each one replaces (when any),
//! and how to group the result into operation classes for reporting.

use crate::graph::NodeId;
use std::collections::HashMap;
use std::fmt;

/// How a new node relates to the baseline node it replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    Upgrade,
    Downgrade,
    Obsolete,
}

/// A new node's link back to the baseline node it supersedes
#[derive(Debug, Clone, Copy)]
pub struct Pairing {
    pub old: NodeId,
    pub kind: PairKind,
}

/// Operation classes a transaction groups into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Install,
    Upgraded,
    Downgraded,
    Obsoleted,
}

impl OpClass {
    pub fn as_str(&self) -> &str {
        match self {
            OpClass::Install => "install",
            OpClass::Upgraded => "upgraded",
            OpClass::Downgraded => "downgraded",
            OpClass::Obsoleted => "obsoleted",
        }
    }
}

impl fmt::Display for OpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification options
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyMode {
    /// Fold obsolete pairings into the upgraded group
    pub obsolete_is_upgrade: bool,
}

/// One classification group and its member nodes
#[derive(Debug, Clone)]
pub struct OpGroup {
    pub class: OpClass,
    pub nodes: Vec<NodeId>,
}

/// The outcome of a successful solve
#[derive(Debug)]
pub struct Transaction {
    new: Vec<NodeId>,
    pairings: HashMap<NodeId, Pairing>,
}

impl Transaction {
    pub(crate) fn from_parts(new: Vec<NodeId>, pairings: HashMap<NodeId, Pairing>) -> Self {
        Self { new, pairings }
    }

    /// Every node the solve decided to bring in, in id order.
    pub fn newsolvables(&self) -> &[NodeId] {
        &self.new
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
    }

    /// The baseline counterpart of a new node: the version it upgrades,
    /// downgrades, or obsoletes.
    pub fn othersolvable(&self, node: NodeId) -> Option<NodeId> {
        self.pairings.get(&node).map(|p| p.old)
    }

    /// Group the new nodes into operation classes. Groups come back in a
    /// fixed order (install, upgraded, downgraded, obsoleted) with empty
    /// groups omitted.
    pub fn classify(&self, mode: ClassifyMode) -> Vec<OpGroup> {
        let mut install = Vec::new();
        let mut upgraded = Vec::new();
        let mut downgraded = Vec::new();
        let mut obsoleted = Vec::new();

        for &node in &self.new {
            match self.pairings.get(&node).map(|p| p.kind) {
                None => install.push(node),
                Some(PairKind::Upgrade) => upgraded.push(node),
                Some(PairKind::Downgrade) => downgraded.push(node),
                Some(PairKind::Obsolete) if mode.obsolete_is_upgrade => upgraded.push(node),
                Some(PairKind::Obsolete) => obsoleted.push(node),
            }
        }

        [
            (OpClass::Install, install),
            (OpClass::Upgraded, upgraded),
            (OpClass::Downgraded, downgraded),
            (OpClass::Obsoleted, obsoleted),
        ]
        .into_iter()
        .filter(|(_, nodes)| !nodes.is_empty())
        .map(|(class, nodes)| OpGroup { class, nodes })
        .collect()
    }
}
