// src/registry.rs

//! Bidirectional unit-identity / node-identity registry
//!
//! One registry spans the whole pool, so nodes from every loaded graph share
//! a single lookup table and unit identities must be unique across graphs.
//! Entries are inserted once per created node and never overwritten or
//! deleted: re-registering a known identity is a no-op, which means stale
//! associations survive a graph reload by design.
//!
//! Only identity pairs are retained here, never unit payloads; presentation
//! code refetches the record from the unit store. Very large pools would
//! need an eviction or disk-backed strategy on top of this.

use crate::graph::NodeId;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Registry {
    node_by_unit: HashMap<String, NodeId>,
    unit_by_node: HashMap<NodeId, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert both directions, first write wins.
    ///
    /// Transient adaptor values never reach this method: registration is
    /// keyed on real unit identities only.
    pub fn register(&mut self, unit_id: &str, node: NodeId) {
        if self.node_by_unit.contains_key(unit_id) || self.unit_by_node.contains_key(&node) {
            debug!("identity '{}' already registered, keeping first association", unit_id);
            return;
        }
        self.node_by_unit.insert(unit_id.to_string(), node);
        self.unit_by_node.insert(node, unit_id.to_string());
    }

    pub fn node_for(&self, unit_id: &str) -> Option<NodeId> {
        self.node_by_unit.get(unit_id).copied()
    }

    pub fn unit_for(&self, node: NodeId) -> Option<&str> {
        self.unit_by_node.get(&node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.node_by_unit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_by_unit.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup_both_directions() {
        let mut registry = Registry::new();
        registry.register("unit-1", NodeId(7));
        assert_eq!(registry.node_for("unit-1"), Some(NodeId(7)));
        assert_eq!(registry.unit_for(NodeId(7)), Some("unit-1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_lookups() {
        let registry = Registry::new();
        assert_eq!(registry.node_for("ghost"), None);
        assert_eq!(registry.unit_for(NodeId(0)), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregistration_is_a_noop() {
        let mut registry = Registry::new();
        registry.register("unit-1", NodeId(1));
        // same pair again
        registry.register("unit-1", NodeId(1));
        // conflicting pairs must not displace the first association
        registry.register("unit-1", NodeId(2));
        registry.register("unit-2", NodeId(1));

        assert_eq!(registry.node_for("unit-1"), Some(NodeId(1)));
        assert_eq!(registry.unit_for(NodeId(1)), Some("unit-1"));
        assert_eq!(registry.node_for("unit-2"), None);
        assert_eq!(registry.unit_for(NodeId(2)), None);
        assert_eq!(registry.len(), 1);
    }
}
