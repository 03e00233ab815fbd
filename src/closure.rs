// src/closure.rs

//! Transitive requirement closures over the loaded pool
//!
//! Two traversal policies share one primitive: asking the pool which nodes
//! provide a requirement edge. Both treat an edge without providers as a
//! diagnostic, never a failure, and both are bounded by visited/done sets so
//! cyclic requirement graphs terminate. Traversal state is freshly scoped
//! per top-level call; nothing is retained between unrelated queries.

use crate::graph::dep::Dep;
use crate::graph::{DepKind, NodeId, Pool};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Depth-first walk from a seed set, yielding each reachable node once.
///
/// The node and edge visited sets are shared across the whole walk, so a
/// node or edge reachable along two paths is only expanded once. Nodes are
/// returned in first-visit order.
pub fn walk_requirements(pool: &Pool, seeds: &[NodeId]) -> Vec<NodeId> {
    let mut walk = Walk {
        pool,
        visited_nodes: HashSet::new(),
        visited_edges: HashSet::new(),
        order: Vec::new(),
    };
    for &seed in seeds {
        walk.visit(seed);
    }
    walk.order
}

struct Walk<'a> {
    pool: &'a Pool,
    visited_nodes: HashSet<NodeId>,
    visited_edges: HashSet<Dep>,
    order: Vec<NodeId>,
}

impl Walk<'_> {
    fn visit(&mut self, node: NodeId) {
        if !self.visited_nodes.insert(node) {
            return;
        }
        self.order.push(node);
        let requires: Vec<Dep> = self.pool.node(node).deps(DepKind::Requires).to_vec();
        for dep in requires {
            if !self.visited_edges.insert(dep.clone()) {
                continue;
            }
            let providers = self.pool.providers_of(&dep);
            if providers.is_empty() {
                warn!("no providers for '{}' required by {}", dep, self.pool.node(node));
            }
            for provider in providers {
                self.visit(provider);
            }
        }
    }
}

/// Level-set closure of a name: resolve, seed, expand until the frontier
/// runs dry, return the accumulated done-set.
///
/// Name resolution is an exact match over node names. When several nodes
/// share the name, the most recently added match seeds the walk; callers
/// needing a specific one must disambiguate upstream. An unknown name yields
/// the empty set.
pub fn closure_by_name(pool: &Pool, name: &str) -> BTreeSet<NodeId> {
    let matches = pool.nodes_by_name(name);
    let Some(&seed) = matches.last() else {
        debug!("no node named '{}' in any loaded graph", name);
        return BTreeSet::new();
    };
    if matches.len() > 1 {
        debug!("name '{}' matches {} nodes, seeding from the last", name, matches.len());
    }

    let mut done = BTreeSet::from([seed]);
    let mut frontier = vec![seed];
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &node in &frontier {
            for dep in pool.node(node).deps(DepKind::Requires) {
                let providers = pool.providers_of(dep);
                if providers.is_empty() {
                    warn!("no providers for '{}' required by {}", dep, pool.node(node));
                    continue;
                }
                for provider in providers {
                    if done.insert(provider) {
                        next.push(provider);
                    }
                }
            }
        }
        frontier = next;
    }
    done
}
