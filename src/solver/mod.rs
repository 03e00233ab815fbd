// src/solver/mod.rs

//! The constraint-engine facade: selections, jobs, and solving
//!
//! The engine is reached through a narrow surface: select targets by name or
//! provides, turn the selection into install jobs, and solve against the
//! pool. Solving walks hard requires (and weak recommends unless told not
//! to) through provider lookup, treats the installed/baseline graph as
//! already satisfied, and either produces a transaction or the complete
//! problem list. It never retries and never returns a partial result.

pub mod transaction;

use crate::error::{Error, Result};
use crate::evr::Evr;
use crate::graph::{DepKind, NodeId, Pool};
use crate::registry::Registry;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;
use self::transaction::{PairKind, Pairing, Transaction};

/// Nodes matched by a name-or-provides lookup. Empty means "not found",
/// which is a different outcome than an unsatisfiable solve.
#[derive(Debug, Clone)]
pub struct Selection {
    pub term: String,
    pub targets: Vec<NodeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Install jobs for this selection; none when nothing matched.
    pub fn jobs(&self) -> Vec<Job> {
        if self.targets.is_empty() {
            Vec::new()
        } else {
            vec![Job::Install {
                targets: self.targets.clone(),
            }]
        }
    }
}

/// Match a name against node names and provides across all loaded graphs.
pub fn select(pool: &Pool, term: &str) -> Selection {
    Selection {
        term: term.to_string(),
        targets: pool.select(term),
    }
}

/// Build an install job from a unit identity.
///
/// Fails when the unit was never registered by a load; this is not retried.
pub fn job_for_unit(registry: &Registry, unit_id: &str) -> Result<Job> {
    match registry.node_for(unit_id) {
        Some(node) => Ok(Job::Install {
            targets: vec![node],
        }),
        None => Err(Error::Unregistered(unit_id.to_string())),
    }
}

/// A solve request
#[derive(Debug, Clone)]
pub enum Job {
    Install { targets: Vec<NodeId> },
}

/// One unsatisfiability reported by a solve, surfaced verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem(pub String);

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The solving engine over a finalized pool
pub struct Solver<'a> {
    pool: &'a Pool,
    ignore_recommended: bool,
}

impl<'a> Solver<'a> {
    pub fn new(pool: &'a Pool) -> Self {
        Self {
            pool,
            ignore_recommended: false,
        }
    }

    /// Skip weak recommends edges during solving.
    pub fn set_ignore_recommended(&mut self, ignore: bool) {
        self.ignore_recommended = ignore;
    }

    /// Solve the job list. Either every job resolves and a transaction comes
    /// back, or every problem encountered is reported at once.
    pub fn solve(&self, jobs: &[Job]) -> std::result::Result<Transaction, Vec<Problem>> {
        let mut chosen: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut problems: Vec<Problem> = Vec::new();
        let mut reported: HashSet<String> = HashSet::new();

        for job in jobs {
            let Job::Install { targets } = job;
            match best_candidate(self.pool, targets) {
                // the best candidate already sitting in the baseline graph
                // satisfies the job; an older baseline version does not
                Some(best) if self.pool.is_installed_node(best) => {
                    debug!("install job already satisfied by the installed graph");
                }
                Some(best) => queue.push_back(best),
                None => {}
            }
        }

        while let Some(node) = queue.pop_front() {
            if self.pool.is_installed_node(node) || !chosen.insert(node) {
                continue;
            }
            for dep in self.pool.node(node).deps(DepKind::Requires) {
                self.resolve_edge(node, dep, false, &chosen, &mut queue, &mut problems, &mut reported);
            }
            if !self.ignore_recommended {
                for dep in self.pool.node(node).deps(DepKind::Recommends) {
                    self.resolve_edge(node, dep, true, &chosen, &mut queue, &mut problems, &mut reported);
                }
            }
        }

        if !problems.is_empty() {
            return Err(problems);
        }
        Ok(self.build_transaction(chosen))
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_edge(
        &self,
        from: NodeId,
        dep: &crate::graph::dep::Dep,
        weak: bool,
        chosen: &BTreeSet<NodeId>,
        queue: &mut VecDeque<NodeId>,
        problems: &mut Vec<Problem>,
        reported: &mut HashSet<String>,
    ) {
        let providers = self.pool.providers_of(dep);
        if providers
            .iter()
            .any(|p| self.pool.is_installed_node(*p) || chosen.contains(p))
        {
            return;
        }
        match best_candidate(self.pool, &providers) {
            Some(pick) => queue.push_back(pick),
            None if weak => {
                debug!(
                    "no providers for weak dependency '{}' of {}, skipping",
                    dep,
                    self.pool.node(from)
                );
            }
            None => {
                let message = format!(
                    "nothing provides '{}' required by {}",
                    dep,
                    self.pool.node(from)
                );
                if reported.insert(message.clone()) {
                    problems.push(Problem(message));
                }
            }
        }
    }

    /// Pair each chosen node against the baseline graph: a same-name node
    /// becomes an upgrade or downgrade by EVR ordering, a node matched by an
    /// obsoletes expression becomes an obsolete pairing.
    fn build_transaction(&self, chosen: BTreeSet<NodeId>) -> Transaction {
        let new: Vec<NodeId> = chosen.into_iter().collect();
        let mut pairings: HashMap<NodeId, Pairing> = HashMap::new();

        if let Some(installed) = self.pool.installed() {
            for &node in &new {
                let name = &self.pool.node(node).name;
                let same_name: Vec<NodeId> = self
                    .pool
                    .graph(installed)
                    .nodes()
                    .iter()
                    .copied()
                    .filter(|&old| self.pool.node(old).name == *name)
                    .collect();
                if let Some(old) = best_candidate(self.pool, &same_name) {
                    let ordering = evr_key(self.pool, node).cmp(&evr_key(self.pool, old));
                    let kind = match ordering {
                        std::cmp::Ordering::Greater => Some(PairKind::Upgrade),
                        std::cmp::Ordering::Less => Some(PairKind::Downgrade),
                        std::cmp::Ordering::Equal => None,
                    };
                    if let Some(kind) = kind {
                        pairings.insert(node, Pairing { old, kind });
                        continue;
                    }
                }
                'obsoletes: for dep in self.pool.node(node).deps(DepKind::Obsoletes) {
                    for &old in self.pool.graph(installed).nodes() {
                        if self.pool.node_matches(old, dep) {
                            pairings.insert(
                                node,
                                Pairing {
                                    old,
                                    kind: PairKind::Obsolete,
                                },
                            );
                            break 'obsoletes;
                        }
                    }
                }
            }
        }

        Transaction::from_parts(new, pairings)
    }
}

fn evr_key(pool: &Pool, id: NodeId) -> Option<Evr> {
    pool.node(id).evr.as_deref().and_then(|s| Evr::parse(s).ok())
}

/// The preferred node among candidates: highest EVR, with the most recently
/// added winning ties. `None` for an empty candidate list.
fn best_candidate(pool: &Pool, candidates: &[NodeId]) -> Option<NodeId> {
    candidates
        .iter()
        .copied()
        .max_by(|&a, &b| evr_key(pool, a).cmp(&evr_key(pool, b)).then(a.cmp(&b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::dep::{Dep, RelOp};
    use crate::graph::GraphId;
    use crate::solver::transaction::{ClassifyMode, OpClass};

    fn add_package(pool: &mut Pool, graph: GraphId, name: &str, evr: &str) -> NodeId {
        let id = pool.add_node(graph).unwrap();
        let node = pool.node_mut(id);
        node.set_attr("name", name.to_string()).unwrap();
        node.set_attr("evr", evr.to_string()).unwrap();
        node.add_dep(DepKind::Provides, Dep::rel(name, RelOp::Eq, evr));
        id
    }

    #[test]
    fn test_install_pulls_versioned_dependency() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("source");
        let foo = add_package(&mut pool, graph, "foo", "1.0-1");
        let bar = add_package(&mut pool, graph, "bar", "1.0-1");
        pool.node_mut(foo)
            .add_dep(DepKind::Requires, Dep::rel("bar", RelOp::Ge, "0.9"));
        pool.create_whatprovides();

        let selection = select(&pool, "foo");
        let txn = Solver::new(&pool).solve(&selection.jobs()).unwrap();
        assert_eq!(txn.newsolvables(), &[foo, bar]);
    }

    #[test]
    fn test_selection_not_found_is_distinct_from_unsolvable() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("source");
        add_package(&mut pool, graph, "present", "1.0");
        pool.create_whatprovides();

        let missing = select(&pool, "absent");
        assert!(missing.is_empty());
        assert!(missing.jobs().is_empty());

        // present but with a broken requirement: that is unsolvable instead
        let broken = pool.nodes_by_name("present")[0];
        pool.node_mut(broken)
            .add_dep(DepKind::Requires, Dep::Name("ghost".to_string()));
        pool.create_whatprovides();
        let problems = Solver::new(&pool)
            .solve(&select(&pool, "present").jobs())
            .unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].to_string().contains("nothing provides 'ghost'"));
    }

    #[test]
    fn test_all_problems_reported_at_once() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("source");
        let app = add_package(&mut pool, graph, "app", "1.0");
        pool.node_mut(app)
            .add_dep(DepKind::Requires, Dep::Name("ghost-one".to_string()));
        pool.node_mut(app)
            .add_dep(DepKind::Requires, Dep::Name("ghost-two".to_string()));
        pool.create_whatprovides();

        let problems = Solver::new(&pool)
            .solve(&select(&pool, "app").jobs())
            .unwrap_err();
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_installed_graph_satisfies_requirements() {
        let mut pool = Pool::new();
        let source = pool.add_graph("source");
        let foo = add_package(&mut pool, source, "foo", "1.0");
        pool.node_mut(foo)
            .add_dep(DepKind::Requires, Dep::Name("bar".to_string()));
        let target = pool.add_graph("target");
        add_package(&mut pool, target, "bar", "1.0");
        pool.set_installed(target);
        pool.create_whatprovides();

        let txn = Solver::new(&pool).solve(&select(&pool, "foo").jobs()).unwrap();
        assert_eq!(txn.newsolvables(), &[foo]);
    }

    #[test]
    fn test_weak_dependencies_follow_unless_ignored() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("source");
        let app = add_package(&mut pool, graph, "app", "1.0");
        let extra = add_package(&mut pool, graph, "extra", "1.0");
        pool.node_mut(app)
            .add_dep(DepKind::Recommends, Dep::Name("extra".to_string()));
        // a weak edge nobody provides must not fail the solve
        pool.node_mut(app)
            .add_dep(DepKind::Recommends, Dep::Name("nice-to-have".to_string()));
        pool.create_whatprovides();

        let txn = Solver::new(&pool).solve(&select(&pool, "app").jobs()).unwrap();
        assert_eq!(txn.newsolvables(), &[app, extra]);

        let mut solver = Solver::new(&pool);
        solver.set_ignore_recommended(true);
        let txn = solver.solve(&select(&pool, "app").jobs()).unwrap();
        assert_eq!(txn.newsolvables(), &[app]);
    }

    #[test]
    fn test_upgrade_pairing_and_classification() {
        let mut pool = Pool::new();
        let target = pool.add_graph("target");
        let old = add_package(&mut pool, target, "bar", "1.0-1");
        let source = pool.add_graph("source");
        let new = add_package(&mut pool, source, "bar", "2.0-1");
        pool.set_installed(target);
        pool.create_whatprovides();

        // the selection covers both versions; the newer source node wins
        let txn = Solver::new(&pool)
            .solve(&select(&pool, "bar").jobs())
            .unwrap();
        assert_eq!(txn.newsolvables(), &[new]);
        assert_eq!(txn.othersolvable(new), Some(old));

        let groups = txn.classify(ClassifyMode::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].class, OpClass::Upgraded);
        assert_eq!(groups[0].nodes, vec![new]);
    }

    #[test]
    fn test_downgrade_classification() {
        let mut pool = Pool::new();
        let target = pool.add_graph("target");
        add_package(&mut pool, target, "bar", "2.0");
        let source = pool.add_graph("source");
        let new = add_package(&mut pool, source, "bar", "1.0");
        pool.set_installed(target);
        pool.create_whatprovides();

        let txn = Solver::new(&pool)
            .solve(&[Job::Install { targets: vec![new] }])
            .unwrap();
        let groups = txn.classify(ClassifyMode::default());
        assert_eq!(groups[0].class, OpClass::Downgraded);
    }

    #[test]
    fn test_obsolete_pairing_folds_to_upgrade_on_request() {
        let mut pool = Pool::new();
        let target = pool.add_graph("target");
        let legacy = add_package(&mut pool, target, "legacy-tool", "0.9");
        let source = pool.add_graph("source");
        let new = add_package(&mut pool, source, "new-tool", "1.0");
        pool.node_mut(new)
            .add_dep(DepKind::Obsoletes, Dep::Name("legacy-tool".to_string()));
        pool.set_installed(target);
        pool.create_whatprovides();

        let txn = Solver::new(&pool)
            .solve(&[Job::Install { targets: vec![new] }])
            .unwrap();
        assert_eq!(txn.othersolvable(new), Some(legacy));

        let groups = txn.classify(ClassifyMode::default());
        assert_eq!(groups[0].class, OpClass::Obsoleted);

        let folded = txn.classify(ClassifyMode {
            obsolete_is_upgrade: true,
        });
        assert_eq!(folded[0].class, OpClass::Upgraded);
    }

    #[test]
    fn test_install_of_already_satisfied_name_is_a_noop() {
        let mut pool = Pool::new();
        let source = pool.add_graph("source");
        add_package(&mut pool, source, "bar", "1.0");
        let target = pool.add_graph("target");
        add_package(&mut pool, target, "bar", "2.0");
        pool.set_installed(target);
        pool.create_whatprovides();

        // the baseline already carries the best version of bar
        let txn = Solver::new(&pool).solve(&select(&pool, "bar").jobs()).unwrap();
        assert!(txn.is_empty());
    }

    #[test]
    fn test_job_for_unit_requires_registration() {
        let mut registry = Registry::new();
        registry.register("known", NodeId(0));
        assert!(job_for_unit(&registry, "known").is_ok());
        let err = job_for_unit(&registry, "unknown").unwrap_err();
        assert!(matches!(err, Error::Unregistered(u) if u == "unknown"));
    }

    #[test]
    fn test_best_candidate_prefers_highest_evr_then_latest() {
        let mut pool = Pool::new();
        let graph = pool.add_graph("g");
        let low = add_package(&mut pool, graph, "x", "1.0");
        let high = add_package(&mut pool, graph, "x", "2.0");
        let dup = add_package(&mut pool, graph, "x", "2.0");
        assert_eq!(best_candidate(&pool, &[low, high]), Some(high));
        assert_eq!(best_candidate(&pool, &[high, dup]), Some(dup));
        assert_eq!(best_candidate(&pool, &[]), None);
    }
}
