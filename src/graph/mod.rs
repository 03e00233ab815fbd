// src/graph/mod.rs

//! The node pool: graphs, nodes, and provider lookup
//!
//! A pool is the arena holding every loaded graph, the shared node id
//! namespace, and the installed/baseline designation. Graphs are named node
//! collections with one shared metadata table each. Nodes are never mutated
//! after their graph has been finalized, and provider lookup runs over the
//! whatprovides index built by [`Pool::create_whatprovides`] once all loads
//! are done.

pub mod dep;

use crate::error::{Error, Result};
use self::dep::{Dep, RelOp, RichDep};
use std::collections::HashMap;
use std::fmt;

/// Pool-wide node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Pool-wide graph identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(pub u32);

/// Typed dependency-edge sets a node may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DepKind {
    Provides,
    Requires,
    Conflicts,
    Obsoletes,
    Recommends,
    Suggests,
    Supplements,
    Enhances,
}

impl DepKind {
    /// The fixed slot-name table. Slots outside it have no edge kind and
    /// must be remapped explicitly by their factory.
    pub fn from_slot(slot: &str) -> Option<Self> {
        match slot {
            "provides" => Some(DepKind::Provides),
            "requires" => Some(DepKind::Requires),
            "conflicts" => Some(DepKind::Conflicts),
            "obsoletes" => Some(DepKind::Obsoletes),
            "recommends" => Some(DepKind::Recommends),
            "suggests" => Some(DepKind::Suggests),
            "supplements" => Some(DepKind::Supplements),
            "enhances" => Some(DepKind::Enhances),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DepKind::Provides => "provides",
            DepKind::Requires => "requires",
            DepKind::Conflicts => "conflicts",
            DepKind::Obsoletes => "obsoletes",
            DepKind::Recommends => "recommends",
            DepKind::Suggests => "suggests",
            DepKind::Supplements => "supplements",
            DepKind::Enhances => "enhances",
        }
    }
}

/// A graph vertex derived from one unit
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub graph: GraphId,
    pub name: String,
    pub evr: Option<String>,
    pub arch: Option<String>,
    pub vendor: Option<String>,
    deps: HashMap<DepKind, Vec<Dep>>,
}

impl Node {
    fn new(id: NodeId, graph: GraphId) -> Self {
        Self {
            id,
            graph,
            name: String::new(),
            evr: None,
            arch: None,
            vendor: None,
            deps: HashMap::new(),
        }
    }

    /// Write a scalar attribute by name. The attribute set is finite; the
    /// projection framework is the only caller.
    pub fn set_attr(&mut self, attr: &str, value: String) -> Result<()> {
        match attr {
            "name" => self.name = value,
            "evr" => self.evr = Some(value),
            "arch" => self.arch = Some(value),
            "vendor" => self.vendor = Some(value),
            other => return Err(Error::UnknownAttribute(other.to_string())),
        }
        Ok(())
    }

    pub fn add_dep(&mut self, kind: DepKind, dep: Dep) {
        self.deps.entry(kind).or_default().push(dep);
    }

    pub fn deps(&self, kind: DepKind) -> &[Dep] {
        self.deps.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}

impl fmt::Display for Node {
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

/// Per-graph auxiliary data, shared by all nodes of the graph
#[derive(Debug, Default, Clone)]
pub struct MetaTable {
    file_lists: HashMap<NodeId, Vec<String>>,
}

impl MetaTable {
    pub fn set_files(&mut self, node: NodeId, files: Vec<String>) {
        self.file_lists.insert(node, files);
    }

    pub fn files(&self, node: NodeId) -> Option<&[String]> {
        self.file_lists.get(&node).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.file_lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_lists.is_empty()
    }
}

/// A named node collection inside the pool
#[derive(Debug)]
pub struct Graph {
    pub id: GraphId,
    pub name: String,
    nodes: Vec<NodeId>,
    pub meta: MetaTable,
    finalized: bool,
}

impl Graph {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Freeze the graph so queries see a consistent snapshot.
    pub fn internalize(&mut self) {
        self.finalized = true;
    }

    /// Allow another load pass into an existing graph; its metadata table is
    /// reused rather than replaced.
    pub fn reopen(&mut self) {
        self.finalized = false;
    }
}

/// The arena holding all graphs, nodes, and the baseline designation
#[derive(Debug, Default)]
pub struct Pool {
    nodes: Vec<Node>,
    graphs: Vec<Graph>,
    installed: Option<GraphId>,
    whatprovides: HashMap<String, Vec<NodeId>>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_graph(&mut self, name: &str) -> GraphId {
        let id = GraphId(self.graphs.len() as u32);
        self.graphs.push(Graph {
            id,
            name: name.to_string(),
            nodes: Vec::new(),
            meta: MetaTable::default(),
            finalized: false,
        });
        id
    }

    pub fn graph_by_name(&self, name: &str) -> Option<GraphId> {
        self.graphs.iter().find(|g| g.name == name).map(|g| g.id)
    }

    pub fn graph(&self, id: GraphId) -> &Graph {
        &self.graphs[id.0 as usize]
    }

    pub fn graph_mut(&mut self, id: GraphId) -> &mut Graph {
        &mut self.graphs[id.0 as usize]
    }

    /// Mark a graph as the installed/baseline graph, superseding any
    /// previous designation. At most one graph holds it at a time.
    pub fn set_installed(&mut self, id: GraphId) {
        self.installed = Some(id);
    }

    pub fn installed(&self) -> Option<GraphId> {
        self.installed
    }

    pub fn is_installed_node(&self, id: NodeId) -> bool {
        match self.installed {
            Some(graph) => self.node(id).graph == graph,
            None => false,
        }
    }

    /// Allocate a fresh node inside a graph. Fails once the graph has been
    /// finalized.
    pub fn add_node(&mut self, graph: GraphId) -> Result<NodeId> {
        if self.graph(graph).finalized {
            return Err(Error::GraphFinalized(self.graph(graph).name.clone()));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, graph));
        self.graph_mut(graph).nodes.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn solvables(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All nodes carrying exactly this name, in load order.
    pub fn nodes_by_name(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.name == name)
            .map(|n| n.id)
            .collect()
    }

    /// Build the provider index over every loaded graph. Must run after all
    /// loads and before any provider lookup; loading more nodes afterwards
    /// requires rebuilding.
    pub fn create_whatprovides(&mut self) {
        let mut index: HashMap<String, Vec<NodeId>> = HashMap::new();
        for node in &self.nodes {
            for entry in node.deps(DepKind::Provides) {
                for name in dep_names(entry) {
                    let providers = index.entry(name).or_default();
                    if providers.last() != Some(&node.id) {
                        providers.push(node.id);
                    }
                }
            }
        }
        self.whatprovides = index;
    }

    /// Which nodes satisfy this dependency edge, across all loaded graphs.
    pub fn providers_of(&self, dep: &Dep) -> Vec<NodeId> {
        match dep {
            Dep::Name(name) | Dep::Rel { name, .. } => {
                let Some(candidates) = self.whatprovides.get(name) else {
                    return Vec::new();
                };
                candidates
                    .iter()
                    .copied()
                    .filter(|id| {
                        self.node(*id)
                            .deps(DepKind::Provides)
                            .iter()
                            .any(|entry| entry_satisfies(dep, entry))
                    })
                    .collect()
            }
            Dep::Rich(rich) => self.rich_providers(rich),
        }
    }

    /// Providers for a rich tree: AND needs both branches satisfiable and
    /// yields their union; OR yields the union of whatever branches resolve.
    fn rich_providers(&self, rich: &RichDep) -> Vec<NodeId> {
        match rich {
            RichDep::Term(dep) => self.providers_of(dep),
            RichDep::And(a, b) => {
                let left = self.rich_providers(a);
                let right = self.rich_providers(b);
                if left.is_empty() || right.is_empty() {
                    Vec::new()
                } else {
                    merge_providers(left, right)
                }
            }
            RichDep::Or(a, b) => merge_providers(self.rich_providers(a), self.rich_providers(b)),
        }
    }

    /// Does a concrete node fall under this expression? Used for obsoletes
    /// matching, which targets node names rather than provides.
    pub fn node_matches(&self, id: NodeId, dep: &Dep) -> bool {
        let node = self.node(id);
        match dep {
            Dep::Name(name) => node.name == *name,
            Dep::Rel { name, op, evr } => {
                node.name == *name
                    && node
                        .evr
                        .as_deref()
                        .is_some_and(|node_evr| op.evaluate(node_evr, evr))
            }
            Dep::Rich(rich) => self.rich_matches(id, rich),
        }
    }

    fn rich_matches(&self, id: NodeId, rich: &RichDep) -> bool {
        match rich {
            RichDep::Term(dep) => self.node_matches(id, dep),
            RichDep::And(a, b) => self.rich_matches(id, a) && self.rich_matches(id, b),
            RichDep::Or(a, b) => self.rich_matches(id, a) || self.rich_matches(id, b),
        }
    }

    /// Selection by name or by provides, the way install jobs address
    /// targets. Returns matches in load order; empty means "not found".
    pub fn select(&self, term: &str) -> Vec<NodeId> {
        let mut matches = self.nodes_by_name(term);
        for id in self.providers_of(&Dep::Name(term.to_string())) {
            if !matches.contains(&id) {
                matches.push(id);
            }
        }
        matches
    }
}

/// Names a provides entry answers for, feeding the whatprovides index.
fn dep_names(dep: &Dep) -> Vec<String> {
    match dep {
        Dep::Name(name) | Dep::Rel { name, .. } => vec![name.clone()],
        Dep::Rich(rich) => {
            let mut names = Vec::new();
            collect_rich_names(rich, &mut names);
            names
        }
    }
}

fn collect_rich_names(rich: &RichDep, out: &mut Vec<String>) {
    match rich {
        RichDep::Term(dep) => out.extend(dep_names(dep)),
        RichDep::And(a, b) | RichDep::Or(a, b) => {
            collect_rich_names(a, out);
            collect_rich_names(b, out);
        }
    }
}

/// Does a provider-side entry satisfy a requirement?
///
/// An unversioned provides answers only name-only requirements; a versioned
/// requirement needs an EVR-equal provides whose EVR passes the operator.
/// Providers constrained by a non-equality operator are matched by name only.
fn entry_satisfies(req: &Dep, entry: &Dep) -> bool {
    match (req, entry) {
        (Dep::Name(want), Dep::Name(have)) => want == have,
        (Dep::Name(want), Dep::Rel { name, .. }) => want == name,
        // versioned requirement, unversioned provider
        (Dep::Rel { .. }, Dep::Name(_)) => false,
        (
            Dep::Rel { name: want, op, evr: wanted },
            Dep::Rel { name: have, op: RelOp::Eq, evr: provided },
        ) => want == have && op.evaluate(provided, wanted),
        (Dep::Rel { name: want, .. }, Dep::Rel { name: have, .. }) => want == have,
        (_, Dep::Rich(rich)) => rich_entry_satisfies(req, rich),
        (Dep::Rich(rich), entry) => rich_req_satisfied(rich, entry),
    }
}

fn rich_entry_satisfies(req: &Dep, rich: &RichDep) -> bool {
    match rich {
        RichDep::Term(dep) => entry_satisfies(req, dep),
        RichDep::And(a, b) | RichDep::Or(a, b) => {
            rich_entry_satisfies(req, a) || rich_entry_satisfies(req, b)
        }
    }
}

fn rich_req_satisfied(rich: &RichDep, entry: &Dep) -> bool {
    match rich {
        RichDep::Term(dep) => entry_satisfies(dep, entry),
        RichDep::And(a, b) | RichDep::Or(a, b) => {
            rich_req_satisfied(a, entry) || rich_req_satisfied(b, entry)
        }
    }
}

/// Union of two provider lists, preserving first-seen order.
fn merge_providers(mut left: Vec<NodeId>, right: Vec<NodeId>) -> Vec<NodeId> {
    for id in right {
        if !left.contains(&id) {
            left.push(id);
        }
    }
    left
}
