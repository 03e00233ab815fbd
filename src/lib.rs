// src/lib.rs

//! depsolv
//!
//! Projects heterogeneous package metadata records (RPMs, source packages,
//! errata) into nodes of a multi-graph dependency pool, compiles their
//! versioned dependency expressions, answers transitive closure queries, and
//! interprets solve results as classified install/upgrade/obsolete
//! operations.
//!
//! # Architecture
//!
//! - Units: JSON documents from the SQLite store, read through one narrow
//!   field-reader capability
//! - Projection: per-kind ordered step lists turn a unit into one node
//! - Pool: all graphs share one node id namespace, one identity registry,
//!   and one installed/baseline designation
//! - Solving: selections become install jobs; a solve returns a transaction
//!   or the complete problem list

pub mod closure;
pub mod db;
mod error;
pub mod evr;
pub mod graph;
pub mod loader;
pub mod project;
pub mod registry;
pub mod report;
pub mod solver;
pub mod unit;

pub use error::{Error, Result};
pub use evr::{format_evr, Evr};
pub use graph::dep::{Dep, RelOp, RichDep};
pub use graph::{DepKind, Graph, GraphId, Node, NodeId, Pool};
pub use loader::load_units;
pub use project::factory::NodeFactory;
pub use registry::Registry;
pub use report::{interpret, OperationReport};
pub use solver::transaction::{ClassifyMode, OpClass, Transaction};
pub use solver::{job_for_unit, select, Job, Problem, Selection, Solver};
pub use unit::{FieldSource, Unit, UnitKind};
