//! # Graph Module
//!
//! Dependency graph construction and ordering.
//!
//! ## Modules
//!
//! - [`dependency_graph`] - Adjacency map from a package to its recorded direct dependencies
//! - [`builder`] - Depth-bounded, cycle-safe breadth-first traversal over a resolver
//! - [`topo`] - Kahn's algorithm linearization with cycle reporting

pub mod builder;
pub mod dependency_graph;
pub mod topo;

pub use builder::{GraphBuilder, Traversal, build_graph};
pub use dependency_graph::DependencyGraph;
pub use topo::{TopoOrder, TopologicalSorter};
