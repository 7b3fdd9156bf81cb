//! Dependency graph produced by a traversal
//!
//! Keys are exactly the packages that were visited and resolved within the
//! depth limit, in the order they were resolved. A package may appear only as
//! an edge target when it was discovered at the depth boundary; such packages
//! are never keys and are exposed through [`DependencyGraph::boundary_packages`].

use crate::graph::topo::{TopoOrder, TopologicalSorter};
use crate::primitives::PackageId;
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Insertion-ordered adjacency map `package -> direct dependencies`
///
/// Serializes as a JSON object in key order. Deserialization goes through
/// [`DependencyGraph::insert`], so a duplicated key keeps its first list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: IndexMap<PackageId, Vec<PackageId>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self {
            edges: IndexMap::new(),
        }
    }

    /// Record the dependency list of a package.
    ///
    /// The first recorded list wins: returns `false` and leaves the graph
    /// untouched when `package` is already a key.
    pub fn insert(&mut self, package: PackageId, dependencies: Vec<PackageId>) -> bool {
        if self.edges.contains_key(&package) {
            trace!("Package already recorded: {}", package);
            return false;
        }

        self.edges.insert(package, dependencies);
        true
    }

    /// Recorded direct dependencies of a package, if it is a key
    pub fn dependencies(&self, package: &str) -> Option<&[PackageId]> {
        self.edges.get(package).map(Vec::as_slice)
    }

    /// Check if a package is a key of the graph
    pub fn contains(&self, package: &str) -> bool {
        self.edges.contains_key(package)
    }

    /// Keys in resolution order
    pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
        self.edges.keys()
    }

    /// `(package, dependencies)` pairs in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (&PackageId, &[PackageId])> {
        self.edges.iter().map(|(package, deps)| (package, deps.as_slice()))
    }

    /// Position of a key in resolution order
    pub fn index_of(&self, package: &str) -> Option<usize> {
        self.edges.get_index_of(package)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of recorded edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Packages that appear as dependencies but were never resolved themselves,
    /// in first-seen order
    pub fn boundary_packages(&self) -> Vec<&PackageId> {
        let mut seen = IndexSet::new();
        for deps in self.edges.values() {
            for dep in deps {
                if !self.edges.contains_key(dep) {
                    seen.insert(dep);
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Keys that list `package` as a direct dependency (reverse lookup)
    pub fn dependents(&self, package: &str) -> Vec<&PackageId> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.iter().any(|dep| dep == package))
            .map(|(key, _)| key)
            .collect()
    }

    /// Linearize with [`TopologicalSorter`]
    pub fn topological_sort(&self) -> TopoOrder {
        TopologicalSorter::sort(self)
    }

    /// Build a petgraph view: one node per key, then one per boundary package.
    /// Edges point from a package to each of its dependencies.
    pub fn to_petgraph(&self) -> DiGraph<&str, ()> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for package in self.edges.keys() {
            nodes.insert(package.as_str(), graph.add_node(package.as_str()));
        }
        for package in self.boundary_packages() {
            nodes.insert(package.as_str(), graph.add_node(package.as_str()));
        }

        for (package, deps) in &self.edges {
            let from = nodes[package.as_str()];
            for dep in deps {
                graph.add_edge(from, nodes[dep.as_str()], ());
            }
        }

        graph
    }

    /// Detect dependency cycles.
    ///
    /// Returns every strongly connected component with more than one member,
    /// plus self-referencing packages. Members and components follow resolution order.
    pub fn cycles(&self) -> Vec<Vec<PackageId>> {
        let graph = self.to_petgraph();

        let mut cycles: Vec<Vec<PackageId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut members: Vec<PackageId> = component
                    .into_iter()
                    .map(|idx| graph[idx].to_string())
                    .collect();
                members.sort_by_key(|member| self.index_of(member));
                members
            })
            .collect();

        cycles.sort_by_key(|members| self.index_of(&members[0]));
        cycles
    }
}

impl FromIterator<(PackageId, Vec<PackageId>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (PackageId, Vec<PackageId>)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (package, deps) in iter {
            graph.insert(package, deps);
        }
        graph
    }
}

impl<'de> Deserialize<'de> for DependencyGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GraphVisitor;

        impl<'de> Visitor<'de> for GraphVisitor {
            type Value = DependencyGraph;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of package ids to dependency lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut graph = DependencyGraph::new();
                while let Some((package, dependencies)) =
                    map.next_entry::<PackageId, Vec<PackageId>>()?
                {
                    graph.insert(package, dependencies);
                }
                Ok(graph)
            }
        }

        deserializer.deserialize_map(GraphVisitor)
    }
}

#[cfg(test)]
mod tests {
    include!("dependency_graph.test.rs");
}
