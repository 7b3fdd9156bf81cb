//! Topological ordering (Kahn's algorithm)
//!
//! Only keys of the graph are ever enqueued, so packages recorded solely as
//! edge targets (the depth boundary) never appear in the output.

use crate::graph::DependencyGraph;
use crate::primitives::PackageId;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Linearization of a dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopoOrder {
    /// Emission order: every package precedes the recorded dependencies it reaches
    pub order: Vec<PackageId>,
    /// True when some keys could not be ordered because of a cycle
    pub has_cycle: bool,
}

impl TopoOrder {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of `package` in emission order
    pub fn position(&self, package: &str) -> Option<usize> {
        self.order.iter().position(|p| p == package)
    }

    /// Emission order reversed, so dependencies come before their dependents
    pub fn load_order(&self) -> Vec<PackageId> {
        self.order.iter().rev().cloned().collect()
    }

    /// Keys of `graph` missing from the order (in or behind a cycle), in key order
    pub fn unordered<'g>(&self, graph: &'g DependencyGraph) -> Vec<&'g PackageId> {
        let ordered: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        graph
            .packages()
            .filter(|package| !ordered.contains(package.as_str()))
            .collect()
    }
}

/// Kahn's algorithm over a [`DependencyGraph`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Linearize `graph`.
    ///
    /// Packages nothing depends on are emitted first. Ties follow FIFO order,
    /// seeded in key insertion order, so output is deterministic.
    /// A cycle is reported through `has_cycle` and never fails the sort.
    pub fn sort(graph: &DependencyGraph) -> TopoOrder {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for (_, deps) in graph.iter() {
            for dep in deps {
                *in_degree.entry(dep.as_str()).or_default() += 1;
            }
        }

        let mut queue: VecDeque<&PackageId> = graph
            .packages()
            .filter(|package| !in_degree.contains_key(package.as_str()))
            .collect();

        let mut order = Vec::with_capacity(graph.len());

        while let Some(package) = queue.pop_front() {
            order.push(package.clone());

            for dep in graph.dependencies(package).unwrap_or_default() {
                let Some(degree) = in_degree.get_mut(dep.as_str()) else {
                    continue;
                };
                *degree -= 1;

                if *degree == 0 && graph.contains(dep) {
                    queue.push_back(dep);
                }
            }
        }

        let has_cycle = order.len() < graph.len();
        let result = TopoOrder { order, has_cycle };

        if has_cycle {
            let unordered = result.unordered(graph);
            warn!(
                ordered = result.len(),
                unordered = unordered.len(),
                "Dependency cycle detected; order is partial, missing: {:?}",
                unordered
            );
        } else {
            debug!(packages = result.len(), "Topological order computed");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    include!("topo.test.rs");
}
