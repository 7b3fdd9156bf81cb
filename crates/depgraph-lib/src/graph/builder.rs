//! Depth-bounded breadth-first graph construction
//!
//! The builder drives a FIFO queue of `(package, depth)` pairs over a
//! [`DependencyResolver`]. Every package is dequeued for resolution at most once;
//! that visited check is also what breaks cycles. Resolver failures degrade the
//! affected package to a leaf and never abort the traversal.

use crate::graph::DependencyGraph;
use crate::primitives::{ConfigError, PackageId, ResolutionError};
use crate::resolver::DependencyResolver;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace, warn};

/// Result of one traversal
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// Adjacency map of every package resolved within the depth limit
    pub graph: DependencyGraph,
    /// Packages whose lookup failed, with the reason. Each of them is also a
    /// key of `graph` with an empty dependency list.
    pub failures: IndexMap<PackageId, ResolutionError>,
}

impl Traversal {
    /// True when every lookup succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_graph(self) -> DependencyGraph {
        self.graph
    }
}

/// Breadth-first dependency graph builder
///
/// # Depth semantics
///
/// The start package has depth 0. A package dequeued at `depth >= max_depth`
/// is marked visited but neither resolved nor recorded as a key; it can still
/// appear in its parent's dependency list.
///
/// # Examples
///
/// ```no_run
/// use depgraph_lib::graph::GraphBuilder;
/// use depgraph_lib::resolver::FixtureResolver;
///
/// # async fn example() {
/// let resolver = FixtureResolver::from_json(r#"{"A": ["B"], "B": []}"#).unwrap();
/// let builder = GraphBuilder::new(3, "").unwrap();
///
/// let traversal = builder.build("A", &resolver).await;
/// assert_eq!(traversal.graph.len(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    max_depth: u32,
    /// Lower-cased filter needle; `None` when filtering is disabled
    filter: Option<String>,
    concurrency: usize,
}

impl GraphBuilder {
    /// Create a builder.
    ///
    /// `filter` drops every dependency whose id contains it, case-insensitively.
    /// An empty filter disables filtering.
    pub fn new(max_depth: u32, filter: &str) -> Result<Self, ConfigError> {
        if max_depth < 1 {
            return Err(ConfigError::InvalidMaxDepth {
                value: i64::from(max_depth),
            });
        }

        let filter = (!filter.is_empty()).then(|| filter.to_lowercase());

        Ok(Self {
            max_depth,
            filter,
            concurrency: 1,
        })
    }

    /// Resolve up to `concurrency` packages of the same depth level at once.
    ///
    /// The resulting graph is identical to a serial traversal: visited checks
    /// happen on the driving task before dispatch, and results are recorded in
    /// queue order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Check a package id against the filter
    pub fn is_filtered(&self, package: &str) -> bool {
        match &self.filter {
            Some(needle) => package.to_lowercase().contains(needle.as_str()),
            None => false,
        }
    }

    /// Traverse the dependency graph rooted at `start`
    pub async fn build<R>(&self, start: &str, resolver: &R) -> Traversal
    where
        R: DependencyResolver,
    {
        debug!(
            start = %start,
            max_depth = self.max_depth,
            filter = ?self.filter,
            concurrency = self.concurrency,
            "Building dependency graph"
        );

        let mut traversal = Traversal::default();
        let mut visited: HashSet<PackageId> = HashSet::new();
        let mut queue: VecDeque<(PackageId, u32)> = VecDeque::new();
        queue.push_back((start.to_string(), 0));

        // FIFO order keeps every entry of one depth ahead of the next depth,
        // so the queue can be drained a level at a time.
        while let Some(depth) = queue.front().map(|(_, depth)| *depth) {
            let mut level = Vec::new();

            while queue.front().is_some_and(|(_, d)| *d == depth) {
                let Some((package, _)) = queue.pop_front() else {
                    break;
                };

                if !visited.insert(package.clone()) {
                    trace!("Already visited: {}", package);
                    continue;
                }

                if depth >= self.max_depth {
                    trace!("Depth boundary reached at {}: {}", depth, package);
                    continue;
                }

                level.push(package);
            }

            let results = self.resolve_level(resolver, &level).await;

            for (package, result) in level.into_iter().zip(results) {
                let dependencies = match result {
                    Ok(dependencies) => dependencies,
                    Err(error) => {
                        warn!(package = %package, error = %error, "Dependency lookup failed, treating package as a leaf");
                        traversal.failures.insert(package.clone(), error);
                        Vec::new()
                    }
                };

                let dependencies = self.apply_filter(&package, dependencies);

                for dependency in &dependencies {
                    if !visited.contains(dependency) {
                        queue.push_back((dependency.clone(), depth + 1));
                    }
                }

                trace!("Resolved {} at depth {}: {:?}", package, depth, dependencies);
                traversal.graph.insert(package, dependencies);
            }
        }

        debug!(
            packages = traversal.graph.len(),
            edges = traversal.graph.edge_count(),
            failures = traversal.failures.len(),
            "Dependency graph built"
        );

        traversal
    }

    /// Resolve one level, at most `concurrency` lookups in flight, results in input order
    async fn resolve_level<R>(
        &self,
        resolver: &R,
        level: &[PackageId],
    ) -> Vec<Result<Vec<PackageId>, ResolutionError>>
    where
        R: DependencyResolver,
    {
        stream::iter(level)
            .map(|package| resolver.resolve(package))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    fn apply_filter(&self, package: &str, dependencies: Vec<PackageId>) -> Vec<PackageId> {
        if self.filter.is_none() {
            return dependencies;
        }

        dependencies
            .into_iter()
            .filter(|dependency| {
                let dropped = self.is_filtered(dependency);
                if dropped {
                    trace!("Filtered out {} (required by {})", dependency, package);
                }
                !dropped
            })
            .collect()
    }
}

/// Build the graph rooted at `start` in one call.
///
/// Rejects `max_depth < 1` before any lookup happens.
pub async fn build_graph<R>(
    start: &str,
    resolver: &R,
    max_depth: u32,
    filter: &str,
) -> Result<DependencyGraph, ConfigError>
where
    R: DependencyResolver,
{
    let builder = GraphBuilder::new(max_depth, filter)?;
    Ok(builder.build(start, resolver).await.into_graph())
}

#[cfg(test)]
mod tests {
    include!("builder.test.rs");
}
