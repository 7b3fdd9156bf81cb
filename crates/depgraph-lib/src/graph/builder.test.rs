// Tests for breadth-first graph construction

use super::*;
use crate::resolver::{FixtureResolver, MockResolver};
use std::time::Duration;

fn fixture(json: &str) -> FixtureResolver {
    FixtureResolver::from_json(json).unwrap()
}

fn deps(graph: &DependencyGraph, package: &str) -> Option<Vec<String>> {
    graph.dependencies(package).map(<[String]>::to_vec)
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[tokio::test]
async fn test_simple_tree() {
    let resolver = fixture(r#"{"A": ["B", "C"], "B": ["D"], "C": [], "D": []}"#);
    let graph = build_graph("A", &resolver, 3, "").await.unwrap();

    assert_eq!(graph.packages().collect::<Vec<_>>(), vec!["A", "B", "C", "D"]);
    assert_eq!(deps(&graph, "A").unwrap(), vec!["B", "C"]);
    assert_eq!(deps(&graph, "B").unwrap(), vec!["D"]);
    assert!(deps(&graph, "C").unwrap().is_empty());
    assert!(deps(&graph, "D").unwrap().is_empty());

    let order = graph.topological_sort();
    assert!(!order.has_cycle);
    assert_eq!(order.load_order(), vec!["D", "C", "B", "A"]);
}

#[tokio::test]
async fn test_two_node_cycle_terminates() {
    let resolver = fixture(r#"{"A": ["B"], "B": ["A"]}"#);
    let graph = build_graph("A", &resolver, 5, "").await.unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(deps(&graph, "A").unwrap(), vec!["B"]);
    assert_eq!(deps(&graph, "B").unwrap(), vec!["A"]);

    let order = graph.topological_sort();
    assert!(order.order.is_empty());
    assert!(order.has_cycle);
}

#[tokio::test]
async fn test_depth_one_records_boundary_as_value_only() {
    let resolver = fixture(r#"{"A": ["B"], "B": ["C"]}"#);
    let graph = build_graph("A", &resolver, 1, "").await.unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(deps(&graph, "A").unwrap(), vec!["B"]);
    assert!(!graph.contains("B"));
    assert_eq!(graph.boundary_packages(), vec!["B"]);

    let order = graph.topological_sort();
    assert_eq!(order.order, vec!["A"]);
    assert!(!order.has_cycle);
}

#[tokio::test]
async fn test_filter_drops_matching_dependencies() {
    let resolver = fixture(r#"{"A": ["Test.Lib", "Core"]}"#);
    let graph = build_graph("A", &resolver, 1, "test").await.unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(deps(&graph, "A").unwrap(), vec!["Core"]);
}

// ============================================================================
// Traversal Semantics
// ============================================================================

#[tokio::test]
async fn test_each_package_resolved_once() {
    let resolver = MockResolver::new()
        .with_dependencies("A", &["B", "C"])
        .with_dependencies("B", &["D"])
        .with_dependencies("C", &["D"])
        .with_dependencies("D", &["A"]);

    let traversal = GraphBuilder::new(10, "").unwrap().build("A", &resolver).await;

    assert!(traversal.is_complete());
    assert_eq!(resolver.calls().await, vec!["A", "B", "C", "D"]);
    for package in ["A", "B", "C", "D"] {
        assert_eq!(resolver.call_count(package).await, 1);
    }
    assert_eq!(deps(&traversal.graph, "D").unwrap(), vec!["A"]);
}

#[tokio::test]
async fn test_self_edge_is_recorded_without_looping() {
    let resolver = MockResolver::new().with_dependencies("A", &["A", "B"]);

    let traversal = GraphBuilder::new(3, "").unwrap().build("A", &resolver).await;

    assert_eq!(deps(&traversal.graph, "A").unwrap(), vec!["A", "B"]);
    assert_eq!(resolver.call_count("A").await, 1);
}

#[tokio::test]
async fn test_depth_boundary_is_not_resolved() {
    let resolver = MockResolver::new()
        .with_dependencies("A", &["B"])
        .with_dependencies("B", &["C"])
        .with_dependencies("C", &["D"]);

    let traversal = GraphBuilder::new(2, "").unwrap().build("A", &resolver).await;

    assert_eq!(traversal.graph.packages().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(traversal.graph.boundary_packages(), vec!["C"]);
    assert_eq!(resolver.call_count("C").await, 0);
    assert!(traversal.is_complete());
}

#[tokio::test]
async fn test_failures_become_leaves_with_reason() {
    let resolver = MockResolver::new()
        .with_dependencies("A", &["B", "C"])
        .with_failure(
            "B",
            ResolutionError::Unreachable {
                package: "B".to_string(),
                reason: "connection reset".to_string(),
            },
        )
        .with_dependencies("C", &[]);

    let traversal = GraphBuilder::new(3, "").unwrap().build("A", &resolver).await;

    assert_eq!(traversal.graph.len(), 3);
    assert!(deps(&traversal.graph, "B").unwrap().is_empty());
    assert!(!traversal.is_complete());
    assert_eq!(traversal.failures.len(), 1);
    assert!(matches!(
        traversal.failures.get("B"),
        Some(ResolutionError::Unreachable { reason, .. }) if reason == "connection reset"
    ));
}

#[tokio::test]
async fn test_unknown_start_package_yields_single_leaf() {
    let resolver = MockResolver::new();

    let traversal = GraphBuilder::new(3, "").unwrap().build("Ghost", &resolver).await;

    assert_eq!(traversal.graph.len(), 1);
    assert!(deps(&traversal.graph, "Ghost").unwrap().is_empty());
    assert!(matches!(
        traversal.failures.get("Ghost"),
        Some(ResolutionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_ids_differing_by_case_are_distinct_nodes() {
    let resolver = MockResolver::new()
        .with_dependencies("Foo", &["foo"])
        .with_dependencies("foo", &[]);

    let traversal = GraphBuilder::new(3, "").unwrap().build("Foo", &resolver).await;

    assert_eq!(traversal.graph.packages().collect::<Vec<_>>(), vec!["Foo", "foo"]);
}

// ============================================================================
// Filter
// ============================================================================

#[tokio::test]
async fn test_filter_is_case_insensitive_and_prunes_subtrees() {
    let resolver = MockResolver::new()
        .with_dependencies("A", &["XUnit.TESTING", "Core"])
        .with_dependencies("XUnit.TESTING", &["Hidden"])
        .with_dependencies("Core", &[]);

    let traversal = GraphBuilder::new(5, "Test").unwrap().build("A", &resolver).await;

    assert_eq!(traversal.graph.packages().collect::<Vec<_>>(), vec!["A", "Core"]);
    assert_eq!(resolver.call_count("XUnit.TESTING").await, 0);
    assert_eq!(resolver.call_count("Hidden").await, 0);
}

#[tokio::test]
async fn test_filter_never_applies_to_start_package() {
    let resolver = MockResolver::new()
        .with_dependencies("TestApp", &["Core", "TestHelpers"])
        .with_dependencies("Core", &[]);

    let traversal = GraphBuilder::new(3, "test").unwrap().build("TestApp", &resolver).await;

    assert_eq!(deps(&traversal.graph, "TestApp").unwrap(), vec!["Core"]);
}

#[tokio::test]
async fn test_empty_filter_keeps_everything() {
    let builder = GraphBuilder::new(3, "").unwrap();
    assert!(!builder.is_filtered("anything"));
    assert!(!builder.is_filtered(""));

    let resolver = MockResolver::new().with_dependencies("A", &["Test.Lib"]);
    let traversal = builder.build("A", &resolver).await;
    assert_eq!(deps(&traversal.graph, "A").unwrap(), vec!["Test.Lib"]);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_zero_depth_rejected_before_lookup() {
    let resolver = MockResolver::new().with_dependencies("A", &[]);

    let result = build_graph("A", &resolver, 0, "").await;

    assert!(matches!(result, Err(ConfigError::InvalidMaxDepth { value: 0 })));
    assert!(resolver.calls().await.is_empty());
}

#[test]
fn test_builder_accessors() {
    let builder = GraphBuilder::new(4, "Abc").unwrap().with_concurrency(0);
    assert_eq!(builder.max_depth(), 4);
    assert_eq!(builder.concurrency(), 1);
    assert!(builder.is_filtered("xABCx"));
}

// ============================================================================
// Concurrency
// ============================================================================

fn wide_resolver() -> MockResolver {
    MockResolver::new()
        .with_dependencies("Root", &["A", "B", "C", "D"])
        .with_dependencies("A", &["Shared", "A1"])
        .with_dependencies("B", &["Shared"])
        .with_dependencies("C", &["C1", "Root"])
        .with_dependencies("D", &[])
        .with_dependencies("Shared", &["Leaf"])
        .with_dependencies("A1", &[])
        .with_dependencies("C1", &["Leaf"])
        .with_dependencies("Leaf", &[])
        .with_delay(Duration::from_millis(20))
}

#[tokio::test]
async fn test_concurrent_build_matches_serial_build() {
    let serial_resolver = wide_resolver();
    let serial = GraphBuilder::new(10, "")
        .unwrap()
        .build("Root", &serial_resolver)
        .await;

    let parallel_resolver = wide_resolver();
    let parallel = GraphBuilder::new(10, "")
        .unwrap()
        .with_concurrency(4)
        .build("Root", &parallel_resolver)
        .await;

    assert_eq!(serial.graph, parallel.graph);
    assert_eq!(
        serial.graph.packages().collect::<Vec<_>>(),
        parallel.graph.packages().collect::<Vec<_>>()
    );
    assert_eq!(serial_resolver.peak_concurrency(), 1);
    assert!(parallel_resolver.peak_concurrency() > 1);
    assert!(parallel_resolver.peak_concurrency() <= 4);

    for package in ["Root", "Shared", "Leaf"] {
        assert_eq!(parallel_resolver.call_count(package).await, 1);
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet, VecDeque};

    const NAMES: [&str; 8] = ["App", "Core", "core.Extra", "Sys.A", "sys.b", "Lib", "LIB.x", "Tool"];

    type Universe = Vec<(usize, Vec<usize>)>;

    fn arb_universe() -> impl Strategy<Value = Universe> {
        prop::collection::vec(
            (0..NAMES.len(), prop::collection::vec(0..NAMES.len(), 0..4)),
            0..10,
        )
    }

    /// First list per name wins, as in a real repository
    fn adjacency(universe: &Universe) -> HashMap<&'static str, Vec<&'static str>> {
        let mut lists: HashMap<&str, Vec<&str>> = HashMap::new();
        for (key, deps) in universe {
            lists
                .entry(NAMES[*key])
                .or_insert_with(|| deps.iter().map(|dep| NAMES[*dep]).collect());
        }
        lists
    }

    fn resolver_for(universe: &Universe) -> MockResolver {
        adjacency(universe)
            .into_iter()
            .fold(MockResolver::new(), |resolver, (package, deps)| {
                resolver.with_dependencies(package, &deps)
            })
    }

    fn matches_filter(package: &str, filter: &str) -> bool {
        !filter.is_empty() && package.to_lowercase().contains(&filter.to_lowercase())
    }

    /// Hop distance from `start` over unfiltered edges
    fn distances(universe: &Universe, start: &str, filter: &str) -> HashMap<String, u32> {
        let lists = adjacency(universe);
        let mut dist = HashMap::from([(start.to_string(), 0)]);
        let mut queue = VecDeque::from([start]);
        while let Some(package) = queue.pop_front() {
            let next = dist[package] + 1;
            for dep in lists.get(package).into_iter().flatten() {
                if matches_filter(dep, filter) || dist.contains_key(*dep) {
                    continue;
                }
                dist.insert(dep.to_string(), next);
                queue.push_back(*dep);
            }
        }
        dist
    }

    fn build(
        universe: &Universe,
        start: &str,
        max_depth: u32,
        filter: &str,
    ) -> (Traversal, Vec<PackageId>) {
        let resolver = resolver_for(universe);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let traversal = GraphBuilder::new(max_depth, filter)
                .unwrap()
                .with_concurrency(3)
                .build(start, &resolver)
                .await;
            (traversal, resolver.calls().await)
        })
    }

    proptest! {
        #[test]
        fn prop_each_package_resolved_at_most_once(
            universe in arb_universe(),
            start in 0..NAMES.len(),
            max_depth in 1u32..6,
        ) {
            let (traversal, calls) = build(&universe, NAMES[start], max_depth, "");

            let unique: HashSet<&PackageId> = calls.iter().collect();
            prop_assert_eq!(unique.len(), calls.len());
            prop_assert_eq!(calls.len(), traversal.graph.len());
        }

        #[test]
        fn prop_keys_are_exactly_packages_within_depth(
            universe in arb_universe(),
            start in 0..NAMES.len(),
            max_depth in 1u32..6,
            filter in prop::sample::select(vec!["", "sys", "LIB", "x"]),
        ) {
            let (traversal, _) = build(&universe, NAMES[start], max_depth, filter);

            let expected: HashSet<String> = distances(&universe, NAMES[start], filter)
                .into_iter()
                .filter(|(_, dist)| *dist < max_depth)
                .map(|(package, _)| package)
                .collect();
            let keys: HashSet<String> = traversal.graph.packages().cloned().collect();

            prop_assert_eq!(keys, expected);
            prop_assert_eq!(traversal.graph.packages().next().map(String::as_str), Some(NAMES[start]));
        }

        #[test]
        fn prop_filtered_packages_never_appear(
            universe in arb_universe(),
            start in 0..NAMES.len(),
            filter in prop::sample::select(vec!["sys", "LIB", "core", "x"]),
        ) {
            let (traversal, _) = build(&universe, NAMES[start], 5, filter);

            for (package, deps) in traversal.graph.iter() {
                if package != NAMES[start] {
                    prop_assert!(!matches_filter(package, filter), "{} kept as key", package);
                }
                for dep in deps {
                    prop_assert!(!matches_filter(dep, filter), "{} kept as edge", dep);
                }
            }
        }
    }
}
