// Tests for Kahn's algorithm ordering

use super::*;
use proptest::prelude::*;

fn graph_of(entries: &[(&str, &[&str])]) -> DependencyGraph {
    entries
        .iter()
        .map(|(package, deps)| {
            (
                package.to_string(),
                deps.iter().map(|d| d.to_string()).collect(),
            )
        })
        .collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_diamond_free_chain() {
    let graph = graph_of(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &[]), ("D", &[])]);
    let result = TopologicalSorter::sort(&graph);

    assert!(!result.has_cycle);
    assert_eq!(result.order, vec!["A", "B", "C", "D"]);
    assert_eq!(result.load_order(), vec!["D", "C", "B", "A"]);
}

#[test]
fn test_diamond_waits_for_all_dependents() {
    let graph = graph_of(&[
        ("App", &["Left", "Right"]),
        ("Left", &["Core"]),
        ("Right", &["Core"]),
        ("Core", &[]),
    ]);
    let result = TopologicalSorter::sort(&graph);

    assert!(!result.has_cycle);
    assert_eq!(result.order.last().map(String::as_str), Some("Core"));
    assert!(result.position("Left") < result.position("Core"));
    assert!(result.position("Right") < result.position("Core"));
}

#[test]
fn test_ties_follow_key_order() {
    let graph = graph_of(&[("Z", &[]), ("M", &[]), ("A", &[])]);
    assert_eq!(TopologicalSorter::sort(&graph).order, vec!["Z", "M", "A"]);
}

#[test]
fn test_empty_graph() {
    let result = TopologicalSorter::sort(&DependencyGraph::new());
    assert!(result.is_empty());
    assert!(!result.has_cycle);
}

// ============================================================================
// Boundary Packages
// ============================================================================

#[test]
fn test_boundary_values_are_never_emitted() {
    // Depth limit reached: B was recorded as a dependency but never resolved
    let graph = graph_of(&[("A", &["B"])]);
    let result = TopologicalSorter::sort(&graph);

    assert_eq!(result.order, vec!["A"]);
    assert!(!result.has_cycle);
    assert_eq!(result.position("B"), None);
}

#[test]
fn test_boundary_value_shared_by_keys() {
    let graph = graph_of(&[("A", &["B", "X"]), ("B", &["X"])]);
    let result = TopologicalSorter::sort(&graph);

    assert_eq!(result.order, vec!["A", "B"]);
    assert!(!result.has_cycle);
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn test_two_node_cycle_yields_empty_order() {
    let graph = graph_of(&[("A", &["B"]), ("B", &["A"])]);
    let result = TopologicalSorter::sort(&graph);

    assert!(result.order.is_empty());
    assert!(result.has_cycle);
    assert_eq!(result.unordered(&graph), vec!["A", "B"]);
}

#[test]
fn test_partial_order_excludes_cycle_and_everything_behind_it() {
    let graph = graph_of(&[
        ("Root", &["X", "Free"]),
        ("X", &["Y"]),
        ("Y", &["X", "Tail"]),
        ("Free", &[]),
        ("Tail", &[]),
    ]);
    let result = TopologicalSorter::sort(&graph);

    assert!(result.has_cycle);
    assert_eq!(result.order, vec!["Root", "Free"]);
    assert_eq!(result.unordered(&graph), vec!["X", "Y", "Tail"]);
}

#[test]
fn test_self_edge_is_a_cycle() {
    let graph = graph_of(&[("A", &["A"])]);
    let result = TopologicalSorter::sort(&graph);

    assert!(result.order.is_empty());
    assert!(result.has_cycle);
}

#[test]
fn test_serializes_order_and_flag() {
    let graph = graph_of(&[("A", &["B"]), ("B", &[])]);
    let json = serde_json::to_value(TopologicalSorter::sort(&graph)).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "order": ["A", "B"], "has_cycle": false })
    );
}

// ============================================================================
// Properties
// ============================================================================

/// Random graphs over a small id space, with ids that are sometimes values only
fn arb_graph() -> impl Strategy<Value = DependencyGraph> {
    prop::collection::vec(
        (0..6usize, prop::collection::vec(0..8usize, 0..4)),
        0..8,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, deps)| {
                (
                    format!("P{key}"),
                    deps.into_iter().map(|dep| format!("P{dep}")).collect(),
                )
            })
            .collect::<DependencyGraph>()
    })
}

proptest! {
    #[test]
    fn prop_order_respects_every_recorded_edge(graph in arb_graph()) {
        let result = TopologicalSorter::sort(&graph);

        for (package, deps) in graph.iter() {
            let Some(from) = result.position(package) else { continue };
            for dep in deps {
                if let Some(to) = result.position(dep) {
                    prop_assert!(from < to, "{} must precede {}", package, dep);
                }
            }
        }
    }

    #[test]
    fn prop_order_is_a_subset_of_keys_without_repeats(graph in arb_graph()) {
        let result = TopologicalSorter::sort(&graph);

        let unique: HashSet<&PackageId> = result.order.iter().collect();
        prop_assert_eq!(unique.len(), result.order.len());
        prop_assert!(result.order.iter().all(|package| graph.contains(package)));
        prop_assert_eq!(result.order.len() + result.unordered(&graph).len(), graph.len());
    }

    #[test]
    fn prop_cycle_flag_matches_cycle_detection(graph in arb_graph()) {
        let result = TopologicalSorter::sort(&graph);
        prop_assert_eq!(result.has_cycle, !graph.cycles().is_empty());
    }
}
