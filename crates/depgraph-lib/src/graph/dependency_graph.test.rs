// Tests for the dependency graph data model

use super::*;

// ============================================================================
// Test Utilities
// ============================================================================

/// Build a graph from `(package, [deps])` pairs in the given order
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
// Basic Graph Operations
// ============================================================================

#[test]
fn test_new_graph_is_empty() {
    let graph = DependencyGraph::new();
    assert!(graph.is_empty());
    assert_eq!(graph.len(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_insert_first_write_wins() {
    let mut graph = DependencyGraph::new();

    assert!(graph.insert("A".to_string(), vec!["B".to_string()]));
    assert!(!graph.insert("A".to_string(), vec!["C".to_string()]));

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.dependencies("A"), Some(&["B".to_string()][..]));
}

#[test]
fn test_keys_keep_insertion_order() {
    let graph = graph_of(&[("Z", &[]), ("A", &[]), ("M", &[])]);

    let keys: Vec<&str> = graph.packages().map(String::as_str).collect();
    assert_eq!(keys, vec!["Z", "A", "M"]);
    assert_eq!(graph.index_of("A"), Some(1));
    assert_eq!(graph.index_of("missing"), None);
}

#[test]
fn test_identity_is_case_sensitive() {
    let graph = graph_of(&[("Newtonsoft.Json", &[])]);

    assert!(graph.contains("Newtonsoft.Json"));
    assert!(!graph.contains("newtonsoft.json"));
}

#[test]
fn test_edge_count() {
    let graph = graph_of(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &[]), ("D", &[])]);
    assert_eq!(graph.edge_count(), 3);
}

// ============================================================================
// Depth Boundary Asymmetry
// ============================================================================

#[test]
fn test_boundary_packages_are_values_without_keys() {
    let graph = graph_of(&[("A", &["B", "C"]), ("B", &["D", "C"])]);

    let boundary: Vec<&str> = graph.boundary_packages().into_iter().map(String::as_str).collect();
    assert_eq!(boundary, vec!["C", "D"]);
    assert!(graph.dependencies("C").is_none());
}

#[test]
fn test_dependents_reverse_lookup() {
    let graph = graph_of(&[("A", &["C"]), ("B", &["C"]), ("C", &[])]);

    let dependents: Vec<&str> = graph.dependents("C").into_iter().map(String::as_str).collect();
    assert_eq!(dependents, vec!["A", "B"]);
    assert!(graph.dependents("A").is_empty());
}

// ============================================================================
// petgraph View and Cycle Reporting
// ============================================================================

#[test]
fn test_petgraph_view_includes_boundary_nodes() {
    let graph = graph_of(&[("A", &["B"])]);
    let pg = graph.to_petgraph();

    assert_eq!(pg.node_count(), 2);
    assert_eq!(pg.edge_count(), 1);
}

#[test]
fn test_acyclic_graph_has_no_cycles() {
    let graph = graph_of(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"]), ("D", &[])]);
    assert!(graph.cycles().is_empty());
    assert!(!petgraph::algo::is_cyclic_directed(&graph.to_petgraph()));
}

#[test]
fn test_two_node_cycle_reported_in_key_order() {
    let graph = graph_of(&[("A", &["B"]), ("B", &["A"])]);

    let cycles = graph.cycles();
    assert_eq!(cycles, vec![vec!["A".to_string(), "B".to_string()]]);
}

#[test]
fn test_self_reference_is_a_cycle() {
    let graph = graph_of(&[("A", &["A", "B"]), ("B", &[])]);

    assert_eq!(graph.cycles(), vec![vec!["A".to_string()]]);
}

#[test]
fn test_multiple_cycles_sorted_by_first_member() {
    let graph = graph_of(&[
        ("root", &["x1", "y1"]),
        ("x1", &["x2"]),
        ("y1", &["y2"]),
        ("x2", &["x1"]),
        ("y2", &["y1"]),
    ]);

    let cycles = graph.cycles();
    assert_eq!(cycles.len(), 2);
    assert_eq!(cycles[0], vec!["x1".to_string(), "x2".to_string()]);
    assert_eq!(cycles[1], vec!["y1".to_string(), "y2".to_string()]);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_serializes_as_ordered_json_object() {
    let graph = graph_of(&[("B", &["A"]), ("A", &[])]);

    let json = serde_json::to_string(&graph).unwrap();
    assert_eq!(json, r#"{"B":["A"],"A":[]}"#);

    let parsed: DependencyGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, graph);
}

#[test]
fn test_deserialize_keeps_first_list_for_duplicate_key() {
    let parsed: DependencyGraph =
        serde_json::from_str(r#"{"A":["B"],"B":[],"A":["C"]}"#).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.dependencies("A"), Some(&["B".to_string()][..]));
    assert_eq!(parsed.packages().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn test_deserialize_rejects_non_object() {
    assert!(serde_json::from_str::<DependencyGraph>(r#"["A","B"]"#).is_err());
}
