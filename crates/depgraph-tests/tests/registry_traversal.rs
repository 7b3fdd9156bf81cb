//! E2E tests for traversal against a NuGet v3 registry
//!
//! A local mockito server plays the registry, so the full HTTP path
//! (service index discovery, registration pages, gzip bodies) is exercised
//! without touching the network.

use anyhow::Result;
use depgraph_lib::application::cli::{Commands, TraversalArgs};
use depgraph_lib::application::commands::execute_command_with_output;
use depgraph_lib::application::config::AppConfig;
use depgraph_lib::graph::GraphBuilder;
use depgraph_lib::networking::NetworkingConfig;
use depgraph_lib::primitives::{ResolutionError, ResolverMode};
use depgraph_lib::resolver::{Resolver, ResolverConfig};
use depgraph_tests::{MockRegistry, PageLayout};

fn connect(registry: &MockRegistry) -> Result<Resolver> {
    let config = ResolverConfig::new(ResolverMode::Registry, registry.index_url());
    Ok(config.connect(&NetworkingConfig::default())?)
}

fn args(registry: &MockRegistry, package: &str, max_depth: i64) -> TraversalArgs {
    TraversalArgs {
        package: package.to_string(),
        repo: registry.index_url(),
        mode: ResolverMode::Registry,
        max_depth,
        filter: String::new(),
    }
}

/// A small tree where every layout variant takes part
#[tokio::test]
async fn e2e_registry_graph_across_page_layouts() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    registry
        .publish("App", &["Serilog", "Newtonsoft.Json"], PageLayout::Inline)
        .await;
    registry
        .publish("Serilog", &["System.Memory"], PageLayout::Remote)
        .await;
    registry
        .publish("Newtonsoft.Json", &[], PageLayout::Gzip)
        .await;
    registry
        .publish("System.Memory", &[], PageLayout::Inline)
        .await;

    let resolver = connect(&registry)?;
    let traversal = GraphBuilder::new(5, "")?.build("App", &resolver).await;

    assert!(traversal.is_complete(), "failures: {:?}", traversal.failures);

    let graph = traversal.graph;
    assert_eq!(
        graph.packages().map(String::as_str).collect::<Vec<_>>(),
        vec!["App", "Serilog", "Newtonsoft.Json", "System.Memory"]
    );
    assert_eq!(
        graph.dependencies("App"),
        Some(&["Serilog".to_string(), "Newtonsoft.Json".to_string()][..])
    );
    assert_eq!(
        graph.dependencies("Serilog"),
        Some(&["System.Memory".to_string()][..])
    );
    assert_eq!(graph.dependencies("Newtonsoft.Json"), Some(&[][..]));

    Ok(())
}

/// The newest (last) version decides the dependencies
#[tokio::test]
async fn e2e_registry_uses_latest_version() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    registry
        .publish_versions(
            "Lib",
            &[("1.0.0", &["Old.Dep"]), ("2.0.0", &["New.Dep"])],
            PageLayout::Remote,
        )
        .await;
    registry.publish("New.Dep", &[], PageLayout::Inline).await;

    let resolver = connect(&registry)?;
    let traversal = GraphBuilder::new(3, "")?.build("Lib", &resolver).await;

    assert_eq!(
        traversal.graph.dependencies("Lib"),
        Some(&["New.Dep".to_string()][..])
    );
    assert!(!traversal.graph.contains("Old.Dep"));

    Ok(())
}

/// Missing and failing packages become leaves; the traversal goes on
#[tokio::test]
async fn e2e_registry_failures_degrade_to_leaves() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    registry
        .publish("App", &["Gone", "Broken", "Fine"], PageLayout::Inline)
        .await;
    registry.fail("Gone", 404).await;
    registry.fail("Broken", 503).await;
    registry.publish("Fine", &[], PageLayout::Inline).await;

    let resolver = connect(&registry)?;
    let traversal = GraphBuilder::new(3, "")?.build("App", &resolver).await;

    assert_eq!(traversal.graph.len(), 4);
    assert_eq!(traversal.graph.dependencies("Gone"), Some(&[][..]));
    assert_eq!(traversal.graph.dependencies("Broken"), Some(&[][..]));

    assert!(matches!(
        traversal.failures.get("Gone"),
        Some(ResolutionError::NotFound { .. })
    ));
    assert!(matches!(
        traversal.failures.get("Broken"),
        Some(ResolutionError::Unreachable { .. })
    ));
    assert!(!traversal.failures.contains_key("Fine"));

    Ok(())
}

/// An unknown start package is still recorded, as a leaf
#[tokio::test]
async fn e2e_registry_start_package_unknown() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    registry.fail("Nope", 404).await;

    let resolver = connect(&registry)?;
    let traversal = GraphBuilder::new(3, "")?.build("Nope", &resolver).await;

    assert_eq!(traversal.graph.len(), 1);
    assert_eq!(traversal.graph.dependencies("Nope"), Some(&[][..]));
    assert_eq!(traversal.failures.len(), 1);

    Ok(())
}

/// Parallel lookups produce the same graph as serial ones
#[tokio::test]
async fn e2e_registry_concurrency_is_deterministic() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    let leaves: Vec<String> = (0..12).map(|i| format!("Leaf.{i:02}")).collect();
    let leaf_refs: Vec<&str> = leaves.iter().map(String::as_str).collect();

    registry.publish("Root", &leaf_refs, PageLayout::Inline).await;
    for leaf in &leaf_refs {
        registry.publish(leaf, &["Shared"], PageLayout::Gzip).await;
    }
    registry.publish("Shared", &[], PageLayout::Remote).await;

    let resolver = connect(&registry)?;
    let serial = GraphBuilder::new(4, "")?
        .with_concurrency(1)
        .build("Root", &resolver)
        .await;
    let parallel = GraphBuilder::new(4, "")?
        .with_concurrency(8)
        .build("Root", &resolver)
        .await;

    assert!(serial.is_complete());
    assert_eq!(serial.graph, parallel.graph);
    assert_eq!(serial.graph.len(), 14);

    Ok(())
}

/// Full `order` command against the registry
#[tokio::test]
async fn e2e_registry_order_command() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    registry.publish("App", &["Core"], PageLayout::Inline).await;
    registry.publish("Core", &["Base"], PageLayout::Gzip).await;
    registry.publish("Base", &[], PageLayout::Remote).await;

    let command = Commands::Order {
        args: args(&registry, "App", 3),
        json: false,
    };

    let mut out = Vec::new();
    execute_command_with_output(command, &AppConfig::default(), &mut out).await?;
    let text = String::from_utf8(out)?;

    assert_eq!(text, "Load order:\n  1. Base\n  2. Core\n  3. App\n");

    Ok(())
}

/// Depth limit keeps boundary packages out of the order
#[tokio::test]
async fn e2e_registry_graph_command_json_respects_depth() -> Result<()> {
    let mut registry = MockRegistry::start().await;
    registry.publish("App", &["Core"], PageLayout::Inline).await;
    registry.publish("Core", &["Base"], PageLayout::Inline).await;

    let command = Commands::Graph {
        args: args(&registry, "App", 2),
        json: true,
    };

    let mut out = Vec::new();
    execute_command_with_output(command, &AppConfig::default(), &mut out).await?;
    let graph: serde_json::Value = serde_json::from_slice(&out)?;

    assert_eq!(
        graph,
        serde_json::json!({ "App": ["Core"], "Core": ["Base"] })
    );

    Ok(())
}
