//! E2E tests for traversal over local `.nupkg` archives

use anyhow::{Result, anyhow};
use depgraph_lib::application::cli::{Commands, TraversalArgs};
use depgraph_lib::application::commands::execute_command_with_output;
use depgraph_lib::application::config::AppConfig;
use depgraph_lib::primitives::ResolverMode;
use depgraph_tests::TempDirFixture;
use std::path::Path;

fn fixture() -> Result<TempDirFixture> {
    TempDirFixture::new().map_err(|e| anyhow!(e.to_string()))
}

fn publish(feed: &TempDirFixture, file: &str, id: &str, version: &str, deps: &[&str]) -> Result<()> {
    feed.write_nupkg(file, id, version, deps)
        .map(|_| ())
        .map_err(|e| anyhow!(e.to_string()))
}

fn args(repo: &Path, package: &str, max_depth: i64, filter: &str) -> TraversalArgs {
    TraversalArgs {
        package: package.to_string(),
        repo: repo.display().to_string(),
        mode: ResolverMode::Archive,
        max_depth,
        filter: filter.to_string(),
    }
}

async fn run(command: Commands) -> Result<String> {
    let mut out = Vec::new();
    execute_command_with_output(command, &AppConfig::default(), &mut out).await?;
    Ok(String::from_utf8(out)?)
}

/// A directory feed resolves across packages and picks the newest archive
#[tokio::test]
async fn e2e_archive_feed_order() -> Result<()> {
    let feed = fixture()?;
    publish(&feed, "App.1.0.0.nupkg", "App", "1.0.0", &["Core", "Logging"])?;
    publish(&feed, "Core.1.0.0.nupkg", "Core", "1.0.0", &["Legacy"])?;
    publish(&feed, "Core.2.0.0.nupkg", "Core", "2.0.0", &["Base"])?;
    publish(&feed, "logging.3.1.0.nupkg", "Logging", "3.1.0", &["Base"])?;
    publish(&feed, "Base.nupkg", "Base", "1.0.0", &[])?;

    let output = run(Commands::Order {
        args: args(feed.path(), "App", 5, ""),
        json: true,
    })
    .await?;
    let report: serde_json::Value = serde_json::from_str(&output)?;

    assert_eq!(report["has_cycle"], false);
    assert_eq!(
        report["order"],
        serde_json::json!(["Base", "Logging", "Core", "App"])
    );

    Ok(())
}

/// Packages missing from the feed are reported but do not stop the graph
#[tokio::test]
async fn e2e_archive_feed_missing_package() -> Result<()> {
    let feed = fixture()?;
    publish(&feed, "App.1.0.0.nupkg", "App", "1.0.0", &["Present", "Absent"])?;
    publish(&feed, "Present.1.0.0.nupkg", "Present", "1.0.0", &[])?;

    let output = run(Commands::Graph {
        args: args(feed.path(), "App", 3, ""),
        json: false,
    })
    .await?;

    assert!(output.contains("App -> Present, Absent"), "{output}");
    assert!(output.contains("Absent -> (none)"), "{output}");
    assert!(output.contains("Unresolved:"), "{output}");
    assert!(output.contains("Package not found: Absent"), "{output}");

    Ok(())
}

/// The filter prunes matching dependencies before they are visited
#[tokio::test]
async fn e2e_archive_feed_filter() -> Result<()> {
    let feed = fixture()?;
    publish(&feed, "App.1.0.0.nupkg", "App", "1.0.0", &["System.Memory", "Core"])?;
    publish(&feed, "Core.1.0.0.nupkg", "Core", "1.0.0", &["system.buffers"])?;

    let output = run(Commands::Graph {
        args: args(feed.path(), "App", 3, "SYSTEM"),
        json: true,
    })
    .await?;
    let graph: serde_json::Value = serde_json::from_str(&output)?;

    assert_eq!(graph, serde_json::json!({ "App": ["Core"], "Core": [] }));

    Ok(())
}

/// A single archive answers only for its own package
#[tokio::test]
async fn e2e_single_archive() -> Result<()> {
    let feed = fixture()?;
    publish(&feed, "Solo.1.0.0.nupkg", "Solo", "1.0.0", &["Dep.A", "Dep.B"])?;

    let output = run(Commands::Graph {
        args: args(&feed.path().join("Solo.1.0.0.nupkg"), "Solo", 3, ""),
        json: true,
    })
    .await?;
    let graph: serde_json::Value = serde_json::from_str(&output)?;

    assert_eq!(
        graph,
        serde_json::json!({ "Solo": ["Dep.A", "Dep.B"], "Dep.A": [], "Dep.B": [] })
    );

    Ok(())
}

/// Cycles across archives are reported with a partial order
#[tokio::test]
async fn e2e_archive_feed_cycle() -> Result<()> {
    let feed = fixture()?;
    publish(&feed, "A.1.0.0.nupkg", "A", "1.0.0", &["B"])?;
    publish(&feed, "B.1.0.0.nupkg", "B", "1.0.0", &["A"])?;

    let output = run(Commands::Order {
        args: args(feed.path(), "A", 3, ""),
        json: true,
    })
    .await?;
    let report: serde_json::Value = serde_json::from_str(&output)?;

    assert_eq!(report["has_cycle"], true);
    assert_eq!(report["order"], serde_json::json!([]));
    assert_eq!(report["unordered"], serde_json::json!(["A", "B"]));

    Ok(())
}

/// A missing repository path is a configuration error
#[tokio::test]
async fn e2e_archive_missing_repository() -> Result<()> {
    let feed = fixture()?;

    let result = run(Commands::Params {
        args: args(&feed.path().join("nowhere"), "App", 3, ""),
    })
    .await;

    let error = result.expect_err("missing repository must fail");
    assert!(
        format!("{error:#}").contains("Cannot use --repo in archive mode"),
        "{error:#}"
    );

    Ok(())
}
