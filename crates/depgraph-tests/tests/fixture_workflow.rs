//! E2E tests for the reference traversal scenarios on a JSON fixture

use anyhow::{Result, anyhow};
use depgraph_lib::application::cli::{Commands, TraversalArgs};
use depgraph_lib::application::commands::execute_command_with_output;
use depgraph_lib::application::config::AppConfig;
use depgraph_lib::primitives::ResolverMode;
use depgraph_tests::TempDirFixture;

type Entries<'a> = &'a [(&'a str, &'a [&'a str])];

async fn order(entries: Entries<'_>, package: &str, max_depth: i64) -> Result<serde_json::Value> {
    let dir = TempDirFixture::new().map_err(|e| anyhow!(e.to_string()))?;
    let path = dir
        .write_fixture("repo.json", entries)
        .map_err(|e| anyhow!(e.to_string()))?;

    let command = Commands::Order {
        args: TraversalArgs {
            package: package.to_string(),
            repo: path.display().to_string(),
            mode: ResolverMode::Fixture,
            max_depth,
            filter: String::new(),
        },
        json: true,
    };

    let mut out = Vec::new();
    execute_command_with_output(command, &AppConfig::default(), &mut out).await?;
    Ok(serde_json::from_slice(&out)?)
}

/// Linear chain A -> B -> C -> D loads D first
#[tokio::test]
async fn e2e_chain_within_depth() -> Result<()> {
    let report = order(
        &[("A", &["B"]), ("B", &["C"]), ("C", &["D"]), ("D", &[])],
        "A",
        5,
    )
    .await?;

    assert_eq!(report["order"], serde_json::json!(["D", "C", "B", "A"]));
    assert_eq!(report["has_cycle"], false);

    Ok(())
}

/// Depth 2 stops at C, which is never ordered
#[tokio::test]
async fn e2e_chain_cut_by_depth() -> Result<()> {
    let report = order(
        &[("A", &["B"]), ("B", &["C"]), ("C", &["D"]), ("D", &[])],
        "A",
        2,
    )
    .await?;

    assert_eq!(report["order"], serde_json::json!(["B", "A"]));
    assert_eq!(report["has_cycle"], false);

    Ok(())
}

/// Depth 1 leaves only the start package
#[tokio::test]
async fn e2e_depth_one() -> Result<()> {
    let report = order(&[("A", &["B"]), ("B", &[])], "A", 1).await?;

    assert_eq!(report["order"], serde_json::json!(["A"]));
    assert_eq!(report["has_cycle"], false);

    Ok(())
}

/// A two-package cycle is flagged and left unordered
#[tokio::test]
async fn e2e_cycle_flagged() -> Result<()> {
    let report = order(&[("A", &["B"]), ("B", &["A"])], "A", 5).await?;

    assert_eq!(report["has_cycle"], true);
    assert_eq!(report["order"], serde_json::json!([]));
    assert_eq!(report["cycles"], serde_json::json!([["A", "B"]]));

    Ok(())
}
