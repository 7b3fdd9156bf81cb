//! E2E tests driving the command line: argument parsing, validation and
//! rendered output

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use depgraph_lib::application::cli::{Cli, CliConfig};
use depgraph_lib::application::commands::execute_command_with_output;
use depgraph_tests::TempDirFixture;

type Entries<'a> = &'a [(&'a str, &'a [&'a str])];

const CHAIN: Entries<'static> = &[("A", &["B"]), ("B", &["C"]), ("C", &["D"]), ("D", &[])];

/// Temp dir holding `repo.json`; returns the dir and the fixture path
fn workspace(entries: Entries<'_>) -> Result<(TempDirFixture, String)> {
    let dir = TempDirFixture::new().map_err(|e| anyhow!(e.to_string()))?;
    let path = dir
        .write_fixture("repo.json", entries)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok((dir, path.display().to_string()))
}

/// Parse, validate and execute an argument list, capturing stdout
async fn run(args: &[&str]) -> Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("depgraph").chain(args.iter().copied()))?;
    let config = CliConfig::from_cli(cli)?;

    let mut out = Vec::new();
    execute_command_with_output(config.command, &config.app_config, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn e2e_help_lists_commands() -> Result<()> {
    let err = CliConfig::try_from_args(["depgraph", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);

    let help = err.to_string();
    assert!(help.contains("params"));
    assert!(help.contains("graph"));
    assert!(help.contains("order"));

    Ok(())
}

#[tokio::test]
async fn e2e_params_prints_parameters() -> Result<()> {
    let (_dir, repo) = workspace(CHAIN)?;
    let out = run(&["params", "-p", "A", "-r", &repo, "-m", "fixture"]).await?;

    assert!(out.starts_with("Parameters:\n"));
    assert!(out.contains("package: A\n"));
    assert!(out.contains("mode: fixture\n"));
    assert!(out.contains("max_depth: 3\n"));

    Ok(())
}

#[tokio::test]
async fn e2e_order_prints_dependencies_first() -> Result<()> {
    let (_dir, repo) = workspace(CHAIN)?;
    let out = run(&["order", "-p", "A", "-r", &repo, "-m", "fixture", "-d", "5"]).await?;

    assert_eq!(out, "Load order:\n  1. D\n  2. C\n  3. B\n  4. A\n");

    Ok(())
}

#[tokio::test]
async fn e2e_graph_json_is_machine_readable() -> Result<()> {
    let (_dir, repo) = workspace(CHAIN)?;
    let out = run(&[
        "graph", "-p", "A", "-r", &repo, "-m", "fixture", "-d", "2", "--json",
    ])
    .await?;

    let graph: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(graph, serde_json::json!({ "A": ["B"], "B": ["C"] }));

    Ok(())
}

#[tokio::test]
async fn e2e_cycle_is_reported_without_failing() -> Result<()> {
    let (_dir, repo) = workspace(&[("A", &["B"]), ("B", &["A"])])?;
    let out = run(&["order", "-p", "A", "-r", &repo, "-m", "fixture"]).await?;

    assert!(out.contains("Cycle detected"));
    assert!(out.contains("Cycle: A -> B -> A"));

    Ok(())
}

#[tokio::test]
async fn e2e_zero_depth_is_rejected() -> Result<()> {
    let (_dir, repo) = workspace(CHAIN)?;
    let err = run(&["graph", "-p", "A", "-r", &repo, "-m", "fixture", "-d", "0"])
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Invalid max depth: 0"));

    Ok(())
}

#[tokio::test]
async fn e2e_unknown_mode_is_rejected() -> Result<()> {
    let (_dir, repo) = workspace(CHAIN)?;
    let err = CliConfig::try_from_args([
        "depgraph", "graph", "-p", "A", "-r", &repo, "-m", "carrier-pigeon",
    ])
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert!(err.to_string().contains("carrier-pigeon"));

    Ok(())
}

#[tokio::test]
async fn e2e_missing_repository_is_rejected() -> Result<()> {
    let (dir, _repo) = workspace(CHAIN)?;
    let missing = dir.path().join("missing.json").display().to_string();
    let err = run(&["graph", "-p", "A", "-r", &missing, "-m", "fixture"])
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Cannot use --repo in fixture mode"));

    Ok(())
}

#[tokio::test]
async fn e2e_registry_mode_requires_url() -> Result<()> {
    let err = run(&["params", "-p", "A", "-r", "repo.json", "-m", "registry"])
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Invalid repository 'repo.json'"));

    Ok(())
}

#[tokio::test]
async fn e2e_zero_jobs_is_rejected() -> Result<()> {
    let (_dir, repo) = workspace(CHAIN)?;
    let err = run(&["-j", "0", "params", "-p", "A", "-r", &repo, "-m", "fixture"])
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("--jobs must be at least 1"));

    Ok(())
}
