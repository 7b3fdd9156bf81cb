use super::*;
use crate::primitives::ResolverMode;
use crate::testing::TempDirFixture;

fn args(repo: &std::path::Path, package: &str, max_depth: i64, filter: &str) -> TraversalArgs {
    TraversalArgs {
        package: package.to_string(),
        repo: repo.display().to_string(),
        mode: ResolverMode::Fixture,
        max_depth,
        filter: filter.to_string(),
    }
}

async fn run(command: Commands) -> Result<String> {
    let mut out = Vec::new();
    execute_command_with_output(command, &AppConfig::default(), &mut out).await?;
    Ok(String::from_utf8(out)?)
}

fn tree_fixture(fixture: &TempDirFixture) -> std::path::PathBuf {
    fixture
        .write_fixture(
            "deps.json",
            &[("A", &["B", "C"]), ("B", &["D"]), ("C", &[]), ("D", &[])],
        )
        .unwrap()
}

// ============================================================================
// params
// ============================================================================

#[tokio::test]
async fn test_params_prints_key_value_lines() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = tree_fixture(&fixture);

    let output = run(Commands::Params {
        args: args(&repo, "A", 3, "test"),
    })
    .await
    .unwrap();

    assert!(output.starts_with("Parameters:\n"));
    assert!(output.contains("package: A\n"));
    assert!(output.contains(&format!("repo: {}\n", repo.display())));
    assert!(output.contains("mode: fixture\n"));
    assert!(output.contains("max_depth: 3\n"));
    assert!(output.contains("filter: test\n"));
}

#[tokio::test]
async fn test_params_rejects_invalid_depth_and_repo() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = tree_fixture(&fixture);

    let err = run(Commands::Params {
        args: args(&repo, "A", 0, ""),
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("max depth"));

    let err = run(Commands::Params {
        args: args(&fixture.path().join("missing.json"), "A", 3, ""),
    })
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("Invalid repository"));
}

#[test]
fn test_prepare_takes_concurrency_from_jobs() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = tree_fixture(&fixture);

    let config = AppConfig {
        jobs: 7,
        ..AppConfig::default()
    };
    let (builder, resolver) = prepare(&args(&repo, "A", 2, ""), &config).unwrap();

    assert_eq!(builder.concurrency(), config.to_networking_config().max_jobs);
    assert_eq!(builder.concurrency(), 7);
    assert_eq!(builder.max_depth(), 2);
    assert_eq!(resolver.mode(), ResolverMode::Fixture);
}

// ============================================================================
// graph
// ============================================================================

#[tokio::test]
async fn test_graph_text_output() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = tree_fixture(&fixture);

    let output = run(Commands::Graph {
        args: args(&repo, "A", 3, ""),
        json: false,
    })
    .await
    .unwrap();

    assert_eq!(
        output,
        "A -> B, C\nB -> D\nC -> (none)\nD -> (none)\n"
    );
}

#[tokio::test]
async fn test_graph_reports_boundary_and_failures() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = fixture
        .write_fixture("deps.json", &[("A", &["B", "Ghost"]), ("B", &["C"])])
        .unwrap();

    let output = run(Commands::Graph {
        args: args(&repo, "A", 2, ""),
        json: false,
    })
    .await
    .unwrap();

    assert!(output.contains("A -> B, Ghost\n"));
    assert!(output.contains("Ghost -> (none)\n"));
    assert!(output.contains("Not expanded (depth limit): C\n"));
    assert!(output.contains("Package not found: Ghost"));
}

#[tokio::test]
async fn test_graph_json_output() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = fixture
        .write_fixture("deps.json", &[("A", &["Test.Lib", "Core"]), ("Core", &[])])
        .unwrap();

    let output = run(Commands::Graph {
        args: args(&repo, "A", 3, "test"),
        json: true,
    })
    .await
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value, serde_json::json!({ "A": ["Core"], "Core": [] }));
}

// ============================================================================
// order
// ============================================================================

#[tokio::test]
async fn test_order_text_output() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = tree_fixture(&fixture);

    let output = run(Commands::Order {
        args: args(&repo, "A", 3, ""),
        json: false,
    })
    .await
    .unwrap();

    assert_eq!(output, "Load order:\n  1. D\n  2. C\n  3. B\n  4. A\n");
}

#[tokio::test]
async fn test_order_reports_cycles() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = fixture
        .write_fixture("deps.json", &[("A", &["B"]), ("B", &["A"])])
        .unwrap();

    let output = run(Commands::Order {
        args: args(&repo, "A", 5, ""),
        json: false,
    })
    .await
    .unwrap();

    assert!(output.starts_with("Cycle detected, load order is partial:\n"));
    assert!(output.contains("Not ordered: A, B\n"));
    assert!(output.contains("Cycle: A -> B -> A\n"));
}

#[tokio::test]
async fn test_order_json_output() {
    let fixture = TempDirFixture::new().unwrap();
    let repo = fixture
        .write_fixture("deps.json", &[("A", &["B"]), ("B", &["C"])])
        .unwrap();

    let output = run(Commands::Order {
        args: args(&repo, "A", 1, ""),
        json: true,
    })
    .await
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "order": ["A"],
            "has_cycle": false,
            "unordered": [],
            "cycles": []
        })
    );
}
