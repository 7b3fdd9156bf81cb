use super::*;
use crate::primitives::LogFormat;

fn parse(args: &[&str]) -> CliConfig {
    CliConfig::try_from_args(std::iter::once("depgraph").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_parse_graph_command_with_defaults() {
    let config = parse(&["graph", "-p", "Serilog", "-r", "deps.json", "-m", "fixture"]);

    match &config.command {
        Commands::Graph { args, json } => {
            assert_eq!(args.package, "Serilog");
            assert_eq!(args.repo, "deps.json");
            assert_eq!(args.mode, ResolverMode::Fixture);
            assert_eq!(args.max_depth, 3);
            assert_eq!(args.filter, "");
            assert!(!json);
        }
        other => panic!("Expected graph command, got {other:?}"),
    }
}

#[test]
fn test_parse_long_flags_and_mode_aliases() {
    let config = parse(&[
        "order",
        "--package",
        "A",
        "--repo",
        "https://api.nuget.org/v3/index.json",
        "--mode",
        "remote",
        "--max-depth",
        "5",
        "--filter",
        "Test",
        "--json",
    ]);

    assert!(matches!(config.command, Commands::Order { json: true, .. }));
    let args = config.command.args();
    assert_eq!(args.mode, ResolverMode::Registry);
    assert_eq!(args.max_depth().unwrap(), 5);
    assert_eq!(args.filter, "Test");

    let local = parse(&["params", "-p", "A", "-r", ".", "-m", "local"]);
    assert_eq!(local.command.args().mode, ResolverMode::Archive);
}

#[test]
fn test_global_flags_after_subcommand() {
    let config = parse(&[
        "graph", "-p", "A", "-r", "x", "-m", "fixture", "-j", "8", "--log-format", "json",
    ]);

    assert_eq!(config.app_config.jobs, 8);
    assert_eq!(config.app_config.log_format, LogFormat::Json);
}

#[test]
fn test_max_depth_below_one_is_rejected() {
    for depth in ["0", "-2"] {
        let config = parse(&["params", "-p", "A", "-r", "x", "-m", "fixture", "-d", depth]);
        let err = config.command.args().max_depth().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxDepth { .. }));
        assert!(err.to_string().contains(depth));
    }
}

#[test]
fn test_missing_required_arguments() {
    let result = CliConfig::try_from_args(["depgraph", "graph", "-r", "x", "-m", "fixture"]);
    assert!(result.is_err());

    let result = CliConfig::try_from_args(["depgraph", "graph", "-p", "A", "-r", "x", "-m", "bogus"]);
    assert!(result.is_err());
}

#[test]
fn test_resolver_config_from_args() {
    let config = parse(&["params", "-p", "A", "-r", "feed", "-m", "archive"]);
    let resolver = config.command.args().resolver_config();

    assert_eq!(resolver, ResolverConfig::new(ResolverMode::Archive, "feed"));
}
