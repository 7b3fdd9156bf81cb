//! Command execution handlers
//!
//! Every command validates its parameters first, then writes its report to
//! the supplied writer so tests can capture it.

use crate::application::{AppConfig, CliConfig, Commands, TraversalArgs};
use crate::graph::{DependencyGraph, GraphBuilder, TopoOrder, Traversal};
use crate::primitives::PackageId;
use crate::resolver::Resolver;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

/// Machine-readable `order` report
#[derive(Debug, Serialize)]
pub struct OrderReport<'a> {
    /// Dependencies first
    pub order: Vec<PackageId>,
    pub has_cycle: bool,
    /// Packages left out of `order`
    pub unordered: Vec<&'a PackageId>,
    pub cycles: Vec<Vec<PackageId>>,
}

impl<'a> OrderReport<'a> {
    pub fn new(graph: &'a DependencyGraph, topo: &TopoOrder) -> Self {
        Self {
            order: topo.load_order(),
            has_cycle: topo.has_cycle,
            unordered: topo.unordered(graph),
            cycles: if topo.has_cycle { graph.cycles() } else { Vec::new() },
        }
    }
}

/// Execute the parsed command, printing to stdout
pub async fn execute_command(config: CliConfig) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute_command_with_output(config.command, &config.app_config, &mut stdout).await
}

/// Execute a command with an explicit output sink (for testing)
pub async fn execute_command_with_output<W>(
    command: Commands,
    config: &AppConfig,
    out: &mut W,
) -> Result<()>
where
    W: Write + Send,
{
    debug!(?command, "Executing command");

    match command {
        Commands::Params { args } => handle_params(&args, config, out),
        Commands::Graph { args, json } => handle_graph(&args, config, json, out).await,
        Commands::Order { args, json } => handle_order(&args, config, json, out).await,
    }
}

/// Check every parameter and connect the selected backend
fn prepare(args: &TraversalArgs, config: &AppConfig) -> Result<(GraphBuilder, Resolver)> {
    let networking = config.to_networking_config();
    let max_depth = args.max_depth()?;
    let builder =
        GraphBuilder::new(max_depth, &args.filter)?.with_concurrency(networking.max_jobs);

    let resolver = args
        .resolver_config()
        .connect(&networking)
        .with_context(|| format!("Cannot use --repo in {} mode", args.mode))?;

    Ok((builder, resolver))
}

async fn traverse(args: &TraversalArgs, config: &AppConfig) -> Result<Traversal> {
    let (builder, resolver) = prepare(args, config)?;

    info!(
        package = %args.package,
        mode = %args.mode,
        max_depth = builder.max_depth(),
        "Resolving dependencies"
    );

    let traversal = builder.build(&args.package, &resolver).await;

    if !traversal.is_complete() {
        info!(
            failed = traversal.failures.len(),
            "Some packages could not be resolved and are shown without dependencies"
        );
    }

    Ok(traversal)
}

fn handle_params<W: Write>(args: &TraversalArgs, config: &AppConfig, out: &mut W) -> Result<()> {
    prepare(args, config)?;
    render_params(args, out)?;
    Ok(())
}

async fn handle_graph<W: Write>(
    args: &TraversalArgs,
    config: &AppConfig,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let traversal = traverse(args, config).await?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &traversal.graph)?;
        writeln!(out)?;
    } else {
        render_graph(&traversal, out)?;
    }
    Ok(())
}

async fn handle_order<W: Write>(
    args: &TraversalArgs,
    config: &AppConfig,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let traversal = traverse(args, config).await?;
    let topo = traversal.graph.topological_sort();
    let report = OrderReport::new(&traversal.graph, &topo);

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        render_order(&report, out)?;
    }
    Ok(())
}

// ============================================================================
// Text rendering
// ============================================================================

/// `key: value` lines, one per parameter
pub fn render_params<W: Write>(args: &TraversalArgs, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Parameters:")?;
    writeln!(out, "package: {}", args.package)?;
    writeln!(out, "repo: {}", args.repo)?;
    writeln!(out, "mode: {}", args.mode)?;
    writeln!(out, "max_depth: {}", args.max_depth)?;
    writeln!(out, "filter: {}", args.filter)
}

/// Adjacency list, then boundary packages and failures when there are any
pub fn render_graph<W: Write>(traversal: &Traversal, out: &mut W) -> std::io::Result<()> {
    for (package, deps) in traversal.graph.iter() {
        if deps.is_empty() {
            writeln!(out, "{package} -> (none)")?;
        } else {
            writeln!(out, "{package} -> {}", deps.join(", "))?;
        }
    }

    let boundary = traversal.graph.boundary_packages();
    if !boundary.is_empty() {
        writeln!(out)?;
        writeln!(out, "Not expanded (depth limit): {}", join(&boundary))?;
    }

    if !traversal.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "Unresolved:")?;
        for error in traversal.failures.values() {
            writeln!(out, "  {error}")?;
        }
    }

    Ok(())
}

/// Numbered load order; cycle details when the order is partial
pub fn render_order<W: Write>(report: &OrderReport<'_>, out: &mut W) -> std::io::Result<()> {
    if report.has_cycle {
        writeln!(out, "Cycle detected, load order is partial:")?;
    } else {
        writeln!(out, "Load order:")?;
    }

    for (i, package) in report.order.iter().enumerate() {
        writeln!(out, "{:>3}. {package}", i + 1)?;
    }

    if report.has_cycle {
        writeln!(out)?;
        writeln!(out, "Not ordered: {}", join(&report.unordered))?;
        for cycle in &report.cycles {
            if let Some(first) = cycle.first() {
                writeln!(out, "Cycle: {} -> {first}", cycle.join(" -> "))?;
            }
        }
    }

    Ok(())
}

fn join(packages: &[&PackageId]) -> String {
    packages
        .iter()
        .map(|package| package.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
