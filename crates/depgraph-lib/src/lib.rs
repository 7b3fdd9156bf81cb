//! # depgraph Library
//!
//! Transitive dependency graph construction and load ordering for NuGet
//! packages.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types and error taxonomy
//! - [`graph`] - Breadth-first graph builder and topological sorter
//! - [`resolver`] - Registry, archive and fixture dependency lookups
//! - [`networking`] - HTTP client for registry access
//! - [`logger`] - Structured logging
//! - [`application`] - CLI interface and configuration management
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() {
//! // Parse arguments and run the selected command
//! depgraph_lib::main().await.unwrap();
//! # }
//! ```

pub mod application;
pub mod graph;
pub mod logger;
pub mod networking;
pub mod primitives;
pub mod resolver;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use application::{AppConfig, Cli, CliConfig, Commands, execute_command};
pub use graph::{DependencyGraph, GraphBuilder, TopoOrder, TopologicalSorter, Traversal, build_graph};
pub use logger::Logger;
pub use networking::{NetworkingConfig, NetworkingManager};
pub use primitives::{
    ConfigError, LogFormat, LogLevel, LogOutput, LoggerError, PackageId, ResolutionError,
    ResolverMode,
};
pub use resolver::{DependencyResolver, Resolver, ResolverConfig};

// Private imports for the main function
use anyhow::Result;
use application::EnvironmentConfig;
use std::io::IsTerminal;

pub async fn main() -> Result<()> {
    // Load CLI configuration
    let config = CliConfig::load()?;

    // Colour only when the log stream is a terminal and the environment allows it
    let is_terminal = match config.app_config.log_output {
        LogOutput::Stderr => std::io::stderr().is_terminal(),
        LogOutput::Stdout => std::io::stdout().is_terminal(),
    };
    let ansi = EnvironmentConfig::load()?.color_enabled(is_terminal);
    Logger::init(config.app_config.to_logger_config(ansi))?;

    // Execute the command
    execute_command(config).await
}
