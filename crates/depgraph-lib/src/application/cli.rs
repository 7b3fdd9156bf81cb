use crate::primitives::{ConfigError, ResolverMode};
use crate::resolver::ResolverConfig;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;

use super::config::AppConfig;

/// depgraph CLI - NuGet dependency graph explorer
#[derive(Debug, Clone, Parser)]
#[command(name = "depgraph")]
#[command(about = "Build and order the transitive dependency graph of a package")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    /// depgraph commands
    #[command(subcommand)]
    pub command: Commands,
}

/// Configuration loaded from CLI
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Commands,
}

impl CliConfig {
    /// Load configuration from the process arguments.
    ///
    /// `.env.local`/`.env` are read first so clap's `env` fallbacks see them.
    pub fn load() -> Result<Self, ConfigError> {
        AppConfig::load_env_files()?;
        Self::from_cli(Cli::parse())
    }

    /// Parse an explicit argument list (the first item is the binary name)
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        Ok(Self {
            app_config: cli.config,
            command: cli.command,
        })
    }

    /// Apply environment conventions and validation to parsed arguments
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let app_config = AppConfig::resolve(cli.config)?;
        Ok(Self {
            app_config,
            command: cli.command,
        })
    }
}

/// Parameters shared by every command
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct TraversalArgs {
    /// Package to analyze
    #[arg(short, long)]
    pub package: String,

    /// Service index URL (registry) or path (archive, fixture)
    #[arg(short, long)]
    pub repo: String,

    /// How dependencies are looked up
    #[arg(short, long, value_enum)]
    pub mode: ResolverMode,

    /// Maximum traversal depth (the start package is depth 0)
    #[arg(short = 'd', long, default_value_t = 3, allow_negative_numbers = true)]
    pub max_depth: i64,

    /// Drop dependencies whose name contains this substring (case-insensitive)
    #[arg(short, long, default_value = "")]
    pub filter: String,
}

impl TraversalArgs {
    /// Depth as the builder expects it, rejecting values below 1
    pub fn max_depth(&self) -> Result<u32, ConfigError> {
        match u32::try_from(self.max_depth) {
            Ok(depth) if depth >= 1 => Ok(depth),
            _ => Err(ConfigError::InvalidMaxDepth {
                value: self.max_depth,
            }),
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new(self.mode, self.repo.clone())
    }
}

/// Available depgraph commands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Validate and print the analysis parameters
    Params {
        #[command(flatten)]
        args: TraversalArgs,
    },

    /// Build and print the dependency graph
    Graph {
        #[command(flatten)]
        args: TraversalArgs,

        /// Print the graph as a JSON object
        #[arg(long)]
        json: bool,
    },

    /// Build the graph and print the load order (dependencies first)
    Order {
        #[command(flatten)]
        args: TraversalArgs,

        /// Print the order as a JSON object
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn args(&self) -> &TraversalArgs {
        match self {
            Commands::Params { args }
            | Commands::Graph { args, .. }
            | Commands::Order { args, .. } => args,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
