//! depgraph primitives - core types, errors, and coordination
//!
//! Shared vocabulary for the rest of the crate: package identifiers, the
//! error taxonomy (resolution, configuration, logging), and the enums that
//! configuration and the CLI parse into.

use clap::ValueEnum;
use std::str::FromStr;
use thiserror::Error;

mod shared;
use shared::impl_fromstr_for_value_enum;

/// Opaque, case-sensitive package identifier.
///
/// Two ids name the same graph node iff they are byte-equal. The graph
/// engine never normalizes them; backends decide how they match lookups.
pub type PackageId = String;

/// Available log output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// STDERR
    Stderr,
    /// STDOUT
    Stdout,
}

/// Log levels for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// Output formats for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// TEXT
    /// alias: text, txt, plain
    Text,

    /// JSON
    /// alias: json
    Json,

    /// YAML-like pretty output
    /// alias: yaml, yml, pretty
    Yaml,
}

/// Dependency lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverMode {
    /// NuGet v3 registry reached over HTTP
    /// alias: registry, remote
    Registry,

    /// Local `.nupkg` archive or directory of archives
    /// alias: archive, local
    Archive,

    /// Static JSON fixture map
    /// alias: fixture, test
    Fixture,
}

// ============================================================================
// LOGGER CONFIGURATION TYPES
// ============================================================================

/// Logger configuration derived from the application config
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Whether ANSI colour codes may be written
    pub ansi: bool,
}

// ============================================================================
// STRUCTURED ERROR TYPES
// ============================================================================

/// A single package's dependency lookup failed.
///
/// Produced only at the resolver boundary. The graph builder absorbs it and
/// records the package as dependency-free.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Package not found: {package}")]
    NotFound { package: PackageId },

    #[error("Repository unreachable while resolving {package}: {reason}")]
    Unreachable { package: PackageId, reason: String },

    #[error("Malformed metadata for {package}: {reason}")]
    Malformed { package: PackageId, reason: String },
}

impl ResolutionError {
    /// Package the failed lookup was for
    pub fn package(&self) -> &str {
        match self {
            Self::NotFound { package }
            | Self::Unreachable { package, .. }
            | Self::Malformed { package, .. } => package,
        }
    }
}

/// Application configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid max depth: {value} (must be >= 1)")]
    InvalidMaxDepth { value: i64 },

    #[error("Invalid repository '{repo}': {reason}")]
    InvalidRepository { repo: String, reason: String },

    #[error("Failed to load environment file '{file}': {source}")]
    EnvFileError {
        file: String,
        source: dotenvy::Error,
    },

    #[error("Failed to parse environment variables: {source}")]
    EnvironmentParsingFailed {
        #[from]
        source: envy::Error,
    },

    #[error("Failed to build HTTP client: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    #[error("Failed to parse configuration value '{value}': {reason}")]
    ParseError { value: String, reason: String },
}

/// Logger initialization errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to initialize tracing subscriber: {reason}")]
    InitializationFailed { reason: String },

    #[error("Logger already initialized")]
    AlreadyInitialized,
}

impl LogLevel {
    /// Convert verbosity level from AppConfig to LogLevel
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Error,
            1 => LogLevel::Warning,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            4.. => LogLevel::Trace,
        }
    }

    /// Directive name understood by `EnvFilter`
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Error,
            Self::Warning,
            Self::Info,
            Self::Debug,
            Self::Trace,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Error => Some(
                clap::builder::PossibleValue::new("error")
                    .alias("err")
                    .alias("fatal"),
            ),
            Self::Warning => Some(clap::builder::PossibleValue::new("warn").alias("warning")),
            Self::Info => Some(clap::builder::PossibleValue::new("info")),
            Self::Debug => Some(clap::builder::PossibleValue::new("debug")),
            Self::Trace => Some(
                clap::builder::PossibleValue::new("trace")
                    .alias("verbose"),
            ),
        }
    }
}

impl ValueEnum for LogFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Json, Self::Yaml]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Text => Some(
                clap::builder::PossibleValue::new("text")
                    .alias("txt")
                    .alias("plain"),
            ),
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Yaml => Some(
                clap::builder::PossibleValue::new("yaml")
                    .alias("yml")
                    .alias("pretty"),
            ),
        }
    }
}

impl ValueEnum for LogOutput {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Stderr, Self::Stdout]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Stderr => Some(clap::builder::PossibleValue::new("stderr")),
            Self::Stdout => Some(clap::builder::PossibleValue::new("stdout")),
        }
    }
}

impl ValueEnum for ResolverMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Registry, Self::Archive, Self::Fixture]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Registry => Some(
                clap::builder::PossibleValue::new("registry")
                    .alias("remote")
                    .help("NuGet v3 service index URL"),
            ),
            Self::Archive => Some(
                clap::builder::PossibleValue::new("archive")
                    .alias("local")
                    .help("Path to a .nupkg file or a directory of them"),
            ),
            Self::Fixture => Some(
                clap::builder::PossibleValue::new("fixture")
                    .alias("test")
                    .help("Path to a JSON map of package -> dependencies"),
            ),
        }
    }
}

impl std::fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}

// Generate FromStr implementations for all ValueEnum types
impl_fromstr_for_value_enum!(LogLevel, "invalid log level");
impl_fromstr_for_value_enum!(LogFormat, "invalid log format");
impl_fromstr_for_value_enum!(LogOutput, "invalid log output stream");
impl_fromstr_for_value_enum!(ResolverMode, "invalid resolver mode");

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
