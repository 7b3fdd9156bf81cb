//! Application configuration management
//!
//! Handles config loading, validation, and environment variable processing
//! following the precedence: defaults -> .env -> env vars -> CLI args.

use crate::networking::NetworkingConfig;
use crate::primitives::*;
use clap::Parser;

/// Default configuration values
pub mod defaults {
    pub const LOG_LEVEL: &str = "1"; // Warnings surface resolution failures
    pub const LOG_FORMAT: &str = "text";
    pub const NET_TIMEOUT: &str = "30";
    pub const JOBS: &str = "4";
    pub const LOG_OUTPUT: &str = "stderr";
}

/// Default value functions for configuration fields
mod default_fns {
    use super::*;

    pub fn log_level() -> u8 {
        defaults::LOG_LEVEL.parse().unwrap_or(1)
    }

    pub fn log_format() -> LogFormat {
        defaults::LOG_FORMAT.parse().unwrap_or(LogFormat::Text)
    }

    pub fn net_timeout() -> u64 {
        defaults::NET_TIMEOUT.parse().unwrap_or(30)
    }

    pub fn jobs() -> usize {
        defaults::JOBS.parse().unwrap_or(4)
    }

    pub fn log_output() -> LogOutput {
        defaults::LOG_OUTPUT.parse().unwrap_or(LogOutput::Stderr)
    }
}

/// Application configuration structure
#[derive(Debug, Clone, Parser)]
pub struct AppConfig {
    /// Number of concurrent dependency lookups per depth level
    #[arg(short = 'j', long, global = true, env = "DEPGRAPH_JOBS", default_value = defaults::JOBS)]
    pub jobs: usize,

    /// Registry request timeout in seconds
    #[arg(long, global = true, env = "DEPGRAPH_NET_TIMEOUT", default_value = defaults::NET_TIMEOUT)]
    pub net_timeout: u64,

    /// Verbosity level (0=error, 1=warn, 2=info, 3=debug, 4=trace)
    #[arg(long, global = true, env = "DEPGRAPH_LOG_LEVEL", default_value = defaults::LOG_LEVEL)]
    pub log_level: u8,

    /// Log format (text, json, yaml)
    #[arg(long, global = true, env = "DEPGRAPH_LOG_FORMAT", default_value = defaults::LOG_FORMAT)]
    pub log_format: LogFormat,

    /// Log output stream (stderr, stdout)
    #[arg(long, global = true, env = "DEPGRAPH_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT)]
    pub log_output: LogOutput,

    /// Log every registry request
    #[arg(long, global = true, env = "DEPGRAPH_TRACE_REQUESTS")]
    pub trace_requests: bool,

    /// Disable ANSI colours in log output
    #[arg(long, global = true, env = "DEPGRAPH_NO_COLOR")]
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jobs: default_fns::jobs(),
            net_timeout: default_fns::net_timeout(),
            log_level: default_fns::log_level(),
            log_format: default_fns::log_format(),
            log_output: default_fns::log_output(),
            trace_requests: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Logger settings; `ansi` must already account for the environment
    pub fn to_logger_config(&self, ansi: bool) -> LoggerConfig {
        LoggerConfig {
            level: LogLevel::from_verbosity(self.log_level),
            format: self.log_format,
            output: self.log_output,
            ansi: ansi && !self.no_color,
        }
    }

    pub fn to_networking_config(&self) -> NetworkingConfig {
        NetworkingConfig {
            max_jobs: self.jobs,
            timeout_seconds: self.net_timeout,
            trace_requests: self.trace_requests,
        }
    }

    /// Merge this config with another, taking non-default values from other
    pub fn merge_with(mut self, other: Self) -> Self {
        if other.log_level != default_fns::log_level() {
            self.log_level = other.log_level;
        }
        if other.net_timeout != default_fns::net_timeout() {
            self.net_timeout = other.net_timeout;
        }
        if other.jobs != default_fns::jobs() {
            self.jobs = other.jobs;
        }

        if !matches!(other.log_format, LogFormat::Text) {
            self.log_format = other.log_format;
        }
        if !matches!(other.log_output, LogOutput::Stderr) {
            self.log_output = other.log_output;
        }

        self.trace_requests |= other.trace_requests;
        self.no_color |= other.no_color;

        self
    }

    /// Validate the final configuration
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::ParseError {
                value: "0".to_string(),
                reason: "--jobs must be at least 1".to_string(),
            });
        }
        if self.net_timeout == 0 {
            return Err(ConfigError::ParseError {
                value: "0".to_string(),
                reason: "--net-timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}
