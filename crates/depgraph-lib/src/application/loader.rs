//! Configuration loading
//!
//! Coordinates loading configuration from `.env` files, standard
//! environment variables and parsed CLI arguments.

use crate::primitives::ConfigError;
use std::path::Path;
use tracing::trace;

use super::config::AppConfig;

/// Env files read at startup, most specific first. Variables already set
/// in the process environment are never overridden.
pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

impl AppConfig {
    /// Load `.env.local` and `.env` from the working directory, if present
    pub fn load_env_files() -> Result<(), ConfigError> {
        for env_file in ENV_FILES {
            Self::load_env_file(Path::new(env_file))?;
        }
        Ok(())
    }

    /// Load one env file; a missing file is not an error
    pub fn load_env_file(path: &Path) -> Result<(), ConfigError> {
        match dotenvy::from_path(path) {
            Ok(()) => {
                trace!("Loaded environment from {}", path.display());
                Ok(())
            }
            Err(e) if e.not_found() => Ok(()),
            Err(source) => Err(ConfigError::EnvFileError {
                file: path.display().to_string(),
                source,
            }),
        }
    }

    /// Final configuration: CLI/`DEPGRAPH_*` values are validated, then
    /// layered over the defaults
    pub fn resolve(mut cli_config: AppConfig) -> Result<Self, ConfigError> {
        cli_config.validate()?;
        Ok(Self::default().merge_with(cli_config))
    }
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
