//! Environment variable handling for application configuration
//!
//! Standard colour and CI conventions, read with envy.

use crate::primitives::ConfigError;
use serde::Deserialize;

/// Environment variables that affect application behavior
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfig {
    /// NO_COLOR environment variable (any non-empty value = disable color)
    pub no_color: Option<String>,
    /// FORCE_COLOR environment variable (0/false = disable, 1/2/3/true = enable)
    pub force_color: Option<String>,
    /// CLICOLOR environment variable (0 = disable color)
    pub clicolor: Option<String>,
    /// CI environment variable (any value = CI mode)
    pub ci: Option<String>,
}

impl EnvironmentConfig {
    /// Load environment configuration from current environment
    pub fn load() -> Result<Self, ConfigError> {
        envy::from_env().map_err(|source| ConfigError::EnvironmentParsingFailed { source })
    }

    /// Decide whether ANSI colour may be used, starting from `detected`
    /// (whether the log stream is a terminal).
    ///
    /// Precedence: CI < CLICOLOR < NO_COLOR < FORCE_COLOR
    pub fn color_enabled(&self, detected: bool) -> bool {
        let mut color = detected;

        if self.ci.is_some() {
            color = false;
        }

        if self.clicolor.as_deref() == Some("0") {
            color = false;
        }

        if self.no_color.as_deref().is_some_and(|value| !value.is_empty()) {
            color = false;
        }

        match self.force_color.as_deref() {
            Some("0" | "false") => color = false,
            Some("1" | "2" | "3" | "true") => color = true,
            _ => {}
        }

        color
    }
}

#[cfg(test)]
mod tests {
    include!("env.test.rs");
}
