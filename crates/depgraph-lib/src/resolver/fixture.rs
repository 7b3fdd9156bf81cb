//! Fixture-backed resolver
//!
//! Reads a flat JSON object mapping package names to arrays of dependency
//! names. Used for deterministic runs and tests.

use super::{DependencyResolver, dedup_preserving_order};
use crate::primitives::{ConfigError, PackageId, ResolutionError};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use tracing::{trace, warn};

#[derive(Debug, Clone, Default)]
pub struct FixtureResolver {
    /// Lower-cased package name -> dependencies
    packages: HashMap<String, Vec<PackageId>>,
}

impl FixtureResolver {
    /// Build from an ordered `package -> dependencies` map.
    ///
    /// Keys differing only by case collapse to the first one.
    pub fn from_map(map: IndexMap<String, Vec<PackageId>>) -> Self {
        let mut packages = HashMap::with_capacity(map.len());

        for (package, deps) in map {
            let key = package.to_lowercase();
            if packages.contains_key(&key) {
                warn!("Duplicate fixture entry ignored: {}", package);
                continue;
            }
            packages.insert(key, dedup_preserving_order(deps));
        }

        Self { packages }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let map: IndexMap<String, Vec<PackageId>> = serde_json::from_str(json)?;
        Ok(Self::from_map(map))
    }

    /// Load a fixture file
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRepository {
            repo: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("cannot read fixture: {e}")))?;

        let resolver =
            Self::from_json(&content).map_err(|e| invalid(format!("invalid fixture JSON: {e}")))?;

        trace!(
            "Loaded fixture {} with {} packages",
            path.display(),
            resolver.len()
        );
        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl DependencyResolver for FixtureResolver {
    async fn resolve(&self, package: &str) -> Result<Vec<PackageId>, ResolutionError> {
        self.packages
            .get(&package.to_lowercase())
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound {
                package: package.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    include!("fixture.test.rs");
}
