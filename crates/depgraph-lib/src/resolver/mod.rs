//! # Resolver Module
//!
//! "Direct dependencies of X" lookups consumed by the graph builder.
//!
//! ## Backends
//!
//! - [`registry`] - NuGet v3 registration API over HTTP
//! - [`archive`] - Local `.nupkg` archive or directory feed
//! - [`fixture`] - Static JSON map for deterministic runs
//!
//! Every backend converts its I/O and parsing failures into
//! [`ResolutionError`] so nothing lower-level reaches the graph engine.
//! Package ids are matched case-insensitively by all backends; returned ids
//! keep the spelling of the source.

pub mod archive;
pub mod fixture;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod nuspec;
pub mod registry;

pub use archive::ArchiveResolver;
pub use fixture::FixtureResolver;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockResolver;
pub use registry::RegistryResolver;

use crate::networking::{NetworkingConfig, NetworkingManager};
use crate::primitives::{ConfigError, PackageId, ResolutionError, ResolverMode};
use indexmap::IndexSet;
use std::path::Path;
use tracing::debug;

/// Source of direct dependency lookups
pub trait DependencyResolver: Send + Sync {
    /// Direct dependencies of `package`, without duplicates.
    ///
    /// Result order is deterministic per backend but carries no meaning.
    fn resolve(
        &self,
        package: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PackageId>, ResolutionError>> + Send;
}

/// Remove duplicates, keeping the first occurrence of each id
pub fn dedup_preserving_order<I>(ids: I) -> Vec<PackageId>
where
    I: IntoIterator<Item = PackageId>,
{
    ids.into_iter()
        .collect::<IndexSet<PackageId>>()
        .into_iter()
        .collect()
}

/// Which backend to use and where its repository lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub mode: ResolverMode,
    /// Service index URL (registry) or filesystem path (archive, fixture)
    pub repo: String,
}

impl ResolverConfig {
    pub fn new(mode: ResolverMode, repo: impl Into<String>) -> Self {
        Self {
            mode,
            repo: repo.into(),
        }
    }

    /// Validate the repository and construct the selected backend
    pub fn connect(&self, networking: &NetworkingConfig) -> Result<Resolver, ConfigError> {
        debug!(mode = %self.mode, repo = %self.repo, "Connecting resolver");

        match self.mode {
            ResolverMode::Registry => {
                validate_url(&self.repo)?;
                let networking = NetworkingManager::new(networking.clone())?;
                Ok(Resolver::Registry(RegistryResolver::new(
                    networking,
                    self.repo.clone(),
                )))
            }
            ResolverMode::Archive => {
                ArchiveResolver::open(Path::new(&self.repo)).map(Resolver::Archive)
            }
            ResolverMode::Fixture => {
                FixtureResolver::open(Path::new(&self.repo)).map(Resolver::Fixture)
            }
        }
    }
}

/// Require an absolute http(s) URL with a host
fn validate_url(repo: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRepository {
        repo: repo.to_string(),
        reason: reason.to_string(),
    };

    let url = reqwest::Url::parse(repo)
        .map_err(|e| invalid(&format!("not a valid URL ({e}), expected http(s)://...")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host"));
    }

    Ok(())
}

/// Backend selected by configuration at startup
#[derive(Debug)]
pub enum Resolver {
    Registry(RegistryResolver),
    Archive(ArchiveResolver),
    Fixture(FixtureResolver),
}

impl Resolver {
    pub fn mode(&self) -> ResolverMode {
        match self {
            Self::Registry(_) => ResolverMode::Registry,
            Self::Archive(_) => ResolverMode::Archive,
            Self::Fixture(_) => ResolverMode::Fixture,
        }
    }
}

impl DependencyResolver for Resolver {
    async fn resolve(&self, package: &str) -> Result<Vec<PackageId>, ResolutionError> {
        match self {
            Self::Registry(resolver) => resolver.resolve(package).await,
            Self::Archive(resolver) => resolver.resolve(package).await,
            Self::Fixture(resolver) => resolver.resolve(package).await,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
