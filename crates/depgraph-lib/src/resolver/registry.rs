//! Registry-backed resolver (NuGet v3)
//!
//! Lookups walk service index → registration index → last page → last leaf.
//! The registration base URL is discovered from the service index on the
//! first lookup and reused afterwards.

use super::{DependencyResolver, dedup_preserving_order};
use crate::networking::{NetworkingError, NetworkingManager};
use crate::primitives::{PackageId, ResolutionError};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

/// Resource types accepted as the registration base, most preferred first
pub const REGISTRATION_RESOURCE_TYPES: [&str; 3] = [
    "RegistrationsBaseUrl/3.6.0",
    "RegistrationsBaseUrl/3.4.0",
    "RegistrationsBaseUrl",
];

/// Characters escaped when a package id becomes a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// ============================================================================
// Wire models
// ============================================================================

/// `index.json` at the repository root
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceIndex {
    #[serde(default)]
    pub resources: Vec<ServiceResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResource {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub resource_type: ResourceType,
}

/// `@type` is a single string on nuget.org but an array on some feeds
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResourceType {
    One(String),
    Many(Vec<String>),
}

impl ResourceType {
    pub fn matches(&self, wanted: &str) -> bool {
        match self {
            Self::One(value) => value == wanted,
            Self::Many(values) => values.iter().any(|value| value == wanted),
        }
    }
}

impl ServiceIndex {
    /// Registration base URL, preferring the newest resource type
    pub fn registrations_base(&self) -> Option<&str> {
        REGISTRATION_RESOURCE_TYPES.iter().find_map(|wanted| {
            self.resources
                .iter()
                .find(|resource| resource.resource_type.matches(wanted))
                .map(|resource| resource.id.as_str())
        })
    }
}

/// `{base}{id}/index.json`
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationIndex {
    #[serde(default)]
    pub items: Vec<RegistrationPage>,
}

/// One page of versions; `items` is omitted when the page lives at `@id`
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationPage {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationLeaf {
    #[serde(rename = "catalogEntry")]
    pub catalog_entry: CatalogEntry,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "dependencyGroups", default)]
    pub dependency_groups: Option<Vec<DependencyGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyGroup {
    #[serde(default)]
    pub dependencies: Option<Vec<RegistryDependency>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDependency {
    #[serde(default)]
    pub id: Option<String>,
}

impl CatalogEntry {
    /// Non-empty dependency ids across all target-framework groups
    pub fn dependency_ids(&self) -> Vec<PackageId> {
        let ids = self
            .dependency_groups
            .iter()
            .flatten()
            .filter_map(|group| group.dependencies.as_ref())
            .flatten()
            .filter_map(|dependency| dependency.id.clone())
            .filter(|id| !id.is_empty());

        dedup_preserving_order(ids)
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolver speaking the NuGet v3 registration protocol
#[derive(Debug)]
pub struct RegistryResolver {
    networking: NetworkingManager,
    index_url: String,
    registrations_base: OnceCell<String>,
}

impl RegistryResolver {
    /// Create a resolver for the service index at `index_url`.
    ///
    /// Nothing is fetched until the first lookup.
    pub fn new(networking: NetworkingManager, index_url: String) -> Self {
        Self {
            networking,
            index_url,
            registrations_base: OnceCell::new(),
        }
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Registration base URL with a trailing slash, fetched once
    async fn registrations_base(&self, package: &str) -> Result<&str, ResolutionError> {
        self.registrations_base
            .get_or_try_init(|| async {
                let index: ServiceIndex = self
                    .networking
                    .get_json(&self.index_url)
                    .await
                    .map_err(|e| to_resolution_error(package, e))?;

                let base = index
                    .registrations_base()
                    .ok_or_else(|| ResolutionError::Malformed {
                        package: package.to_string(),
                        reason: format!(
                            "service index {} has no {} resource",
                            self.index_url, REGISTRATION_RESOURCE_TYPES[0]
                        ),
                    })?;

                debug!("Registration base for {}: {}", self.index_url, base);

                let base = if base.ends_with('/') {
                    base.to_string()
                } else {
                    format!("{base}/")
                };
                Ok::<_, ResolutionError>(base)
            })
            .await
            .map(String::as_str)
    }

    /// Registration index URL for `package`
    pub fn registration_url(base: &str, package: &str) -> String {
        let id = package.to_lowercase();
        format!("{base}{}/index.json", utf8_percent_encode(&id, PATH_SEGMENT))
    }

    /// Catalog entry of the newest listed version
    async fn latest_entry(&self, package: &str) -> Result<CatalogEntry, ResolutionError> {
        let base = self.registrations_base(package).await?;
        let url = Self::registration_url(base, package);

        trace!("Fetching registration index {}", url);
        let index: RegistrationIndex = self
            .networking
            .get_json(&url)
            .await
            .map_err(|e| to_resolution_error(package, e))?;

        let malformed = |reason: String| ResolutionError::Malformed {
            package: package.to_string(),
            reason,
        };

        let last_page = index
            .items
            .into_iter()
            .last()
            .ok_or_else(|| malformed(format!("registration index {url} has no pages")))?;

        let leaves = match last_page.items {
            Some(leaves) => leaves,
            None => {
                trace!("Fetching registration page {}", last_page.id);
                let page: RegistrationPage = self
                    .networking
                    .get_json(&last_page.id)
                    .await
                    .map_err(|e| to_resolution_error(package, e))?;
                page.items.unwrap_or_default()
            }
        };

        leaves
            .into_iter()
            .last()
            .map(|leaf| leaf.catalog_entry)
            .ok_or_else(|| malformed(format!("registration page {} has no versions", last_page.id)))
    }
}

impl DependencyResolver for RegistryResolver {
    async fn resolve(&self, package: &str) -> Result<Vec<PackageId>, ResolutionError> {
        let entry = self.latest_entry(package).await?;
        Ok(entry.dependency_ids())
    }
}

/// Classify a networking failure for one package lookup
fn to_resolution_error(package: &str, error: NetworkingError) -> ResolutionError {
    let package = package.to_string();
    match error {
        NetworkingError::NotFound { .. } => ResolutionError::NotFound { package },
        NetworkingError::JsonError { .. } | NetworkingError::Decompression { .. } => {
            ResolutionError::Malformed {
                package,
                reason: error.to_string(),
            }
        }
        NetworkingError::RequestFailed { .. } | NetworkingError::UnexpectedStatus { .. } => {
            ResolutionError::Unreachable {
                package,
                reason: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("registry.test.rs");
}
