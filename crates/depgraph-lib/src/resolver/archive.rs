//! Archive-backed resolver
//!
//! The repository is either one `.nupkg` file or a directory used as a local
//! feed. Every archive is read once when the feed is opened. An archive
//! provides the package named by the `<id>` of its first `.nuspec` entry,
//! whatever the file is called. Archives without a readable nuspec fall back
//! to their file name (`<id>.nupkg` or `<id>.<version>.nupkg`) so lookups
//! report them as malformed rather than missing. The highest version wins.

use super::DependencyResolver;
use super::nuspec::{NuspecError, NuspecMetadata, parse_nuspec};
use crate::primitives::{ConfigError, PackageId, ResolutionError};
use std::cmp::Ordering;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};
use zip::ZipArchive;

const ARCHIVE_EXTENSION: &str = ".nupkg";
const NUSPEC_EXTENSION: &str = ".nuspec";

/// Failures reading a single archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid zip archive {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("No .nuspec file found in {path}")]
    MissingNuspec { path: PathBuf },

    #[error("Invalid nuspec in {path}: {source}")]
    Nuspec { path: PathBuf, source: NuspecError },
}

/// Package version from a nuspec `<version>` or an archive file name
#[derive(Debug, Clone)]
pub struct ArchiveVersion {
    /// Numeric release segments; empty for `<id>.nupkg`
    pub release: Vec<u64>,
    pub prerelease: Option<String>,
}

impl ArchiveVersion {
    fn unversioned() -> Self {
        Self {
            release: Vec::new(),
            prerelease: None,
        }
    }

    /// Parse `1.2.3` or `1.2.3-beta.1`; build metadata (`+abc`) is ignored
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.split_once('+').map_or(value, |(version, _)| version);
        let (release, prerelease) = match value.split_once('-') {
            Some((release, pre)) if !pre.is_empty() => (release, Some(pre.to_string())),
            Some(_) => return None,
            None => (value, None),
        };

        let release = release
            .split('.')
            .map(|segment| segment.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            release,
            prerelease,
        })
    }
}

impl Ord for ArchiveVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let left = self.release.get(i).copied().unwrap_or(0);
            let right = other.release.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        // A release sorts above any of its prereleases
        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => compare_prerelease(left, right),
        }
    }
}

/// Dot-separated label comparison: numeric segments compare as numbers and
/// sort below alphanumeric ones, which compare case-insensitively. With a
/// common prefix the label with fewer segments sorts first.
fn compare_prerelease(left: &str, right: &str) -> Ordering {
    let mut left_segments = left.split('.');
    let mut right_segments = right.split('.');

    loop {
        let (left, right) = match (left_segments.next(), right_segments.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(left), Some(right)) => (left, right),
        };

        let ordering = match (left.parse::<u64>(), right.parse::<u64>()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => left.to_lowercase().cmp(&right.to_lowercase()),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

impl PartialOrd for ArchiveVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArchiveVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArchiveVersion {}

/// Version of `package` an archive file name provides, if it provides it at all
pub fn archive_version(file_name: &str, package: &str) -> Option<ArchiveVersion> {
    let file_name = file_name.to_lowercase();
    let package = package.to_lowercase();

    let stem = file_name.strip_suffix(ARCHIVE_EXTENSION)?;
    if stem == package {
        return Some(ArchiveVersion::unversioned());
    }

    let version = stem.strip_prefix(package.as_str())?.strip_prefix('.')?;
    ArchiveVersion::parse(version)
}

/// Read the nuspec metadata embedded in a `.nupkg`
pub fn read_archive(path: &Path) -> Result<NuspecMetadata, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let zip_error = |source| ArchiveError::Zip {
        path: path.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(zip_error)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        if !entry.name().to_lowercase().ends_with(NUSPEC_EXTENSION) {
            continue;
        }

        trace!("Reading {} from {}", entry.name(), path.display());

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|source| ArchiveError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        return parse_nuspec(&content).map_err(|source| ArchiveError::Nuspec {
            path: path.to_path_buf(),
            source,
        });
    }

    Err(ArchiveError::MissingNuspec {
        path: path.to_path_buf(),
    })
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_lowercase().ends_with(ARCHIVE_EXTENSION))
}

/// One archive of the feed with its nuspec, read when the feed is opened
#[derive(Debug)]
struct IndexedArchive {
    path: PathBuf,
    metadata: Result<NuspecMetadata, ArchiveError>,
}

impl IndexedArchive {
    fn read(path: PathBuf) -> Self {
        let metadata = read_archive(&path);
        if let Err(error) = &metadata {
            debug!("Unreadable archive {}: {}", path.display(), error);
        }
        Self { path, metadata }
    }

    /// Version of `package` this archive provides, if it provides it at all
    fn provides(&self, package: &str) -> Option<ArchiveVersion> {
        let from_file_name = || {
            let name = self.path.file_name()?.to_str()?;
            archive_version(name, package)
        };

        match &self.metadata {
            Ok(NuspecMetadata {
                id: Some(id),
                version,
                ..
            }) => {
                if id.to_lowercase() != package.to_lowercase() {
                    return None;
                }
                version
                    .as_deref()
                    .and_then(ArchiveVersion::parse)
                    .or_else(from_file_name)
                    .or_else(|| Some(ArchiveVersion::unversioned()))
            }
            _ => from_file_name(),
        }
    }
}

/// Resolver over a `.nupkg` file or a directory of them
#[derive(Debug)]
pub struct ArchiveResolver {
    source: PathBuf,
    archives: Vec<IndexedArchive>,
}

impl ArchiveResolver {
    /// Index the archives available at `source`
    pub fn open(source: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRepository {
            repo: source.display().to_string(),
            reason,
        };

        if !source.exists() {
            return Err(invalid("path does not exist".to_string()));
        }

        let archives = if source.is_dir() {
            let entries =
                std::fs::read_dir(source).map_err(|e| invalid(format!("cannot list directory: {e}")))?;

            let mut archives = Vec::new();
            for entry in entries {
                let path = entry
                    .map_err(|e| invalid(format!("cannot list directory: {e}")))?
                    .path();
                if path.is_file() && is_archive(&path) {
                    archives.push(path);
                }
            }
            archives.sort();
            archives
        } else if is_archive(source) {
            vec![source.to_path_buf()]
        } else {
            return Err(invalid(format!(
                "expected a {ARCHIVE_EXTENSION} file or a directory"
            )));
        };

        let archives: Vec<IndexedArchive> =
            archives.into_iter().map(IndexedArchive::read).collect();

        debug!(
            "Archive feed {} has {} packages",
            source.display(),
            archives.len()
        );

        Ok(Self {
            source: source.to_path_buf(),
            archives,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Archives in the feed, sorted by path
    pub fn archives(&self) -> Vec<&Path> {
        self.archives
            .iter()
            .map(|archive| archive.path.as_path())
            .collect()
    }

    fn find(&self, package: &str) -> Option<&IndexedArchive> {
        self.archives
            .iter()
            .filter_map(|archive| archive.provides(package).map(|version| (version, archive)))
            .max_by(|(left, _), (right, _)| left.cmp(right))
            .map(|(_, archive)| archive)
    }

    /// Highest-version archive providing `package`
    pub fn find_archive(&self, package: &str) -> Option<&Path> {
        self.find(package).map(|archive| archive.path.as_path())
    }
}

impl DependencyResolver for ArchiveResolver {
    async fn resolve(&self, package: &str) -> Result<Vec<PackageId>, ResolutionError> {
        let archive = self
            .find(package)
            .ok_or_else(|| ResolutionError::NotFound {
                package: package.to_string(),
            })?;

        trace!("Resolving {} from {}", package, archive.path.display());

        match &archive.metadata {
            Ok(metadata) => Ok(metadata.dependencies.clone()),
            Err(error) => Err(ResolutionError::Malformed {
                package: package.to_string(),
                reason: error.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("archive.test.rs");
}
