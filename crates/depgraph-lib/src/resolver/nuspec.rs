//! nuspec metadata parsing
//!
//! Extracts the package id, version and every `dependency` element's `id`
//! from a NuGet `.nuspec` document. Only elements bound to a NuGet nuspec
//! namespace are considered.

use crate::primitives::PackageId;
use quick_xml::events::Event;
use quick_xml::events::attributes::AttrError;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

/// Namespace of current nuspec documents
pub const NUSPEC_NAMESPACE: &str = "http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd";

/// Older schema revisions share this prefix and the `/nuspec.xsd` suffix
const NUSPEC_NAMESPACE_PREFIX: &str = "http://schemas.microsoft.com/packaging/";
const NUSPEC_NAMESPACE_SUFFIX: &str = "/nuspec.xsd";

#[derive(Debug, Error)]
pub enum NuspecError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("Invalid text in <{element}>: {reason}")]
    InvalidText { element: String, reason: String },
}

/// Fields of interest from a nuspec document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NuspecMetadata {
    pub id: Option<String>,
    pub version: Option<String>,
    /// Dependency ids across all groups, first occurrence order, no duplicates
    pub dependencies: Vec<PackageId>,
}

pub fn is_nuspec_namespace(namespace: &[u8]) -> bool {
    std::str::from_utf8(namespace).is_ok_and(|ns| {
        ns.starts_with(NUSPEC_NAMESPACE_PREFIX) && ns.ends_with(NUSPEC_NAMESPACE_SUFFIX)
    })
}

/// Parse a nuspec document
pub fn parse_nuspec(xml: &str) -> Result<NuspecMetadata, NuspecError> {
    let mut reader = NsReader::from_str(xml);
    let mut metadata = NuspecMetadata::default();
    let mut dependencies = Vec::new();

    // Local names of open nuspec elements; foreign elements are kept as None
    let mut path: Vec<Option<Vec<u8>>> = Vec::new();
    let mut text = String::new();

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let in_nuspec = matches!(resolved, ResolveResult::Bound(ns) if is_nuspec_namespace(ns.as_ref()));

        match event {
            Event::Start(e) => {
                if in_nuspec && e.local_name().as_ref() == b"dependency" {
                    if let Some(id) = dependency_id(&e)? {
                        dependencies.push(id);
                    }
                }
                path.push(in_nuspec.then(|| e.local_name().as_ref().to_vec()));
                text.clear();
            }
            Event::Empty(e) => {
                if in_nuspec && e.local_name().as_ref() == b"dependency" {
                    if let Some(id) = dependency_id(&e)? {
                        dependencies.push(id);
                    }
                }
            }
            Event::Text(e) => {
                let raw = e.into_inner();
                let chunk = std::str::from_utf8(&raw).map_err(|err| NuspecError::InvalidText {
                    element: current_element(&path),
                    reason: err.to_string(),
                })?;
                text.push_str(chunk);
            }
            Event::End(_) => {
                match metadata_field(&path) {
                    Some(b"id") => metadata.id = non_empty(&text),
                    Some(b"version") => metadata.version = non_empty(&text),
                    _ => {}
                }
                path.pop();
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    metadata.dependencies = super::dedup_preserving_order(dependencies);
    Ok(metadata)
}

/// `id` attribute of a `dependency` element, unescaped
fn dependency_id(element: &quick_xml::events::BytesStart<'_>) -> Result<Option<PackageId>, NuspecError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() != b"id" {
            continue;
        }

        let invalid = |reason: String| NuspecError::InvalidText {
            element: "dependency".to_string(),
            reason,
        };
        let raw = std::str::from_utf8(&attr.value).map_err(|e| invalid(e.to_string()))?;
        let id = quick_xml::escape::unescape(raw).map_err(|e| invalid(e.to_string()))?;

        return Ok(non_empty(&id));
    }

    Ok(None)
}

/// Name of the element directly under `package/metadata`, if that is where we are
fn metadata_field(path: &[Option<Vec<u8>>]) -> Option<&[u8]> {
    match path {
        [.., Some(parent), Some(field)] if parent.as_slice() == b"metadata" => {
            Some(field.as_slice())
        }
        _ => None,
    }
}

fn current_element(path: &[Option<Vec<u8>>]) -> String {
    path.last()
        .and_then(|name| name.as_deref())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    include!("nuspec.test.rs");
}
