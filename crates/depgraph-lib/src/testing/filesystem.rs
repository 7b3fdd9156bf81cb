//! Filesystem-based testing utilities

use crate::resolver::nuspec::NUSPEC_NAMESPACE;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Temporary directory fixture with automatic cleanup
pub struct TempDirFixture {
    /// The temporary directory (automatically cleaned up on drop)
    pub temp_dir: TempDir,
}

impl TempDirFixture {
    /// Create a new temporary directory fixture
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        Ok(Self { temp_dir })
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write content to a file within the temporary directory
    pub fn write_file(
        &self,
        file_path: &str,
        content: &[u8],
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let full_path = self.path().join(file_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, content)?;
        Ok(full_path)
    }

    /// Write a JSON fixture map `package -> [dependencies]`
    pub fn write_fixture(
        &self,
        file_path: &str,
        entries: &[(&str, &[&str])],
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(package, deps)| (package.to_string(), serde_json::json!(deps)))
            .collect();

        self.write_file(file_path, serde_json::to_string_pretty(&map)?.as_bytes())
    }

    /// Write a `.nupkg` whose nuspec declares `id`, `version` and `dependencies`
    pub fn write_nupkg(
        &self,
        file_path: &str,
        id: &str,
        version: &str,
        dependencies: &[&str],
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let nuspec = nuspec_xml(id, version, dependencies);
        self.write_zip(file_path, &[(&format!("{id}.nuspec"), nuspec.as_bytes())])
    }

    /// Write a zip with arbitrary entries
    pub fn write_zip(
        &self,
        file_path: &str,
        entries: &[(&str, &[u8])],
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let full_path = self.path().join(file_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = ZipWriter::new(File::create(&full_path)?);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        for (name, content) in entries {
            writer.start_file(*name, options)?;
            writer.write_all(content)?;
        }
        writer.finish()?;

        Ok(full_path)
    }
}

/// A minimal nuspec document with one dependency group
pub fn nuspec_xml(id: &str, version: &str, dependencies: &[&str]) -> String {
    let dependencies: String = dependencies
        .iter()
        .map(|dep| format!("        <dependency id=\"{dep}\" version=\"1.0.0\" />\n"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="{NUSPEC_NAMESPACE}">
  <metadata>
    <id>{id}</id>
    <version>{version}</version>
    <dependencies>
      <group targetFramework="net8.0">
{dependencies}      </group>
    </dependencies>
  </metadata>
</package>
"#
    )
}
