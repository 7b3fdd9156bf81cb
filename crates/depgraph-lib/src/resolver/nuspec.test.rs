// Tests for nuspec parsing

use super::*;

const NEWTONSOFT_NUSPEC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata minClientVersion="2.12">
    <id>Serilog.Sinks.File</id>
    <version>5.0.0</version>
    <authors>Serilog Contributors</authors>
    <dependencies>
      <group targetFramework=".NETFramework4.5">
        <dependency id="Serilog" version="2.10.0" exclude="Build,Analyzers" />
      </group>
      <group targetFramework=".NETStandard2.0">
        <dependency id="Serilog" version="2.10.0" exclude="Build,Analyzers" />
        <dependency id="System.Text.Encoding.Extensions" version="4.3.0" />
      </group>
    </dependencies>
  </metadata>
</package>"#;

#[test]
fn test_parse_metadata_and_dependencies() {
    let metadata = parse_nuspec(NEWTONSOFT_NUSPEC).unwrap();

    assert_eq!(metadata.id.as_deref(), Some("Serilog.Sinks.File"));
    assert_eq!(metadata.version.as_deref(), Some("5.0.0"));
    assert_eq!(
        metadata.dependencies,
        vec!["Serilog", "System.Text.Encoding.Extensions"]
    );
}

#[test]
fn test_no_dependencies() {
    let xml = r#"<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata><id>Leaf</id><version>1.0.0</version></metadata>
</package>"#;

    let metadata = parse_nuspec(xml).unwrap();
    assert_eq!(metadata.id.as_deref(), Some("Leaf"));
    assert!(metadata.dependencies.is_empty());
}

#[test]
fn test_older_schema_revision_is_accepted() {
    let xml = r#"<package xmlns="http://schemas.microsoft.com/packaging/2010/07/nuspec.xsd">
  <metadata>
    <id>Old</id>
    <dependencies><dependency id="Legacy.Core" version="1.0" /></dependencies>
  </metadata>
</package>"#;

    assert_eq!(parse_nuspec(xml).unwrap().dependencies, vec!["Legacy.Core"]);
}

#[test]
fn test_prefixed_namespace() {
    let xml = r#"<nu:package xmlns:nu="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <nu:metadata>
    <nu:id>Prefixed</nu:id>
    <nu:dependencies><nu:dependency id="Core"></nu:dependency></nu:dependencies>
  </nu:metadata>
</nu:package>"#;

    let metadata = parse_nuspec(xml).unwrap();
    assert_eq!(metadata.id.as_deref(), Some("Prefixed"));
    assert_eq!(metadata.dependencies, vec!["Core"]);
}

#[test]
fn test_elements_outside_namespace_are_ignored() {
    let xml = r#"<package>
  <metadata>
    <id>NoNamespace</id>
    <dependencies><dependency id="Ignored" /></dependencies>
  </metadata>
</package>"#;

    let metadata = parse_nuspec(xml).unwrap();
    assert_eq!(metadata.id, None);
    assert!(metadata.dependencies.is_empty());
}

#[test]
fn test_foreign_dependency_element_is_ignored() {
    let xml = r#"<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd"
         xmlns:x="urn:example">
  <metadata>
    <dependencies>
      <dependency id="Kept" />
      <x:dependency id="Dropped" />
    </dependencies>
  </metadata>
</package>"#;

    assert_eq!(parse_nuspec(xml).unwrap().dependencies, vec!["Kept"]);
}

#[test]
fn test_escaped_and_blank_ids() {
    let xml = r#"<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata>
    <dependencies>
      <dependency id="A&amp;B" />
      <dependency id="  " />
      <dependency version="1.0" />
    </dependencies>
  </metadata>
</package>"#;

    assert_eq!(parse_nuspec(xml).unwrap().dependencies, vec!["A&B"]);
}

#[test]
fn test_mismatched_tags_are_an_error() {
    let xml = r#"<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata></package>"#;

    assert!(matches!(parse_nuspec(xml), Err(NuspecError::Xml(_))));
}

#[test]
fn test_namespace_matching() {
    assert!(is_nuspec_namespace(NUSPEC_NAMESPACE.as_bytes()));
    assert!(is_nuspec_namespace(
        b"http://schemas.microsoft.com/packaging/2011/08/nuspec.xsd"
    ));
    assert!(!is_nuspec_namespace(b"http://example.com/nuspec.xsd"));
    assert!(!is_nuspec_namespace(b"http://schemas.microsoft.com/packaging/2013/05/other.xsd"));
}
