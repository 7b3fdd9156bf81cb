use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_resolve_known_package() {
    let resolver = FixtureResolver::from_json(r#"{"A": ["B", "C"], "B": []}"#).unwrap();

    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["B", "C"]);
    assert!(resolver.resolve("B").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_ignores_case_but_keeps_spelling() {
    let resolver =
        FixtureResolver::from_json(r#"{"Newtonsoft.Json": ["System.Runtime"]}"#).unwrap();

    assert_eq!(
        resolver.resolve("NEWTONSOFT.JSON").await.unwrap(),
        vec!["System.Runtime"]
    );
    assert_eq!(
        resolver.resolve("newtonsoft.json").await.unwrap(),
        vec!["System.Runtime"]
    );
}

#[tokio::test]
async fn test_unknown_package_is_not_found() {
    let resolver = FixtureResolver::from_json(r#"{"A": []}"#).unwrap();

    let err = resolver.resolve("Z").await.unwrap_err();
    assert_eq!(
        err,
        ResolutionError::NotFound {
            package: "Z".to_string()
        }
    );
}

#[tokio::test]
async fn test_duplicate_dependencies_are_removed() {
    let resolver = FixtureResolver::from_json(r#"{"A": ["B", "C", "B"]}"#).unwrap();
    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["B", "C"]);
}

#[tokio::test]
async fn test_case_colliding_keys_keep_first() {
    let resolver = FixtureResolver::from_json(r#"{"A": ["B"], "a": ["C"]}"#).unwrap();

    assert_eq!(resolver.len(), 1);
    assert_eq!(resolver.resolve("a").await.unwrap(), vec!["B"]);
}

#[test]
fn test_rejects_non_object_json() {
    assert!(FixtureResolver::from_json(r#"["A", "B"]"#).is_err());
    assert!(FixtureResolver::from_json(r#"{"A": "B"}"#).is_err());
}

#[tokio::test]
async fn test_open_fixture_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"A": ["B"], "B": []}}"#).unwrap();

    let resolver = FixtureResolver::open(file.path()).unwrap();
    assert_eq!(resolver.len(), 2);
    assert_eq!(resolver.resolve("a").await.unwrap(), vec!["B"]);
}

#[test]
fn test_open_missing_file_is_config_error() {
    let err = FixtureResolver::open(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRepository { .. }));
    assert!(err.to_string().contains("cannot read fixture"));
}

#[test]
fn test_open_invalid_json_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = FixtureResolver::open(file.path()).unwrap_err();
    assert!(err.to_string().contains("invalid fixture JSON"));
}
