// Tests for resolver configuration and dispatch

use super::*;
use crate::testing::TempDirFixture;

#[test]
fn test_dedup_preserving_order() {
    let ids = ["B", "A", "B", "C", "A"].map(String::from);
    assert_eq!(dedup_preserving_order(ids), vec!["B", "A", "C"]);

    // Distinct by bytes only
    let ids = ["Foo", "foo"].map(String::from);
    assert_eq!(dedup_preserving_order(ids), vec!["Foo", "foo"]);
}

// ============================================================================
// URL Validation
// ============================================================================

#[test]
fn test_validate_url_accepts_http_and_https() {
    assert!(validate_url("https://api.nuget.org/v3/index.json").is_ok());
    assert!(validate_url("http://localhost:5000/v3/index.json").is_ok());
}

#[test]
fn test_validate_url_rejects_invalid() {
    for repo in ["api.nuget.org/v3/index.json", "ftp://host/index.json", "not a url", ""] {
        let err = validate_url(repo).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidRepository { repo: ref r, .. } if r == repo),
            "expected InvalidRepository for {repo:?}"
        );
    }
}

// ============================================================================
// Connect
// ============================================================================

#[test]
fn test_connect_registry() {
    let config = ResolverConfig::new(ResolverMode::Registry, "https://api.nuget.org/v3/index.json");
    let resolver = config.connect(&NetworkingConfig::default()).unwrap();

    assert_eq!(resolver.mode(), ResolverMode::Registry);
    assert!(matches!(resolver, Resolver::Registry(ref r) if r.index_url() == config.repo));
}

#[test]
fn test_connect_registry_rejects_path() {
    let config = ResolverConfig::new(ResolverMode::Registry, "/tmp/feed");
    assert!(config.connect(&NetworkingConfig::default()).is_err());
}

#[test]
fn test_connect_archive_and_fixture() {
    let fixture = TempDirFixture::new().unwrap();
    let nupkg = fixture.write_nupkg("A.1.0.0.nupkg", "A", "1.0.0", &[]).unwrap();
    let json = fixture.write_fixture("deps.json", &[("A", &["B"])]).unwrap();

    let archive = ResolverConfig::new(ResolverMode::Archive, nupkg.display().to_string())
        .connect(&NetworkingConfig::default())
        .unwrap();
    assert_eq!(archive.mode(), ResolverMode::Archive);

    let fixture_resolver = ResolverConfig::new(ResolverMode::Fixture, json.display().to_string())
        .connect(&NetworkingConfig::default())
        .unwrap();
    assert_eq!(fixture_resolver.mode(), ResolverMode::Fixture);
}

#[test]
fn test_connect_missing_paths() {
    for mode in [ResolverMode::Archive, ResolverMode::Fixture] {
        let err = ResolverConfig::new(mode, "/definitely/not/here")
            .connect(&NetworkingConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRepository { .. }));
    }
}

#[tokio::test]
async fn test_resolver_dispatches_to_backend() {
    let fixture = TempDirFixture::new().unwrap();
    let json = fixture
        .write_fixture("deps.json", &[("A", &["B", "C"]), ("B", &[])])
        .unwrap();

    let resolver = ResolverConfig::new(ResolverMode::Fixture, json.display().to_string())
        .connect(&NetworkingConfig::default())
        .unwrap();

    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["B", "C"]);
    assert!(matches!(
        resolver.resolve("Z").await,
        Err(ResolutionError::NotFound { .. })
    ));
}
