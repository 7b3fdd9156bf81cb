// Tests for the archive-backed resolver

use super::*;
use crate::testing::TempDirFixture;

// ============================================================================
// File Name Matching
// ============================================================================

#[test]
fn test_archive_version_matching() {
    let version = archive_version("Newtonsoft.Json.13.0.3.nupkg", "newtonsoft.json").unwrap();
    assert_eq!(version.release, vec![13, 0, 3]);
    assert_eq!(version.prerelease, None);

    let version = archive_version("serilog.nupkg", "Serilog").unwrap();
    assert!(version.release.is_empty());

    let version = archive_version("Foo.2.0.0-beta.1.nupkg", "Foo").unwrap();
    assert_eq!(version.prerelease.as_deref(), Some("beta.1"));
}

#[test]
fn test_archive_version_rejects_other_packages() {
    // Prefix of a longer id
    assert!(archive_version("Foo.Bar.1.0.0.nupkg", "Foo").is_none());
    // Segment starting with a digit that is not a version
    assert!(archive_version("Foo.2D.1.0.nupkg", "Foo").is_none());
    assert!(archive_version("Foo.1.0.0.zip", "Foo").is_none());
    assert!(archive_version("Foobar.1.0.nupkg", "Foo").is_none());
}

#[test]
fn test_archive_version_ordering() {
    let v = |s: &str| ArchiveVersion::parse(s).unwrap();

    assert!(v("1.10.0") > v("1.9.0"));
    assert!(v("2.0.0") > v("2.0.0-rc.1"));
    assert!(v("2.0.0-rc.2") > v("2.0.0-rc.1"));
    assert_eq!(v("1.0"), v("1.0.0"));
    assert_eq!(v("1.0.0+build.7"), v("1.0.0"));
}

#[test]
fn test_prerelease_labels_compare_by_segment() {
    let v = |s: &str| ArchiveVersion::parse(s).unwrap();

    assert!(v("1.0.0-beta.10") > v("1.0.0-beta.2"));
    assert!(v("1.0.0-beta.2") > v("1.0.0-beta"));
    assert!(v("1.0.0-alpha") > v("1.0.0-1"));
    assert!(v("1.0.0-rc.1") > v("1.0.0-beta.11"));
    assert_eq!(v("1.0.0-RC.1"), v("1.0.0-rc.1"));
    assert!(ArchiveVersion::parse("1.0.0-").is_none());
    assert!(ArchiveVersion::parse("").is_none());
}

// ============================================================================
// Reading Archives
// ============================================================================

#[test]
fn test_read_archive_metadata() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture
        .write_nupkg("A.1.0.0.nupkg", "A", "1.0.0", &["B", "C"])
        .unwrap();

    let metadata = read_archive(&path).unwrap();
    assert_eq!(metadata.id.as_deref(), Some("A"));
    assert_eq!(metadata.dependencies, vec!["B", "C"]);
}

#[test]
fn test_read_archive_without_nuspec() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture
        .write_zip("A.1.0.0.nupkg", &[("lib/net8.0/A.dll", b"binary")])
        .unwrap();

    assert!(matches!(
        read_archive(&path),
        Err(ArchiveError::MissingNuspec { .. })
    ));
}

#[test]
fn test_read_archive_not_a_zip() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture.write_file("A.1.0.0.nupkg", b"plain text").unwrap();

    assert!(matches!(read_archive(&path), Err(ArchiveError::Zip { .. })));
}

// ============================================================================
// Resolver
// ============================================================================

#[tokio::test]
async fn test_single_archive_resolves_its_package() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture
        .write_nupkg("Serilog.Sinks.File.5.0.0.nupkg", "Serilog.Sinks.File", "5.0.0", &["Serilog"])
        .unwrap();

    let resolver = ArchiveResolver::open(&path).unwrap();
    assert_eq!(resolver.source(), path.as_path());
    assert_eq!(resolver.archives().len(), 1);

    assert_eq!(
        resolver.resolve("serilog.sinks.file").await.unwrap(),
        vec!["Serilog"]
    );
    assert!(matches!(
        resolver.resolve("Serilog").await,
        Err(ResolutionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_archive_is_matched_by_nuspec_id() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture
        .write_nupkg("package.nupkg", "MyLib", "1.0.0", &["Dep"])
        .unwrap();

    let resolver = ArchiveResolver::open(&path).unwrap();

    assert_eq!(resolver.resolve("MyLib").await.unwrap(), vec!["Dep"]);
    assert_eq!(resolver.resolve("mylib").await.unwrap(), vec!["Dep"]);
    assert_eq!(resolver.find_archive("MYLIB"), Some(path.as_path()));
    assert!(matches!(
        resolver.resolve("package").await,
        Err(ResolutionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_feed_versions_come_from_nuspec() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_nupkg("feed/a.nupkg", "A", "2.0.0-beta.2", &["Mid"]).unwrap();
    fixture.write_nupkg("feed/b.nupkg", "A", "2.0.0-beta.10", &["New"]).unwrap();
    fixture.write_nupkg("feed/c.nupkg", "A", "1.5.0", &["Old"]).unwrap();

    let resolver = ArchiveResolver::open(&fixture.path().join("feed")).unwrap();

    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["New"]);
    assert_eq!(
        resolver.find_archive("a"),
        Some(fixture.path().join("feed/b.nupkg").as_path())
    );
}

#[tokio::test]
async fn test_directory_feed_picks_highest_version() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_nupkg("feed/A.1.0.0.nupkg", "A", "1.0.0", &["Old"]).unwrap();
    fixture.write_nupkg("feed/A.1.10.0.nupkg", "A", "1.10.0", &["New"]).unwrap();
    fixture.write_nupkg("feed/A.1.9.0.nupkg", "A", "1.9.0", &["Mid"]).unwrap();
    fixture.write_nupkg("feed/B.2.0.0.nupkg", "B", "2.0.0", &[]).unwrap();
    fixture.write_file("feed/readme.txt", b"not an archive").unwrap();

    let resolver = ArchiveResolver::open(&fixture.path().join("feed")).unwrap();
    assert_eq!(resolver.archives().len(), 4);

    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["New"]);
    assert!(resolver.resolve("B").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_broken_archive_is_malformed() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_file("feed/A.1.0.0.nupkg", b"garbage").unwrap();

    let resolver = ArchiveResolver::open(&fixture.path().join("feed")).unwrap();
    let err = resolver.resolve("A").await.unwrap_err();

    assert!(matches!(err, ResolutionError::Malformed { ref package, .. } if package == "A"));
}

#[test]
fn test_open_rejects_missing_path() {
    let err = ArchiveResolver::open(Path::new("/no/such/feed")).unwrap_err();
    assert!(err.to_string().contains("path does not exist"));
}

#[test]
fn test_open_rejects_non_archive_file() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture.write_file("deps.json", b"{}").unwrap();

    let err = ArchiveResolver::open(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRepository { .. }));
}
