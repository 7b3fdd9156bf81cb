// Tests for the NuGet v3 registry resolver

use super::*;
use crate::networking::NetworkingConfig;
use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::{Mock, Server, ServerGuard};
use std::io::Write;

// ============================================================================
// Test Utilities
// ============================================================================

fn resolver_for(server: &ServerGuard) -> RegistryResolver {
    let networking = NetworkingManager::new(NetworkingConfig {
        timeout_seconds: 5,
        ..Default::default()
    })
    .unwrap();
    RegistryResolver::new(networking, format!("{}/v3/index.json", server.url()))
}

fn service_index(base: &str) -> String {
    format!(
        r#"{{
            "version": "3.0.0",
            "resources": [
                {{ "@id": "{base}/query", "@type": "SearchQueryService" }},
                {{ "@id": "{base}/registration5-gz-semver2/", "@type": "RegistrationsBaseUrl/3.6.0" }}
            ]
        }}"#
    )
}

async fn mock_service_index(server: &mut ServerGuard) -> Mock {
    let body = service_index(&server.url());
    server
        .mock("GET", "/v3/index.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// A leaf whose catalog entry declares `dependencies` in one group
fn leaf(version: &str, dependencies: &[&str]) -> String {
    let deps = dependencies
        .iter()
        .map(|id| format!(r#"{{ "id": "{id}", "range": "[1.0.0, )" }}"#))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{
            "catalogEntry": {{
                "version": "{version}",
                "dependencyGroups": [
                    {{ "targetFramework": "net8.0", "dependencies": [{deps}] }}
                ]
            }}
        }}"#
    )
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

// ============================================================================
// Wire Model Tests
// ============================================================================

#[test]
fn test_registrations_base_prefers_newest_type() {
    let index: ServiceIndex = serde_json::from_str(
        r#"{ "resources": [
            { "@id": "https://old/", "@type": "RegistrationsBaseUrl" },
            { "@id": "https://mid/", "@type": ["RegistrationsBaseUrl/3.4.0", "Other"] },
            { "@id": "https://new/", "@type": "RegistrationsBaseUrl/3.6.0" }
        ] }"#,
    )
    .unwrap();
    assert_eq!(index.registrations_base(), Some("https://new/"));

    let index: ServiceIndex = serde_json::from_str(
        r#"{ "resources": [
            { "@id": "https://old/", "@type": "RegistrationsBaseUrl" },
            { "@id": "https://mid/", "@type": ["RegistrationsBaseUrl/3.4.0", "Other"] }
        ] }"#,
    )
    .unwrap();
    assert_eq!(index.registrations_base(), Some("https://mid/"));

    let index: ServiceIndex = serde_json::from_str(r#"{ "resources": [] }"#).unwrap();
    assert_eq!(index.registrations_base(), None);
}

#[test]
fn test_catalog_entry_dependency_ids() {
    let entry: CatalogEntry = serde_json::from_str(
        r#"{
            "dependencyGroups": [
                { "targetFramework": "net6.0", "dependencies": [ { "id": "B" }, { "id": "C" } ] },
                { "targetFramework": "net8.0", "dependencies": [ { "id": "B" }, { "id": "" }, { "range": "1.0" } ] },
                { "targetFramework": "netstandard2.0" },
                { "dependencies": null }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(entry.dependency_ids(), vec!["B", "C"]);

    let empty: CatalogEntry = serde_json::from_str("{}").unwrap();
    assert!(empty.dependency_ids().is_empty());
}

#[test]
fn test_registration_url_encodes_id() {
    assert_eq!(
        RegistryResolver::registration_url("https://r/", "Newtonsoft.Json"),
        "https://r/newtonsoft.json/index.json"
    );
    assert_eq!(
        RegistryResolver::registration_url("https://r/", "a b/c"),
        "https://r/a%20b%2Fc/index.json"
    );
}

// ============================================================================
// Protocol Tests
// ============================================================================

#[tokio::test]
async fn test_resolve_inline_page() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;

    let body = format!(
        r#"{{ "items": [ {{ "@id": "{url}/page/0", "items": [ {old}, {new} ] }} ] }}"#,
        url = server.url(),
        old = leaf("1.0.0", &["Old"]),
        new = leaf("2.0.0", &["Microsoft.Extensions.Logging", "System.Memory"]),
    );
    server
        .mock("GET", "/registration5-gz-semver2/serilog/index.json")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let deps = resolver.resolve("Serilog").await.unwrap();

    assert_eq!(deps, vec!["Microsoft.Extensions.Logging", "System.Memory"]);
}

#[tokio::test]
async fn test_resolve_fetches_out_of_line_last_page() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;

    let url = server.url();
    let index = format!(
        r#"{{ "items": [
            {{ "@id": "{url}/pages/a/0.json" }},
            {{ "@id": "{url}/pages/a/1.json" }}
        ] }}"#
    );
    server
        .mock("GET", "/registration5-gz-semver2/a/index.json")
        .with_status(200)
        .with_body(index)
        .create_async()
        .await;

    let first_page = server
        .mock("GET", "/pages/a/0.json")
        .expect(0)
        .create_async()
        .await;
    let last_page = server
        .mock("GET", "/pages/a/1.json")
        .with_status(200)
        .with_body(format!(
            r#"{{ "@id": "{url}/pages/a/1.json", "items": [ {} ] }}"#,
            leaf("9.0.0", &["B"])
        ))
        .expect(1)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["B"]);

    first_page.assert_async().await;
    last_page.assert_async().await;
}

#[tokio::test]
async fn test_resolve_gzip_registration() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;

    let body = format!(
        r#"{{ "items": [ {{ "@id": "p", "items": [ {} ] }} ] }}"#,
        leaf("1.0.0", &["B"])
    );
    server
        .mock("GET", "/registration5-gz-semver2/a/index.json")
        .with_status(200)
        .with_header("content-encoding", "gzip")
        .with_body(gzip(body.as_bytes()))
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    assert_eq!(resolver.resolve("A").await.unwrap(), vec!["B"]);
}

#[tokio::test]
async fn test_service_index_fetched_once() {
    let mut server = Server::new_async().await;
    let body = service_index(&server.url());
    let index_mock = server
        .mock("GET", "/v3/index.json")
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    for id in ["a", "b"] {
        server
            .mock("GET", format!("/registration5-gz-semver2/{id}/index.json").as_str())
            .with_status(200)
            .with_body(format!(
                r#"{{ "items": [ {{ "@id": "p", "items": [ {} ] }} ] }}"#,
                leaf("1.0.0", &[])
            ))
            .create_async()
            .await;
    }

    let resolver = resolver_for(&server);
    assert!(resolver.resolve("A").await.unwrap().is_empty());
    assert!(resolver.resolve("B").await.unwrap().is_empty());

    index_mock.assert_async().await;
}

// ============================================================================
// Error Classification Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_package_is_not_found() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;
    server
        .mock("GET", "/registration5-gz-semver2/ghost/index.json")
        .with_status(404)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve("Ghost").await.unwrap_err();

    assert_eq!(
        err,
        ResolutionError::NotFound {
            package: "Ghost".to_string()
        }
    );
}

#[tokio::test]
async fn test_server_error_is_unreachable() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;
    server
        .mock("GET", "/registration5-gz-semver2/a/index.json")
        .with_status(500)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve("A").await.unwrap_err();

    assert!(matches!(err, ResolutionError::Unreachable { .. }));
}

#[tokio::test]
async fn test_missing_registration_resource_is_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v3/index.json")
        .with_status(200)
        .with_body(r#"{ "resources": [ { "@id": "x", "@type": "SearchQueryService" } ] }"#)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve("A").await.unwrap_err();

    assert!(
        matches!(err, ResolutionError::Malformed { ref reason, .. } if reason.contains("RegistrationsBaseUrl"))
    );
}

#[tokio::test]
async fn test_empty_registration_is_malformed() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;
    server
        .mock("GET", "/registration5-gz-semver2/a/index.json")
        .with_status(200)
        .with_body(r#"{ "items": [] }"#)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve("A").await.unwrap_err();

    assert!(matches!(err, ResolutionError::Malformed { .. }));
}

#[tokio::test]
async fn test_invalid_json_is_malformed() {
    let mut server = Server::new_async().await;
    mock_service_index(&mut server).await;
    server
        .mock("GET", "/registration5-gz-semver2/a/index.json")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve("A").await.unwrap_err();

    assert!(matches!(err, ResolutionError::Malformed { .. }));
}

#[tokio::test]
async fn test_unreachable_repository() {
    // Nothing listens on port 9 (discard) in the test environment
    let networking = NetworkingManager::new(NetworkingConfig {
        timeout_seconds: 2,
        ..Default::default()
    })
    .unwrap();
    let resolver = RegistryResolver::new(networking, "http://127.0.0.1:9/v3/index.json".to_string());

    let err = resolver.resolve("A").await.unwrap_err();
    assert!(matches!(err, ResolutionError::Unreachable { .. }));
}
