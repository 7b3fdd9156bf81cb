use super::*;
use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::Server;
use serde::Deserialize;
use std::io::Write;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Payload {
    name: String,
}

fn manager() -> NetworkingManager {
    NetworkingManager::new(NetworkingConfig {
        timeout_seconds: 5,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_default_config() {
    let config = NetworkingConfig::default();
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.max_jobs, 4);
    assert!(!config.trace_requests);
}

#[test]
fn test_manager_keeps_config() {
    assert_eq!(manager().config().timeout_seconds, 5);
}

#[test]
fn test_decode_plain_body_passes_through() {
    let body = br#"{"name":"plain"}"#;
    assert_eq!(decode_body("http://x", body).unwrap(), body.to_vec());
}

#[test]
fn test_decode_gzip_body() {
    let compressed = gzip(br#"{"name":"zipped"}"#);
    assert_eq!(
        decode_body("http://x", &compressed).unwrap(),
        br#"{"name":"zipped"}"#.to_vec()
    );
}

#[test]
fn test_decode_corrupt_gzip_header_fails() {
    // Gzip magic followed by an unknown compression method
    let corrupt = [0x1f, 0x8b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x01, 0x02];

    let result = decode_body("http://x/corrupt", &corrupt);
    assert!(matches!(
        result,
        Err(NetworkingError::Decompression { ref url, .. }) if url == "http://x/corrupt"
    ));
}

#[tokio::test]
async fn test_get_json_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/payload.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name":"ok"}"#)
        .create_async()
        .await;

    let url = format!("{}/payload.json", server.url());
    let payload: Payload = manager().get_json(&url).await.unwrap();

    assert_eq!(payload.name, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_json_content_encoding_gzip() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/payload.json")
        .with_status(200)
        .with_header("content-encoding", "gzip")
        .with_body(gzip(br#"{"name":"encoded"}"#))
        .create_async()
        .await;

    let url = format!("{}/payload.json", server.url());
    let payload: Payload = manager().get_json(&url).await.unwrap();

    assert_eq!(payload.name, "encoded");
}

#[tokio::test]
async fn test_get_json_raw_gzip_without_header() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/payload.json.gz")
        .with_status(200)
        .with_body(gzip(br#"{"name":"sniffed"}"#))
        .create_async()
        .await;

    let url = format!("{}/payload.json.gz", server.url());
    let payload: Payload = manager().get_json(&url).await.unwrap();

    assert_eq!(payload.name, "sniffed");
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let url = format!("{}/missing", server.url());
    let result = manager().get_bytes(&url).await;

    assert!(matches!(result, Err(NetworkingError::NotFound { .. })));
}

#[tokio::test]
async fn test_server_error_is_unexpected_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/broken")
        .with_status(503)
        .create_async()
        .await;

    let url = format!("{}/broken", server.url());
    let result = manager().get_bytes(&url).await;

    assert!(matches!(
        result,
        Err(NetworkingError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_invalid_json_is_reported_with_url() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/garbage")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let url = format!("{}/garbage", server.url());
    let result: Result<Payload, _> = manager().get_json(&url).await;

    assert!(matches!(result, Err(NetworkingError::JsonError { url: ref u, .. }) if *u == url));
}
