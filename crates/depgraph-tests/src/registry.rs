//! Mock NuGet v3 registry for end-to-end tests
//!
//! Serves a service index plus one registration index per package on a
//! local mockito server. Each package can be published with its versions
//! inlined, on a separate page, or gzip-compressed.

use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::{Mock, Server, ServerGuard};
use serde_json::{Value, json};
use std::io::Write;

/// Path prefix of registration resources on the mock server
pub const REGISTRATION_PATH: &str = "/v3/registration5-gz-semver2/";

/// How a registration index is served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// Leaves embedded in the index
    Inline,
    /// Index links to a page that must be fetched
    Remote,
    /// Inline, but the body is gzip-compressed
    Gzip,
}

/// A running mock registry; mocks live as long as this value
pub struct MockRegistry {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockRegistry {
    /// Start a server that already answers the service index
    pub async fn start() -> Self {
        let mut server = Server::new_async().await;
        let base = format!("{}{REGISTRATION_PATH}", server.url());

        let index = json!({
            "version": "3.0.0",
            "resources": [
                { "@id": format!("{}/query", server.url()), "@type": "SearchQueryService" },
                { "@id": base, "@type": ["RegistrationsBaseUrl/3.6.0", "RegistrationsBaseUrl"] },
            ]
        });

        let mock = server
            .mock("GET", "/v3/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(index.to_string())
            .create_async()
            .await;

        Self {
            server,
            mocks: vec![mock],
        }
    }

    /// Service index URL to pass as `--repo`
    pub fn index_url(&self) -> String {
        format!("{}/v3/index.json", self.server.url())
    }

    /// Publish `id` with one version depending on `dependencies`
    pub async fn publish(&mut self, id: &str, dependencies: &[&str], layout: PageLayout) {
        self.publish_versions(id, &[("1.0.0", dependencies)], layout)
            .await;
    }

    /// Publish `id` with several versions; the last one is the newest
    pub async fn publish_versions(
        &mut self,
        id: &str,
        versions: &[(&str, &[&str])],
        layout: PageLayout,
    ) {
        let lower = id.to_lowercase();
        let url = self.server.url();
        let page_url = format!("{url}{REGISTRATION_PATH}{lower}/page/1.json");
        let leaves: Vec<Value> = versions
            .iter()
            .map(|(version, deps)| leaf(id, version, deps))
            .collect();

        let index_path = format!("{REGISTRATION_PATH}{lower}/index.json");
        let mock = match layout {
            PageLayout::Inline | PageLayout::Gzip => {
                let body = json!({
                    "count": 1,
                    "items": [ { "@id": page_url, "count": leaves.len(), "items": leaves } ]
                })
                .to_string();

                let mock = self
                    .server
                    .mock("GET", index_path.as_str())
                    .with_status(200)
                    .with_header("content-type", "application/json");

                let mock = if layout == PageLayout::Gzip {
                    mock.with_header("content-encoding", "gzip")
                        .with_body(gzip(body.as_bytes()))
                } else {
                    mock.with_body(body)
                };
                mock.create_async().await
            }
            PageLayout::Remote => {
                let page = self
                    .server
                    .mock("GET", format!("{REGISTRATION_PATH}{lower}/page/1.json").as_str())
                    .with_status(200)
                    .with_body(json!({ "@id": page_url, "items": leaves }).to_string())
                    .create_async()
                    .await;
                self.mocks.push(page);

                self.server
                    .mock("GET", index_path.as_str())
                    .with_status(200)
                    .with_body(json!({ "count": 1, "items": [ { "@id": page_url, "count": leaves.len() } ] }).to_string())
                    .create_async()
                    .await
            }
        };

        self.mocks.push(mock);
    }

    /// Answer `id` with an HTTP status, e.g. 404 or 500
    pub async fn fail(&mut self, id: &str, status: usize) {
        let path = format!("{REGISTRATION_PATH}{}/index.json", id.to_lowercase());
        let mock = self
            .server
            .mock("GET", path.as_str())
            .with_status(status)
            .create_async()
            .await;
        self.mocks.push(mock);
    }
}

/// Registration leaf with a single dependency group
fn leaf(id: &str, version: &str, dependencies: &[&str]) -> Value {
    let dependencies: Vec<Value> = dependencies
        .iter()
        .map(|dep| json!({ "id": dep, "range": "[1.0.0, )" }))
        .collect();

    json!({
        "catalogEntry": {
            "id": id,
            "version": version,
            "dependencyGroups": [
                { "targetFramework": "net8.0", "dependencies": dependencies }
            ]
        }
    })
}

/// Gzip-compress a response body
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .unwrap_or_default()
}
