use flate2::read::GzDecoder;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Leading bytes of a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Networking errors for registry communication
#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Failed to decompress response from {url}: {source}")]
    Decompression {
        url: String,
        source: std::io::Error,
    },

    #[error("JSON parsing failed for {url}: {source}")]
    JsonError {
        url: String,
        source: serde_json::Error,
    },
}

/// HTTP and concurrency configuration
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// Maximum concurrent lookups per traversal level (from CLI --jobs)
    pub max_jobs: usize,
    /// HTTP client timeout in seconds
    pub timeout_seconds: u64,
    /// Enable request/response tracing
    pub trace_requests: bool,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            max_jobs: 4,
            timeout_seconds: 30,
            trace_requests: false,
        }
    }
}

/// Shared HTTP client for registry lookups
#[derive(Debug, Clone)]
pub struct NetworkingManager {
    client: Client,
    config: NetworkingConfig,
}

impl NetworkingManager {
    /// Build the HTTP client with timeout and transparent gzip decoding
    pub fn new(config: NetworkingConfig) -> Result<Self, reqwest::Error> {
        trace!("Initializing networking manager");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .user_agent(concat!("depgraph/", env!("CARGO_PKG_VERSION")))
            .build()?;

        trace!(
            "Networking manager initialized: {}s timeout, {} concurrent jobs",
            config.timeout_seconds, config.max_jobs
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NetworkingConfig {
        &self.config
    }

    /// GET a resource and return its (decompressed) body
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, NetworkingError> {
        if self.config.trace_requests {
            trace!("GET {}", url);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(NetworkingError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(NetworkingError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;

        if self.config.trace_requests {
            trace!("{} {} ({} bytes)", status.as_u16(), url, body.len());
        }

        decode_body(url, &body)
    }

    /// GET a resource and decode it as JSON
    pub async fn get_json<T>(&self, url: &str) -> Result<T, NetworkingError>
    where
        T: DeserializeOwned,
    {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|source| NetworkingError::JsonError {
            url: url.to_string(),
            source,
        })
    }
}

/// Inflate gzip bodies the server sent without a `Content-Encoding` header.
/// Bodies already decoded by the client pass through unchanged.
pub fn decode_body(url: &str, body: &[u8]) -> Result<Vec<u8>, NetworkingError> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(body.to_vec());
    }

    let mut decoded = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|source| NetworkingError::Decompression {
            url: url.to_string(),
            source,
        })?;

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
