//! Mock resolver (testing)
//!
//! Scripted responses plus a call log, so tests can assert how often and in
//! which order the graph builder asked for each package.

use super::DependencyResolver;
use crate::primitives::{PackageId, ResolutionError};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockResolver {
    responses: HashMap<String, Result<Vec<PackageId>, ResolutionError>>,
    calls: Arc<Mutex<Vec<PackageId>>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockResolver {
    /// Create new mock resolver; unknown packages resolve to `NotFound`
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a successful response (exact-case key)
    pub fn with_dependencies(mut self, package: &str, dependencies: &[&str]) -> Self {
        self.responses.insert(
            package.to_string(),
            Ok(dependencies.iter().map(|d| d.to_string()).collect()),
        );
        self
    }

    /// Add a failing response
    pub fn with_failure(mut self, package: &str, error: ResolutionError) -> Self {
        self.responses.insert(package.to_string(), Err(error));
        self
    }

    /// Sleep before answering each lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Packages looked up so far, in call order
    pub async fn calls(&self) -> Vec<PackageId> {
        self.calls.lock().await.clone()
    }

    /// Number of lookups for one package
    pub async fn call_count(&self, package: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| *call == package)
            .count()
    }

    /// Highest number of lookups that were running at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl DependencyResolver for MockResolver {
    async fn resolve(&self, package: &str) -> Result<Vec<PackageId>, ResolutionError> {
        self.calls.lock().await.push(package.to_string());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(package) {
            Some(response) => response.clone(),
            None => Err(ResolutionError::NotFound {
                package: package.to_string(),
            }),
        }
    }
}
