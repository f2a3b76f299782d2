//! # Core Logic - RPC Endpoint Pool
//!
//! Ordered set of RPC endpoints for one network with an explicit rotation cursor.
//! The pool is owned by the batch that built it and lent to the dispatcher by
//! `&mut`; it never rotates by itself.

use crate::error::ConfigError;
use ethers::providers::{Http, Provider};
use reqwest::{Client, Url};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// A single RPC endpoint and the provider handle bound to it.
#[derive(Debug)]
pub struct RpcEndpoint {
    pub url: String,
    provider: Provider<Http>,
    failure_count: AtomicU64,
}

impl RpcEndpoint {
    pub fn new(url: &str, client: Client, poll_interval: Duration) -> Result<Self, ConfigError> {
        let parsed: Url = url.parse().map_err(|_| ConfigError::InvalidRpcUrl {
            url: url.to_string(),
        })?;
        let provider = Provider::new(Http::new_with_client(parsed, client)).interval(poll_interval);

        Ok(Self {
            url: url.to_string(),
            provider,
            failure_count: AtomicU64::new(0),
        })
    }

    pub fn provider(&self) -> &Provider<Http> {
        &self.provider
    }

    /// Failures recorded since the last success
    pub fn failures(&self) -> u64 {
        self.failure_count.load(Ordering::SeqCst)
    }
}

/// Health status of an RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcHealthStatus {
    pub url: String,
    pub failure_count: u64,
    pub current: bool,
}

#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<RpcEndpoint>,
    current_index: usize,
}

impl EndpointPool {
    /// Build a pool sharing one HTTP client across all endpoints.
    pub fn new(urls: &[String], poll_interval: Duration) -> Result<Self, ConfigError> {
        if urls.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "http_client".to_string(),
                reason: e.to_string(),
            })?;

        let endpoints = urls
            .iter()
            .map(|url| RpcEndpoint::new(url, client.clone(), poll_interval))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            endpoints,
            current_index: 0,
        })
    }

    pub fn current(&self) -> &RpcEndpoint {
        &self.endpoints[self.current_index]
    }

    /// Advance the cursor cyclically and return the new current endpoint.
    pub fn rotate(&mut self) -> &RpcEndpoint {
        let previous = self.current_index;
        self.current_index = (self.current_index + 1) % self.endpoints.len();
        if previous != self.current_index {
            debug!(
                "Rotated RPC endpoint {} -> {}",
                self.endpoints[previous].url, self.endpoints[self.current_index].url
            );
        }
        self.current()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.url.as_str()).collect()
    }

    pub fn record_success(&self, url: &str) {
        if let Some(endpoint) = self.find(url) {
            endpoint.failure_count.store(0, Ordering::SeqCst);
        }
    }

    pub fn record_failure(&self, url: &str) {
        if let Some(endpoint) = self.find(url) {
            let failures = endpoint.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
            if failures >= 3 {
                warn!("RPC {} has failed {} times in a row", url, failures);
            }
        }
    }

    pub fn health_status(&self) -> Vec<RpcHealthStatus> {
        self.endpoints
            .iter()
            .enumerate()
            .map(|(i, e)| RpcHealthStatus {
                url: e.url.clone(),
                failure_count: e.failures(),
                current: i == self.current_index,
            })
            .collect()
    }

    fn find(&self, url: &str) -> Option<&RpcEndpoint> {
        self.endpoints.iter().find(|e| e.url == url)
    }
}
