use crate::traits::SymbolResolver;
use crate::utils::retry::{with_retry, RetryConfig};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const UNKNOWN_SYMBOL: &str = "Unknown";

const CHAIN_REGISTRY_URL: &str = "https://chainid.network/chains.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryChain {
    chain_id: u64,
    #[serde(default)]
    native_currency: Option<NativeCurrency>,
}

#[derive(Debug, Deserialize)]
struct NativeCurrency {
    symbol: String,
}

/// Looks the symbol up in the public chain list (chainid.network).
pub struct ChainRegistryResolver {
    client: Client,
    url: String,
    retry: RetryConfig,
}

impl ChainRegistryResolver {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: CHAIN_REGISTRY_URL.to_string(),
            retry: RetryConfig::new(2, 500),
        })
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    async fn fetch(&self) -> Result<Vec<RegistryChain>> {
        let chains = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RegistryChain>>()
            .await?;
        Ok(chains)
    }
}

#[async_trait]
impl SymbolResolver for ChainRegistryResolver {
    async fn resolve(&self, chain_id: u64) -> Result<String> {
        let chains = with_retry(self.retry, "chain registry fetch", || self.fetch()).await?;

        chains
            .into_iter()
            .find(|chain| chain.chain_id == chain_id)
            .and_then(|chain| chain.native_currency)
            .map(|currency| currency.symbol)
            .ok_or_else(|| anyhow!("chain {} not listed in registry", chain_id))
    }
}

/// Caches lookups for the lifetime of one run and never fails: lookup errors
/// resolve to [`UNKNOWN_SYMBOL`], which is cached as well.
pub struct CachedSymbolResolver<R> {
    inner: R,
    cache: Mutex<HashMap<u64, String>>,
}

impl<R: SymbolResolver> CachedSymbolResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve_or_default(&self, chain_id: u64) -> String {
        let mut cache = self.cache.lock().await;
        if let Some(symbol) = cache.get(&chain_id) {
            return symbol.clone();
        }

        let symbol = match self.inner.resolve(chain_id).await {
            Ok(symbol) => {
                debug!("Resolved native symbol for chain {}: {}", chain_id, symbol);
                symbol
            }
            Err(e) => {
                warn!("Symbol lookup for chain {} failed: {:#}", chain_id, e);
                UNKNOWN_SYMBOL.to_string()
            }
        };

        cache.insert(chain_id, symbol.clone());
        symbol
    }
}
