use crate::error::ConfigError;
use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// How the value of each transfer is chosen. Amounts are in human units (e.g. ETH).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AmountPolicy {
    Fixed { value: f64 },
    Random { min: f64, max: f64 },
}

/// What the dispatcher does with the endpoint pool after a failed transfer.
/// It never retries the failed index in either mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    #[default]
    Never,
    /// Move to the next endpoint before the next index when the endpoint was unreachable.
    OnConnectivityFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Expected chain id; checked against the node at startup when present.
    #[serde(default)]
    pub chain_id: Option<u64>,
    pub rpc_urls: Vec<String>,
    pub explorer_url: String,
    #[serde(default = "default_tx_path")]
    pub tx_path: String,
    #[serde(default = "default_address_path")]
    pub address_path: String,
    /// Skips the chain registry lookup when set.
    #[serde(default)]
    pub native_symbol: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub recipient: String,
    pub transactions: usize,
    pub amount: AmountPolicy,
    /// Zero disables the timeout.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Full file layout: batch settings plus the `[chains.<network>.<chain>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    pub batch: BatchConfig,
    #[serde(default)]
    pub chains: HashMap<String, HashMap<String, ChainConfig>>,
}

fn default_tx_path() -> String {
    "tx".to_string()
}

fn default_address_path() -> String {
    "address".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

impl BatchConfig {
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        (self.confirmation_timeout_secs > 0)
            .then(|| Duration::from_secs(self.confirmation_timeout_secs))
    }

    /// Checks count and recipient. Amount bounds are checked when the generator is built.
    pub fn validate(&self) -> Result<Address, ConfigError> {
        if self.transactions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "transactions".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        parse_recipient(&self.recipient)
    }
}

impl TransferConfig {
    pub fn chain(&self, network: &str, chain: &str) -> Result<&ChainConfig, ConfigError> {
        self.chains
            .get(network)
            .and_then(|chains| chains.get(chain))
            .ok_or_else(|| ConfigError::UnknownChain {
                network: network.to_string(),
                chain: chain.to_string(),
            })
    }

    /// Chain names configured for a network, sorted.
    pub fn available_chains(&self, network: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .chains
            .get(network)
            .map(|chains| chains.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

/// Parses a `0x`-prefixed 20-byte address. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lower or all-upper input is accepted as is.
pub fn parse_recipient(input: &str) -> Result<Address, ConfigError> {
    let invalid = || ConfigError::InvalidRecipient {
        address: input.to_string(),
    };

    let trimmed = input.trim();
    let hex_part = trimmed.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let address: Address = trimmed.parse().map_err(|_| invalid())?;

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None) != trimmed {
        return Err(invalid());
    }

    Ok(address)
}
