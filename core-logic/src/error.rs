//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.
//!
//! Only [`ConfigError`] and [`WalletError`] ever abort a batch, and both are raised
//! before the first transaction is submitted. Per-transaction problems are captured as
//! [`DispatchError`] values inside a failed outcome.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Network(NetworkError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

/// Configuration-related errors. Always fatal, always raised before dispatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("No RPC endpoints configured")]
    NoEndpoints,

    #[error("Signer list is empty: at least one private key is required")]
    EmptySigners,

    #[error("Invalid recipient address '{address}'")]
    InvalidRecipient { address: String },

    #[error("Invalid amount for '{field}': {reason}")]
    InvalidAmount { field: String, reason: String },

    #[error("Invalid random range: max ({max}) must be greater than min ({min})")]
    InvertedRange { min: f64, max: f64 },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown chain '{chain}' for network '{network}'")]
    UnknownChain { network: String, chain: String },
}

/// Credential errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Invalid private key at position {index}: expected 32-byte hex string")]
    InvalidKeyFormat { index: usize },

    #[error("Malformed key file '{path}': {reason}")]
    MalformedKeyFile { path: String, reason: String },
}

/// Network and RPC-related errors outside of transaction dispatch.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection refused to {endpoint}: {reason}")]
    ConnectionRefused { endpoint: String, reason: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Why a single transfer did not reach confirmation.
///
/// The `Display` text is the human-readable failure reason shown in the report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The node rejected the transaction (funds, nonce, payload).
    #[error("submission rejected: {reason}")]
    Submission { reason: String },

    /// The endpoint could not be reached at all.
    #[error("endpoint {endpoint} unreachable: {reason}")]
    Connectivity { endpoint: String, reason: String },

    #[error("confirmation failed for {tx_hash}: {reason}")]
    Confirmation { tx_hash: String, reason: String },

    #[error("transaction {tx_hash} was dropped before inclusion")]
    Dropped { tx_hash: String },

    #[error("transaction {tx_hash} reverted in block {block_number}")]
    Reverted { tx_hash: String, block_number: u64 },

    #[error("no confirmation for {tx_hash} within {timeout_secs}s")]
    Timeout { tx_hash: String, timeout_secs: u64 },
}

impl DispatchError {
    /// Failure happened before the network acknowledged the transaction.
    pub fn is_submission_stage(&self) -> bool {
        matches!(
            self,
            DispatchError::Submission { .. } | DispatchError::Connectivity { .. }
        )
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, DispatchError::Connectivity { .. })
    }
}
