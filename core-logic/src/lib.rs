//! # Core Logic - Native Transfer Dispatch
//!
//! Sends a batch of native-asset transfers from a set of funding keys to one
//! recipient on an EVM network and reports every transaction's outcome in order.
//!
//! ## Modules
//!
//! - [`config`] - Serde configuration types and recipient validation
//! - [`dispatcher`] - Sequential dispatch engine and transfer outcomes
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Per-batch pass/fail tally
//! - [`report`] - Status lines and explorer links
//! - [`templates`] - ethers-backed RPC client and batch builder
//! - [`traits`] - Client, report sink and symbol resolver seams
//! - `utils` - Endpoint pool, signer set, amounts, wallet loading, logging

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod report;
pub mod templates;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{
    parse_recipient, AmountPolicy, BatchConfig, ChainConfig, RotationPolicy, TransferConfig,
};
pub use dispatcher::{BatchReport, DispatchOptions, Dispatcher, TransferOutcome, TransferRequest};
pub use error::{ConfigError, CoreError, DispatchError, NetworkError, WalletError};
pub use metrics::{BatchMetrics, BatchSummary};
pub use report::{log_summary, Explorer, LogReportSink};
pub use templates::{BatchPlan, ChainBuilder, EvmTransferClient};
pub use traits::{ReportSink, SymbolResolver, TransferClient};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    format_amount, setup_logger, shutdown_token, AmountGenerator, CachedSymbolResolver,
    ChainRegistryResolver, EndpointPool, KeySource, RpcEndpoint, RpcHealthStatus, Signer,
    SignerSet, WalletManager, NATIVE_DECIMALS, RANDOM_PRECISION, UNKNOWN_SYMBOL,
};

// Export retry utilities for testing
pub use utils::retry::{is_connectivity_error, with_retry, RetryConfig};
