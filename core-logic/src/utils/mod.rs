//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod amount;
pub(crate) mod logger;
pub(crate) mod retry;
pub(crate) mod rpc_manager;
pub(crate) mod runner;
pub(crate) mod signer_set;
pub(crate) mod symbol;
pub(crate) mod wallet_manager;

// Selective exports - only public utilities
pub use amount::{format_amount, AmountGenerator, NATIVE_DECIMALS, RANDOM_PRECISION};
pub use logger::setup_logger;
pub use rpc_manager::{EndpointPool, RpcEndpoint, RpcHealthStatus};
pub use runner::shutdown_token;
pub use signer_set::{Signer, SignerSet};
pub use symbol::{CachedSymbolResolver, ChainRegistryResolver, UNKNOWN_SYMBOL};
pub use wallet_manager::{KeySource, WalletManager};
