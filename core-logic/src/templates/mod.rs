//! # Core Logic - Chain Templates
//!
//! Chain-specific implementations of the dispatcher's RPC seam, plus a builder
//! that turns a validated chain/batch configuration into the run's components.

use crate::config::{BatchConfig, ChainConfig};
use crate::dispatcher::{DispatchOptions, Dispatcher};
use crate::error::{ConfigError, CoreError};
use crate::traits::TransferClient;
use crate::utils::{AmountGenerator, EndpointPool, SignerSet};
use std::time::Duration;
use zeroize::Zeroizing;

pub mod evm_adapter;
pub use evm_adapter::*;

/// Everything a run needs, built before the first transfer.
#[derive(Debug)]
pub struct BatchPlan {
    pub pool: EndpointPool,
    pub signers: SignerSet,
    pub amounts: AmountGenerator,
    pub recipient: ethers::types::Address,
    pub count: usize,
    pub options: DispatchOptions,
}

impl BatchPlan {
    pub fn into_dispatcher<C: TransferClient>(self, client: C) -> (Dispatcher<C>, EndpointPool, usize) {
        let dispatcher = Dispatcher::new(client, self.signers, self.amounts, self.recipient)
            .with_options(self.options);
        (dispatcher, self.pool, self.count)
    }
}

/// Validates configuration in one place so no transaction is sent when any
/// part of it is wrong.
#[derive(Default)]
pub struct ChainBuilder {
    chain: Option<ChainConfig>,
    batch: Option<BatchConfig>,
    private_keys: Vec<Zeroizing<String>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn with_private_keys<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.private_keys = keys
            .iter()
            .map(|k| Zeroizing::new(k.as_ref().to_string()))
            .collect();
        self
    }

    pub fn build(self) -> Result<BatchPlan, CoreError> {
        let chain = self.chain.ok_or_else(|| ConfigError::MissingField {
            field: "chain".to_string(),
        })?;
        let batch = self.batch.ok_or_else(|| ConfigError::MissingField {
            field: "batch".to_string(),
        })?;

        let recipient = batch.validate()?;
        let amounts = AmountGenerator::from_policy(&batch.amount)?;
        let keys: Vec<&str> = self.private_keys.iter().map(|k| k.as_str()).collect();
        let signers = SignerSet::from_private_keys(&keys)?;
        let pool = EndpointPool::new(
            &chain.rpc_urls,
            Duration::from_millis(chain.poll_interval_ms),
        )?;

        Ok(BatchPlan {
            pool,
            signers,
            amounts,
            recipient,
            count: batch.transactions,
            options: DispatchOptions {
                confirmation_timeout: batch.confirmation_timeout(),
                rotation: batch.rotation,
            },
        })
    }
}
