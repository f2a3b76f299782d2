//! # Transfer Dispatcher
//!
//! Sends a batch of native transfers one at a time. For every index the dispatcher
//! binds a signer and an amount, submits through the pool's current endpoint, waits
//! for one confirmation and hands exactly one [`TransferOutcome`] to the report sink
//! before moving on.
//!
//! Each index is attempted once. A failed transfer becomes a `Failed` outcome and the
//! batch continues; only configuration problems abort a batch, and those are caught
//! before the first submission. Waiting for confirmation before the next index keeps
//! nonces of a reused signer in order without any nonce bookkeeping.

use crate::config::RotationPolicy;
use crate::error::{ConfigError, DispatchError};
use crate::metrics::{BatchMetrics, BatchSummary};
use crate::traits::{ReportSink, TransferClient};
use crate::utils::{AmountGenerator, EndpointPool, RpcEndpoint, Signer, SignerSet};
use ethers::types::{Address, TxHash, U256};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Confirmed {
        tx_hash: TxHash,
        block_number: u64,
        signer: Address,
        amount: U256,
    },
    Failed {
        error: DispatchError,
        signer: Address,
        amount: U256,
    },
}

impl TransferOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransferOutcome::Confirmed { .. })
    }

    pub fn signer(&self) -> Address {
        match self {
            TransferOutcome::Confirmed { signer, .. } | TransferOutcome::Failed { signer, .. } => {
                *signer
            }
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            TransferOutcome::Confirmed { amount, .. } | TransferOutcome::Failed { amount, .. } => {
                *amount
            }
        }
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            TransferOutcome::Confirmed { tx_hash, .. } => Some(*tx_hash),
            TransferOutcome::Failed { .. } => None,
        }
    }

    /// Failure reason for display, `None` when confirmed.
    pub fn reason(&self) -> Option<String> {
        match self {
            TransferOutcome::Confirmed { .. } => None,
            TransferOutcome::Failed { error, .. } => Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// `None` waits for confirmation indefinitely.
    pub confirmation_timeout: Option<Duration>,
    pub rotation: RotationPolicy,
}

/// Outcomes in index order plus the tally for the run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<TransferOutcome>,
    pub summary: BatchSummary,
}

pub struct Dispatcher<C> {
    client: C,
    signers: SignerSet,
    amounts: AmountGenerator,
    recipient: Address,
    options: DispatchOptions,
}

impl<C: TransferClient> Dispatcher<C> {
    /// `recipient` must already be validated; it is not checked again per index.
    pub fn new(client: C, signers: SignerSet, amounts: AmountGenerator, recipient: Address) -> Self {
        Self {
            client,
            signers,
            amounts,
            recipient,
            options: DispatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn signers(&self) -> &SignerSet {
        &self.signers
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Run `count` transfers in order. Cancellation is checked between indices only,
    /// so an in-flight confirmation wait always finishes first.
    pub async fn run<S: ReportSink + ?Sized>(
        &self,
        pool: &mut EndpointPool,
        count: usize,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, ConfigError> {
        if count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "transactions".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }

        info!(
            "Dispatching {} transfers to {:?} with {} signer(s) over {} endpoint(s)",
            count,
            self.recipient,
            self.signers.len(),
            pool.len()
        );

        let mut metrics = BatchMetrics::start(count);
        let mut outcomes = Vec::with_capacity(count);

        for index in 0..count {
            if cancel.is_cancelled() {
                info!("Batch cancelled after {}/{} transfers", index, count);
                break;
            }

            let started = Instant::now();
            let outcome = self.dispatch_one(pool, index).await;
            metrics.record(&outcome, started.elapsed());
            sink.record(index, count, &outcome);
            outcomes.push(outcome);
        }

        Ok(BatchReport {
            outcomes,
            summary: metrics.finish(),
        })
    }

    /// Attempt the transfer for one index exactly once.
    pub async fn dispatch_one(&self, pool: &mut EndpointPool, index: usize) -> TransferOutcome {
        let signer = self.signers.signer_for(index);
        let request = TransferRequest {
            recipient: self.recipient,
            amount: self.amounts.amount_for(index),
        };

        let endpoint = pool.current();
        let result = self.send(endpoint, signer, &request).await;

        match result {
            Ok((tx_hash, block_number)) => {
                pool.record_success(&endpoint.url);
                TransferOutcome::Confirmed {
                    tx_hash,
                    block_number,
                    signer: signer.address(),
                    amount: request.amount,
                }
            }
            Err(error) => {
                debug!("Transfer #{} failed: {}", index, error);
                if error.is_connectivity() {
                    pool.record_failure(&endpoint.url);
                    if self.options.rotation == RotationPolicy::OnConnectivityFailure {
                        let next = pool.rotate();
                        warn!("Endpoint unreachable, next transfer uses {}", next.url);
                    }
                }
                TransferOutcome::Failed {
                    error,
                    signer: signer.address(),
                    amount: request.amount,
                }
            }
        }
    }

    async fn send(
        &self,
        endpoint: &RpcEndpoint,
        signer: &Signer,
        request: &TransferRequest,
    ) -> Result<(TxHash, u64), DispatchError> {
        let tx_hash = self.client.submit(endpoint, signer, request).await?;
        debug!(
            "Submitted {:?} from {:?} via {}",
            tx_hash,
            signer.address(),
            endpoint.url
        );

        let wait = self.client.await_confirmation(endpoint, tx_hash);
        let block_number = match self.options.confirmation_timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(DispatchError::Timeout {
                        tx_hash: format!("{:?}", tx_hash),
                        timeout_secs: limit.as_secs(),
                    })
                }
            },
            None => wait.await?,
        };

        Ok((tx_hash, block_number))
    }
}
