use crate::dispatcher::{TransferOutcome, TransferRequest};
use crate::error::{DispatchError, NetworkError};
use crate::utils::{RpcEndpoint, Signer};
use anyhow::Result;
use async_trait::async_trait;
use ethers::types::TxHash;

/// RPC operations the dispatcher needs. Implementations must not retry on their own.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Network identifier reported by the endpoint
    async fn chain_id(&self, endpoint: &RpcEndpoint) -> Result<u64, NetworkError>;

    /// Sign and broadcast a transfer; returns once the node has accepted it.
    async fn submit(
        &self,
        endpoint: &RpcEndpoint,
        signer: &Signer,
        request: &TransferRequest,
    ) -> Result<TxHash, DispatchError>;

    /// Wait for one block inclusion; returns the inclusion block number.
    async fn await_confirmation(
        &self,
        endpoint: &RpcEndpoint,
        tx_hash: TxHash,
    ) -> Result<u64, DispatchError>;
}

/// Receives outcomes in index order, one call per index.
pub trait ReportSink {
    fn record(&mut self, index: usize, total: usize, outcome: &TransferOutcome);
}

impl ReportSink for Vec<TransferOutcome> {
    fn record(&mut self, _index: usize, _total: usize, outcome: &TransferOutcome) {
        self.push(outcome.clone());
    }
}

/// Native currency symbol lookup by chain id.
#[async_trait]
pub trait SymbolResolver: Send + Sync {
    async fn resolve(&self, chain_id: u64) -> Result<String>;
}
