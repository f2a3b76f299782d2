//! # EVM Transfer Client
//!
//! [`TransferClient`] implementation over ethers-rs. Nonce, gas limit and gas price
//! are filled in by `SignerMiddleware` from the node's defaults.

use crate::dispatcher::TransferRequest;
use crate::error::{DispatchError, NetworkError};
use crate::traits::TransferClient;
use crate::utils::retry::{is_connectivity_error, with_retry, RetryConfig};
use crate::utils::{EndpointPool, RpcEndpoint, Signer};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Middleware, MiddlewareError, PendingTransaction};
use ethers::signers::Signer as _;
use ethers::types::{TransactionReceipt, TransactionRequest, TxHash, U64};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmTransferClient {
    chain_id: u64,
}

impl EvmTransferClient {
    /// Client signing for `chain_id` (EIP-155).
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    /// Query the chain id from the pool's current endpoint. A configured id that
    /// disagrees with the node is reported, and the node's id wins.
    pub async fn connect(pool: &EndpointPool, expected: Option<u64>) -> anyhow::Result<Self> {
        let endpoint = pool.current();
        let probe = Self::new(expected.unwrap_or_default());

        let chain_id = with_retry(RetryConfig::new(3, 500), "chain id query", || async {
            probe.chain_id(endpoint).await.map_err(anyhow::Error::from)
        })
        .await?;

        match expected {
            Some(expected) if expected != chain_id => warn!(
                "Configured chain id {} does not match {} reported by {}",
                expected, chain_id, endpoint.url
            ),
            _ => info!("Connected to chain {} via {}", chain_id, endpoint.url),
        }

        Ok(Self::new(chain_id))
    }

    pub fn signing_chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// A JSON-RPC error response means the node was reached and refused the
/// transaction. Only errors without one are checked for transport failure.
fn submission_error(endpoint: &RpcEndpoint, node_response: bool, reason: String) -> DispatchError {
    if !node_response && is_connectivity_error(&reason) {
        DispatchError::Connectivity {
            endpoint: endpoint.url.clone(),
            reason,
        }
    } else {
        DispatchError::Submission { reason }
    }
}

#[async_trait]
impl TransferClient for EvmTransferClient {
    async fn chain_id(&self, endpoint: &RpcEndpoint) -> Result<u64, NetworkError> {
        match endpoint.provider().get_chainid().await {
            Ok(id) => Ok(id.as_u64()),
            Err(e) => {
                let reason = e.to_string();
                Err(if is_connectivity_error(&reason) {
                    NetworkError::ConnectionRefused {
                        endpoint: endpoint.url.clone(),
                        reason,
                    }
                } else {
                    NetworkError::InvalidResponse {
                        endpoint: endpoint.url.clone(),
                        reason,
                    }
                })
            }
        }
    }

    async fn submit(
        &self,
        endpoint: &RpcEndpoint,
        signer: &Signer,
        request: &TransferRequest,
    ) -> Result<TxHash, DispatchError> {
        let wallet = signer.wallet().clone().with_chain_id(self.chain_id);
        let client = SignerMiddleware::new(endpoint.provider().clone(), wallet);

        let tx = TransactionRequest::new()
            .from(signer.address())
            .to(request.recipient)
            .value(request.amount);

        let tx_hash = client
            .send_transaction(tx, None)
            .await
            .map(|pending| pending.tx_hash())
            .map_err(|e| {
                submission_error(endpoint, e.as_error_response().is_some(), e.to_string())
            })?;

        Ok(tx_hash)
    }

    async fn await_confirmation(
        &self,
        endpoint: &RpcEndpoint,
        tx_hash: TxHash,
    ) -> Result<u64, DispatchError> {
        let hash_text = format!("{:?}", tx_hash);

        let receipt = PendingTransaction::new(tx_hash, endpoint.provider())
            .confirmations(1)
            .await
            .map_err(|e| DispatchError::Confirmation {
                tx_hash: hash_text.clone(),
                reason: e.to_string(),
            })?;

        inclusion_block(hash_text, receipt)
    }
}

/// Block number of a successful inclusion. No receipt means the transaction
/// left the mempool without being mined; status 0 means it reverted.
fn inclusion_block(
    tx_hash: String,
    receipt: Option<TransactionReceipt>,
) -> Result<u64, DispatchError> {
    let receipt = receipt.ok_or_else(|| DispatchError::Dropped {
        tx_hash: tx_hash.clone(),
    })?;

    let block_number = receipt.block_number.map(|b| b.as_u64()).unwrap_or_default();
    if receipt.status == Some(U64::zero()) {
        return Err(DispatchError::Reverted {
            tx_hash,
            block_number,
        });
    }

    Ok(block_number)
}
