//! # Report Rendering
//!
//! Turns outcomes into the per-transfer status lines shown to the operator.
//! Lines go to the `task_result` target, which the logger routes to both
//! console and file.

use crate::config::ChainConfig;
use crate::dispatcher::TransferOutcome;
use crate::metrics::BatchSummary;
use crate::traits::ReportSink;
use crate::utils::format_amount;
use ethers::types::{Address, TxHash};
use ethers::utils::to_checksum;
use tracing::info;

/// Block explorer URL builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    base_url: String,
    tx_path: String,
    address_path: String,
}

impl Explorer {
    pub fn new(base_url: &str, tx_path: &str, address_path: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tx_path: tx_path.trim_matches('/').to_string(),
            address_path: address_path.trim_matches('/').to_string(),
        }
    }

    pub fn from_chain(chain: &ChainConfig) -> Self {
        Self::new(&chain.explorer_url, &chain.tx_path, &chain.address_path)
    }

    pub fn tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/{}/{:?}", self.base_url, self.tx_path, tx_hash)
    }

    pub fn address_url(&self, address: &Address) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.address_path,
            to_checksum(address, None)
        )
    }
}

/// Writes one or two status lines per outcome.
#[derive(Debug, Clone)]
pub struct LogReportSink {
    explorer: Explorer,
    symbol: String,
}

impl LogReportSink {
    pub fn new(explorer: Explorer, symbol: impl Into<String>) -> Self {
        Self {
            explorer,
            symbol: symbol.into(),
        }
    }

    pub fn render(&self, index: usize, total: usize, outcome: &TransferOutcome) -> Vec<String> {
        let signer = to_checksum(&outcome.signer(), None);
        let amount = format_amount(outcome.amount());

        match outcome {
            TransferOutcome::Confirmed {
                tx_hash,
                block_number,
                ..
            } => vec![
                format!(
                    "Transaction Confirmed for {} in block {} with Amount: {} {}",
                    signer, block_number, amount, self.symbol
                ),
                format!(
                    "Transaction Hash: {} ({}/{})",
                    self.explorer.tx_url(tx_hash),
                    index + 1,
                    total
                ),
            ],
            TransferOutcome::Failed { error, .. } => vec![format!(
                "Transaction Failed for {} with Amount: {} {} ({}/{}): {}",
                signer,
                amount,
                self.symbol,
                index + 1,
                total,
                error
            )],
        }
    }
}

impl ReportSink for LogReportSink {
    fn record(&mut self, index: usize, total: usize, outcome: &TransferOutcome) {
        for line in self.render(index, total, outcome) {
            info!(target: "task_result", "{}", line);
        }
    }
}

/// Final tally line.
pub fn log_summary(summary: &BatchSummary, symbol: &str) {
    info!(
        target: "task_result",
        "Batch finished in {:.1}s | Confirmed: {} | Failed: {} | Skipped: {} | Success Rate: {:.2}% | Sent: {} {}",
        summary.elapsed_ms as f64 / 1000.0,
        summary.confirmed,
        summary.failed,
        summary.skipped,
        summary.success_rate,
        summary.confirmed_amount,
        symbol
    );
}
