use crate::dispatcher::TransferOutcome;
use crate::utils::format_amount;
use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Pass/fail tally for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: String,
    pub finished_at: String,
    pub requested: usize,
    pub attempted: usize,
    pub confirmed: usize,
    pub failed: usize,
    /// Indices never attempted because the batch was cancelled.
    pub skipped: usize,
    pub success_rate: f64,
    pub elapsed_ms: u64,
    pub avg_transfer_ms: f64,
    pub min_transfer_ms: u64,
    pub max_transfer_ms: u64,
    /// Total confirmed value in human units.
    pub confirmed_amount: String,
}

impl BatchSummary {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        tokio::fs::write(path, self.to_json()).await
    }
}

/// Per-run collector. Owned by a single batch, so plain counters suffice.
#[derive(Debug)]
pub struct BatchMetrics {
    requested: usize,
    started: Instant,
    started_at: DateTime<Utc>,
    confirmed: usize,
    failed: usize,
    duration_sum_ms: u64,
    min_duration_ms: u64,
    max_duration_ms: u64,
    confirmed_amount: U256,
}

impl BatchMetrics {
    pub fn start(requested: usize) -> Self {
        Self {
            requested,
            started: Instant::now(),
            started_at: Utc::now(),
            confirmed: 0,
            failed: 0,
            duration_sum_ms: 0,
            min_duration_ms: u64::MAX,
            max_duration_ms: 0,
            confirmed_amount: U256::zero(),
        }
    }

    pub fn record(&mut self, outcome: &TransferOutcome, duration: Duration) {
        let duration_ms = duration.as_millis() as u64;
        self.duration_sum_ms += duration_ms;
        self.min_duration_ms = self.min_duration_ms.min(duration_ms);
        self.max_duration_ms = self.max_duration_ms.max(duration_ms);

        if outcome.is_confirmed() {
            self.confirmed += 1;
            self.confirmed_amount = self.confirmed_amount.saturating_add(outcome.amount());
        } else {
            self.failed += 1;
        }
    }

    pub fn attempted(&self) -> usize {
        self.confirmed + self.failed
    }

    pub fn finish(self) -> BatchSummary {
        let attempted = self.attempted();

        BatchSummary {
            started_at: self.started_at.to_rfc3339(),
            finished_at: Utc::now().to_rfc3339(),
            requested: self.requested,
            attempted,
            confirmed: self.confirmed,
            failed: self.failed,
            skipped: self.requested.saturating_sub(attempted),
            success_rate: if attempted > 0 {
                self.confirmed as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            avg_transfer_ms: if attempted > 0 {
                self.duration_sum_ms as f64 / attempted as f64
            } else {
                0.0
            },
            min_transfer_ms: if self.min_duration_ms == u64::MAX {
                0
            } else {
                self.min_duration_ms
            },
            max_transfer_ms: self.max_duration_ms,
            confirmed_amount: format_amount(self.confirmed_amount),
        }
    }
}
