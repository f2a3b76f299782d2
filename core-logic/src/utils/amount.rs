//! # Core Logic - Transfer Amounts
//!
//! Produces the value of each transfer in base units (18-decimal fixed point).
//! Random amounts are drawn on a 6-decimal grid so every value is exactly
//! representable and stays strictly below the configured maximum.

use crate::config::AmountPolicy;
use crate::error::ConfigError;
use ethers::types::U256;
use ethers::utils::{format_units, parse_units};
use rand::Rng;

/// Decimals of the native asset on EVM chains.
pub const NATIVE_DECIMALS: u32 = 18;

/// Fractional digits kept for randomly drawn amounts.
pub const RANDOM_PRECISION: u32 = 6;

const MICROS_PER_UNIT: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountGenerator {
    Fixed {
        value: U256,
    },
    /// Bounds in millionths of a unit, `max_micros` exclusive.
    Random {
        min_micros: u64,
        max_micros: u64,
    },
}

impl AmountGenerator {
    pub fn fixed(value: f64) -> Result<Self, ConfigError> {
        check_positive("amount.value", value)?;

        let parsed = parse_units(value.to_string(), NATIVE_DECIMALS).map_err(|e| {
            ConfigError::InvalidAmount {
                field: "amount.value".to_string(),
                reason: e.to_string(),
            }
        })?;
        let value: U256 = parsed.into();
        if value.is_zero() {
            return Err(ConfigError::InvalidAmount {
                field: "amount.value".to_string(),
                reason: "rounds to zero base units".to_string(),
            });
        }

        Ok(Self::Fixed { value })
    }

    pub fn random(min: f64, max: f64) -> Result<Self, ConfigError> {
        check_positive("amount.min", min)?;
        check_positive("amount.max", max)?;
        if max <= min {
            return Err(ConfigError::InvertedRange { min, max });
        }

        let min_micros = ceil_micros("amount.min", min)?;
        let max_micros = ceil_micros("amount.max", max)?;
        if min_micros >= max_micros {
            return Err(ConfigError::InvalidAmount {
                field: "amount".to_string(),
                reason: format!(
                    "range [{}, {}) holds no value with {} decimals",
                    min, max, RANDOM_PRECISION
                ),
            });
        }

        Ok(Self::Random {
            min_micros,
            max_micros,
        })
    }

    pub fn from_policy(policy: &AmountPolicy) -> Result<Self, ConfigError> {
        match *policy {
            AmountPolicy::Fixed { value } => Self::fixed(value),
            AmountPolicy::Random { min, max } => Self::random(min, max),
        }
    }

    /// Amount for transaction `index`. Random draws are independent per call.
    pub fn amount_for(&self, _index: usize) -> U256 {
        self.amount_with(&mut rand::thread_rng())
    }

    pub fn amount_with<R: Rng + ?Sized>(&self, rng: &mut R) -> U256 {
        match self {
            Self::Fixed { value } => *value,
            Self::Random {
                min_micros,
                max_micros,
            } => {
                let micros = rng.gen_range(*min_micros..*max_micros);
                U256::from(micros) * U256::exp10((NATIVE_DECIMALS - RANDOM_PRECISION) as usize)
            }
        }
    }
}

/// Human-readable amount without trailing zeros, e.g. `0.0015`.
pub fn format_amount(amount: U256) -> String {
    match format_units(amount, NATIVE_DECIMALS) {
        Ok(text) => {
            let trimmed = text.trim_end_matches('0').trim_end_matches('.');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => format!("{} wei", amount),
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidAmount {
            field: field.to_string(),
            reason: format!("{} is not a positive number", value),
        });
    }
    Ok(())
}

/// Smallest 6-decimal grid point >= `value`, in millionths. Values already on the
/// grid (up to float noise) map to themselves.
fn ceil_micros(field: &str, value: f64) -> Result<u64, ConfigError> {
    let scaled = value * MICROS_PER_UNIT;
    if scaled >= u64::MAX as f64 {
        return Err(ConfigError::InvalidAmount {
            field: field.to_string(),
            reason: "value too large".to_string(),
        });
    }

    let nearest = scaled.round();
    let micros = if (scaled - nearest).abs() < 1e-6 {
        nearest
    } else {
        scaled.ceil()
    };
    Ok(micros as u64)
}
