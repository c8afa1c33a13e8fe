//! Configuration types for market matching and arbitrage detection.
//!
//! Both configs carry working defaults and can be overridden field by field
//! from the environment with `from_env()`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};
use thiserror::Error;

/// Errors raised while reading configuration overrides.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// Configuration for the [`MarketMatcher`](crate::matcher::MarketMatcher).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchConfig {
    /// Minimum similarity for a pair to become a candidate at all
    pub candidate_floor: f64,
    /// Minimum similarity to accept a candidate when nothing was verified
    pub basic_threshold: f64,
    /// Maximum number of top-ranked candidates sent to the verifier
    pub verify_candidate_cap: usize,
    /// Number of concurrent verifier calls per batch
    pub verify_batch_size: usize,
    /// Pause between verifier batches, in milliseconds
    pub verify_batch_delay_ms: u64,
    /// Minimum verifier confidence to accept a match
    pub verify_min_confidence: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            candidate_floor: 0.25,
            basic_threshold: 0.4,
            verify_candidate_cap: 100,
            verify_batch_size: 10,
            verify_batch_delay_ms: 1000,
            verify_min_confidence: 0.7,
        }
    }
}

impl MatchConfig {
    /// Defaults overridden by any of `CANDIDATE_FLOOR`, `BASIC_MATCH_THRESHOLD`,
    /// `VERIFY_CANDIDATE_CAP`, `VERIFY_BATCH_SIZE`, `VERIFY_BATCH_DELAY_MS`
    /// and `VERIFY_MIN_CONFIDENCE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            candidate_floor: parse_or(&lookup, "CANDIDATE_FLOOR", default.candidate_floor)?,
            basic_threshold: parse_or(&lookup, "BASIC_MATCH_THRESHOLD", default.basic_threshold)?,
            verify_candidate_cap: parse_or(
                &lookup,
                "VERIFY_CANDIDATE_CAP",
                default.verify_candidate_cap,
            )?,
            verify_batch_size: parse_or(&lookup, "VERIFY_BATCH_SIZE", default.verify_batch_size)?,
            verify_batch_delay_ms: parse_or(
                &lookup,
                "VERIFY_BATCH_DELAY_MS",
                default.verify_batch_delay_ms,
            )?,
            verify_min_confidence: parse_or(
                &lookup,
                "VERIFY_MIN_CONFIDENCE",
                default.verify_min_confidence,
            )?,
        })
    }

    pub fn verify_batch_delay(&self) -> Duration {
        Duration::from_millis(self.verify_batch_delay_ms)
    }
}

/// Configuration for the [`ArbitrageCalculator`](crate::opportunity::ArbitrageCalculator).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArbitrageConfig {
    /// Minimum |spread| in percentage points to flag a spread arbitrage (e.g., 5.0 = 5%)
    pub min_profit_percent: Decimal,
    /// Minimum guaranteed profit per $1 payout to flag a true arbitrage (e.g., 0.01 = 1c)
    pub min_true_arbitrage_profit: Decimal,
    /// Fee applied multiplicatively to the combined cost (e.g., 0.01 = 1%)
    pub transaction_fee: Decimal,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            min_profit_percent: Decimal::new(5, 0),      // 5%
            min_true_arbitrage_profit: Decimal::new(1, 2), // 0.01
            transaction_fee: Decimal::new(1, 2),         // 1%
        }
    }
}

impl ArbitrageConfig {
    /// Defaults overridden by any of `MIN_PROFIT_PERCENT`,
    /// `MIN_TRUE_ARBITRAGE_PROFIT` and `TRANSACTION_FEE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            min_profit_percent: parse_or(&lookup, "MIN_PROFIT_PERCENT", default.min_profit_percent)?,
            min_true_arbitrage_profit: parse_or(
                &lookup,
                "MIN_TRUE_ARBITRAGE_PROFIT",
                default.min_true_arbitrage_profit,
            )?,
            transaction_fee: parse_or(&lookup, "TRANSACTION_FEE", default.transaction_fee)?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    field: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(field) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { field, value }),
    }
}
