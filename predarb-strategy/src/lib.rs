//! Cross-platform market matching and arbitrage detection for Polymarket and Kalshi.
//!
//! Given a snapshot of raw markets from both platforms, this crate decides
//! which listings describe the same event and outcome, prices every match,
//! and reports spread and true arbitrage opportunities.
//!
//! # Pipeline
//!
//! ```text
//! PolymarketMarket[] ─┐
//!                     ├─ MarketMatcher ─> MatchedOutcomePair[] ─> ArbitrageCalculator ─> postprocess ─> Opportunity[]
//! KalshiMarket[]     ─┘        │
//!                              └─ MatchVerifier (optional)
//! ```
//!
//! # Key Components
//!
//! - [`canonicalize`] / [`score`]: title canonicalisation and similarity
//! - [`MarketMatcher`]: candidate generation, optional verification, greedy pairing
//! - [`ArbitrageCalculator`]: resolved-band check, spread and true arbitrage classification
//! - [`postprocess`]: resolved-market exclusion and per-market deduplication
//! - [`ArbitrageScanner`]: the whole pipeline, optionally behind a [`TtlCache`]
//!
//! # Example
//!
//! ```rust,ignore
//! use predarb_strategy::{ArbitrageConfig, ArbitrageScanner, MatchConfig};
//!
//! let scanner = ArbitrageScanner::new(MatchConfig::default(), ArbitrageConfig::default());
//! let opportunities = scanner.scan(&polymarket_markets, &kalshi_markets, None).await;
//!
//! for opp in opportunities.iter().filter(|o| o.arbitrage) {
//!     println!("{} {} {}%", opp.event, opp.arbitrage_type, opp.profit_percent);
//! }
//! ```
//!
//! # Fee Model
//!
//! A single proportional fee is applied to the combined cost of a true
//! arbitrage: `total_cost * (1 + transaction_fee)`.

/// Fixed-TTL snapshot cache.
pub mod cache;

/// Title canonicalisation.
pub mod canonical;

/// Matching and arbitrage configuration.
pub mod config;

/// Fee application and true-arbitrage maths.
pub mod fees;

/// Cross-platform market matching.
pub mod matcher;

/// Opportunity records and the arbitrage calculator.
pub mod opportunity;

/// Resolved-market exclusion and deduplication.
pub mod postprocess;

/// Title similarity scoring.
pub mod similarity;

/// Scan pipeline.
pub mod strategy;

/// External match verification.
pub mod verify;

pub use cache::TtlCache;
pub use canonical::canonicalize;
pub use config::{ArbitrageConfig, ConfigError, MatchConfig};
pub use fees::{FeeCalculator, SidePrices, TrueArbitrage};
pub use matcher::{CandidatePair, MarketMatcher, MatchedOutcomePair};
pub use opportunity::{ArbitrageCalculator, ArbitrageType, Opportunity, is_resolved_price};
pub use postprocess::postprocess;
pub use similarity::{TitleFeatures, score};
pub use strategy::{ArbitrageScanner, ScanSummary};
pub use verify::{LlmVerifier, MatchVerifier, Verification, VerifyError};
