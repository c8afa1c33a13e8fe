//! Raw market records for the Polymarket and Kalshi prediction market platforms.
//!
//! This crate owns everything platform-shaped: the records each platform's
//! REST API returns, the serde leniency those payloads need, thin fetchers
//! for the public endpoints, and the [`Normalize`] transform that turns one
//! raw record into per-outcome [`NormalizedOutcome`] prices.
//!
//! # Normalisation Rules
//!
//! ```text
//! Polymarket: outcomes[i] + outcomePrices[i]   -> YES/NO, price in [0, 1] (boundaries kept)
//! Kalshi:     mid(yes_bid, yes_ask) -> YES     -> NO = 1 - YES, price in (0, 1) (boundaries dropped)
//! ```
//!
//! The asymmetry is intentional: resolved Polymarket records still surface
//! here and are filtered later by the arbitrage calculator.

/// Lenient serde helpers for loosely typed REST payloads.
pub mod de;

/// Error types returned by the REST fetchers.
pub mod error;

/// Kalshi raw market records, normaliser and REST fetcher.
pub mod kalshi;

/// Normalised per-outcome prices and the [`Normalize`] trait.
pub mod normalize;

/// [`Platform`] and [`Outcome`] vocabulary shared by every crate.
pub mod platform;

/// Polymarket raw market records, normaliser and REST fetcher.
pub mod polymarket;

pub use error::FetchError;
pub use kalshi::{client::KalshiClient, market::KalshiMarket};
pub use normalize::{MarketLinks, Normalize, NormalizedOutcome};
pub use platform::{Outcome, Platform};
pub use polymarket::{client::GammaClient, market::PolymarketMarket};
