/// Gamma REST client for fetching [`PolymarketMarket`](market::PolymarketMarket)s.
pub mod client;

/// Raw Polymarket market record.
pub mod market;

/// [`Normalize`](crate::normalize::Normalize) implementation for Polymarket markets.
pub mod normalize;

/// Base URL for linking to a Polymarket event page.
pub const POLYMARKET_EVENT_URL: &str = "https://polymarket.com/event/";
