/// REST client for fetching open [`KalshiMarket`](market::KalshiMarket)s via the events endpoint.
pub mod client;

/// Raw Kalshi market record.
pub mod market;

/// [`Normalize`](crate::normalize::Normalize) implementation for Kalshi markets.
pub mod normalize;

/// Kalshi public REST base URL.
///
/// See docs: <https://trading-api.readme.io/reference/getting-started-with-your-api>
pub const BASE_URL_KALSHI_REST: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Base URL for linking to a Kalshi market page.
pub const KALSHI_MARKETS_URL: &str = "https://kalshi.com/markets/";
