use crate::platform::{Outcome, Platform};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Converts one raw platform record into its resolvable YES/NO sides.
///
/// Implementations follow a skip-don't-fail policy: a malformed record yields
/// an empty list and a malformed side is dropped without affecting the other.
pub trait Normalize {
    fn normalize(&self) -> Vec<NormalizedOutcome>;
}

/// Platform-specific fields needed to build a link back to the market.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MarketLinks {
    /// Polymarket event slug
    pub slug: Option<SmolStr>,
    /// Polymarket condition ID
    pub condition_id: Option<SmolStr>,
    /// Kalshi event ticker
    pub event_ticker: Option<SmolStr>,
    /// Kalshi series ticker
    pub series_ticker: Option<SmolStr>,
    /// Kalshi series title
    pub series_title: Option<String>,
}

/// One priced side (YES or NO) of a market on a single platform.
///
/// The price is guaranteed to lie in the closed interval `[0, 1]`; there is
/// no way to construct a [`NormalizedOutcome`] outside of it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedOutcome {
    platform: Platform,
    market_id: SmolStr,
    event_title: String,
    outcome: Outcome,
    price: Decimal,
    liquidity: Option<Decimal>,
    closes_at: Option<DateTime<Utc>>,
    links: MarketLinks,
}

impl NormalizedOutcome {
    /// Create a new outcome, returning `None` if `price` falls outside `[0, 1]`.
    pub fn new(
        platform: Platform,
        market_id: impl Into<SmolStr>,
        event_title: impl Into<String>,
        outcome: Outcome,
        price: Decimal,
    ) -> Option<Self> {
        if !is_valid_price(price) {
            return None;
        }

        Some(Self {
            platform,
            market_id: market_id.into(),
            event_title: event_title.into(),
            outcome,
            price,
            liquidity: None,
            closes_at: None,
            links: MarketLinks::default(),
        })
    }

    pub fn with_liquidity(mut self, liquidity: Option<Decimal>) -> Self {
        self.liquidity = liquidity;
        self
    }

    pub fn with_closes_at(mut self, closes_at: Option<DateTime<Utc>>) -> Self {
        self.closes_at = closes_at;
        self
    }

    pub fn with_links(mut self, links: MarketLinks) -> Self {
        self.links = links;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn market_id(&self) -> &SmolStr {
        &self.market_id
    }

    pub fn event_title(&self) -> &str {
        &self.event_title
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn liquidity(&self) -> Option<Decimal> {
        self.liquidity
    }

    pub fn closes_at(&self) -> Option<DateTime<Utc>> {
        self.closes_at
    }

    pub fn links(&self) -> &MarketLinks {
        &self.links
    }
}

/// Check a price lies in the closed interval `[0, 1]`.
pub fn is_valid_price(price: Decimal) -> bool {
    price >= Decimal::ZERO && price <= Decimal::ONE
}

/// Check a price lies strictly inside `(0, 1)`.
pub fn is_open_price(price: Decimal) -> bool {
    price > Decimal::ZERO && price < Decimal::ONE
}
