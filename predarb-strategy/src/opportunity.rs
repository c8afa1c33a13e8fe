//! Arbitrage opportunity detection and representation.

use crate::{
    config::ArbitrageConfig,
    fees::{FeeCalculator, SidePrices},
    matcher::MatchedOutcomePair,
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use itertools::Itertools;
use predarb_data::{
    MarketLinks, Outcome,
    kalshi::KALSHI_MARKETS_URL,
    polymarket::POLYMARKET_EVENT_URL,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;
use url::Url;

/// Prices at or below this are treated as settled at 0.
const RESOLVED_LOW: Decimal = Decimal::from_parts(5, 0, 0, false, 3); // 0.005
/// Prices at or above this are treated as settled at 1.
const RESOLVED_HIGH: Decimal = Decimal::from_parts(995, 0, 0, false, 3); // 0.995

/// Kind of arbitrage an [`Opportunity`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArbitrageType {
    /// Cheapest YES + cheapest NO across platforms costs less than the payout
    #[display("true")]
    True,
    /// Same outcome priced apart by at least the minimum spread
    #[display("spread")]
    Spread,
    #[display("none")]
    None,
}

/// One matched outcome with its cross-platform price comparison.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Opportunity {
    pub event: String,
    pub outcome: Outcome,
    pub polymarket_price: Decimal,
    pub kalshi_price: Decimal,
    /// `kalshi_price - polymarket_price`
    pub spread: Decimal,
    /// Spread in percentage points
    pub profit_percent: Decimal,
    pub arbitrage: bool,
    pub arbitrage_type: ArbitrageType,
    pub total_cost: Option<Decimal>,
    pub guaranteed_profit: Option<Decimal>,
    /// `None` only for records deserialised without the flag
    #[serde(default)]
    pub is_resolved: Option<bool>,
    pub polymarket_id: SmolStr,
    pub kalshi_ticker: SmolStr,
    #[serde(default)]
    pub polymarket_links: MarketLinks,
    #[serde(default)]
    pub kalshi_links: MarketLinks,
    pub liquidity: Option<Decimal>,
    pub closes_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub similarity: f64,
}

impl Opportunity {
    /// Whether this opportunity is on a settled market, recomputing from
    /// prices if the flag is absent.
    pub fn resolved(&self) -> bool {
        self.is_resolved.unwrap_or_else(|| {
            is_resolved_price(self.polymarket_price) || is_resolved_price(self.kalshi_price)
        })
    }

    /// `https://polymarket.com/event/{slug}`
    pub fn polymarket_url(&self) -> Option<Url> {
        let slug = self.polymarket_links.slug.as_deref().filter(|s| !s.is_empty())?;
        Url::parse(POLYMARKET_EVENT_URL).ok()?.join(slug).ok()
    }

    /// `https://kalshi.com/markets/{series_ticker}/{series_title_slug}/{event_ticker}`,
    /// or `https://kalshi.com/markets/{event_ticker}` without series fields.
    pub fn kalshi_url(&self) -> Option<Url> {
        let links = &self.kalshi_links;
        let event_ticker = links
            .event_ticker
            .as_deref()
            .filter(|t| !t.is_empty())?
            .to_lowercase();

        let series = links
            .series_ticker
            .as_deref()
            .zip(links.series_title.as_deref())
            .map(|(ticker, title)| (ticker.to_lowercase(), slugify(title)))
            .filter(|(ticker, title)| !ticker.is_empty() && !title.is_empty());

        let mut url = Url::parse(KALSHI_MARKETS_URL).ok()?;
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty();
            if let Some((ticker, title)) = &series {
                segments.push(ticker).push(title);
            }
            segments.push(&event_ticker);
        }
        Some(url)
    }
}

fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .join("-")
}

/// Check a price sits in the settled band `<= 0.005` or `>= 0.995`.
pub fn is_resolved_price(price: Decimal) -> bool {
    price <= RESOLVED_LOW || price >= RESOLVED_HIGH
}

/// Turns matched outcome pairs into [`Opportunity`]s.
#[derive(Debug, Clone, Default)]
pub struct ArbitrageCalculator {
    config: ArbitrageConfig,
}

impl ArbitrageCalculator {
    pub fn new(config: ArbitrageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArbitrageConfig {
        &self.config
    }

    /// Classify one matched pair.
    ///
    /// Settled pairs (either price in the resolved band) keep their spread
    /// for auditing but are never flagged as arbitrage.
    pub fn calculate(&self, pair: &MatchedOutcomePair) -> Opportunity {
        let outcome = pair.polymarket.outcome();
        let polymarket_price = pair.polymarket.price();
        let kalshi_price = pair.kalshi.price();

        self.calculate_with_sides(
            pair,
            SidePrices::from_known(outcome, polymarket_price),
            SidePrices::from_known(outcome, kalshi_price),
        )
    }

    /// Classify one matched pair against explicit YES/NO quotes on each platform.
    pub fn calculate_with_sides(
        &self,
        pair: &MatchedOutcomePair,
        polymarket_sides: SidePrices,
        kalshi_sides: SidePrices,
    ) -> Opportunity {
        let polymarket_price = pair.polymarket.price();
        let kalshi_price = pair.kalshi.price();
        let spread = kalshi_price - polymarket_price;
        let profit_percent = spread * Decimal::ONE_HUNDRED;

        let mut opportunity = Opportunity {
            event: pair.event_title.clone(),
            outcome: pair.polymarket.outcome(),
            polymarket_price,
            kalshi_price,
            spread,
            profit_percent,
            arbitrage: false,
            arbitrage_type: ArbitrageType::None,
            total_cost: None,
            guaranteed_profit: None,
            is_resolved: Some(false),
            polymarket_id: pair.polymarket.market_id().clone(),
            kalshi_ticker: pair.kalshi.market_id().clone(),
            polymarket_links: pair.polymarket.links().clone(),
            kalshi_links: pair.kalshi.links().clone(),
            liquidity: combined_liquidity(pair.polymarket.liquidity(), pair.kalshi.liquidity()),
            closes_at: earliest(pair.polymarket.closes_at(), pair.kalshi.closes_at()),
            similarity: pair.similarity,
        };

        if is_resolved_price(polymarket_price) || is_resolved_price(kalshi_price) {
            debug!(
                polymarket = %opportunity.polymarket_id,
                kalshi = %opportunity.kalshi_ticker,
                %polymarket_price,
                %kalshi_price,
                "Skipping resolved market pair"
            );
            opportunity.is_resolved = Some(true);
            return opportunity;
        }

        let true_arb = FeeCalculator::true_arbitrage(
            polymarket_sides,
            kalshi_sides,
            self.config.transaction_fee,
        );

        let is_true_arbitrage = true_arb.total_cost_with_fees < Decimal::ONE
            && true_arb.guaranteed_profit >= self.config.min_true_arbitrage_profit;
        let is_spread_arbitrage = profit_percent.abs() >= self.config.min_profit_percent;

        opportunity.total_cost = Some(true_arb.total_cost);
        opportunity.guaranteed_profit = Some(true_arb.guaranteed_profit);
        opportunity.arbitrage = is_true_arbitrage || is_spread_arbitrage;
        opportunity.arbitrage_type = if is_true_arbitrage {
            ArbitrageType::True
        } else if is_spread_arbitrage {
            ArbitrageType::Spread
        } else {
            ArbitrageType::None
        };

        opportunity
    }
}

fn combined_liquidity(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (a, b) => a.or(b),
    }
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
