use crate::de;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

/// A Kalshi market as nested inside a `/events?with_nested_markets=true` response.
///
/// `event_title`, `series_ticker` and `series_title` are not part of the
/// nested market payload; the [`KalshiClient`](super::client::KalshiClient)
/// stamps them on from the parent event.
///
/// ### Raw Payload
/// ```json
/// {
///   "ticker": "KXFEDDECISION-25MAR-C25",
///   "event_ticker": "KXFEDDECISION-25MAR",
///   "title": "Will the Fed cut rates by 25bps in March 2025?",
///   "yes_bid_dollars": "0.5800",
///   "yes_ask_dollars": "0.6000",
///   "yes_bid": 58,
///   "yes_ask": 60,
///   "last_price": 59,
///   "volume": 182340,
///   "close_time": "2025-03-19T18:00:00Z"
/// }
/// ```
///
/// See docs: <https://trading-api.readme.io/reference/getmarket>
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct KalshiMarket {
    pub ticker: SmolStr,
    #[serde(default)]
    pub event_ticker: SmolStr,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub series_ticker: Option<SmolStr>,
    #[serde(default)]
    pub series_title: Option<String>,
    #[serde(default)]
    pub yes_bid_dollars: Option<Value>,
    #[serde(default)]
    pub yes_ask_dollars: Option<Value>,
    /// Best YES bid in cents
    #[serde(default)]
    pub yes_bid: Option<Value>,
    /// Best YES ask in cents
    #[serde(default)]
    pub yes_ask: Option<Value>,
    #[serde(default)]
    pub last_price_dollars: Option<Value>,
    /// Last traded YES price in cents
    #[serde(default)]
    pub last_price: Option<Value>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub close_time: Option<String>,
}

impl KalshiMarket {
    /// Minimal constructor, mostly useful for tests and fixtures.
    pub fn new(
        ticker: impl Into<SmolStr>,
        event_ticker: impl Into<SmolStr>,
        event_title: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            event_ticker: event_ticker.into(),
            event_title: Some(event_title.into()),
            title: None,
            series_ticker: None,
            series_title: None,
            yes_bid_dollars: None,
            yes_ask_dollars: None,
            yes_bid: None,
            yes_ask: None,
            last_price_dollars: None,
            last_price: None,
            volume: None,
            close_time: None,
        }
    }

    /// Set the YES bid/ask in dollars.
    pub fn with_quote(mut self, bid: Decimal, ask: Decimal) -> Self {
        self.yes_bid_dollars = Some(Value::String(bid.to_string()));
        self.yes_ask_dollars = Some(Value::String(ask.to_string()));
        self
    }

    /// The title used for matching: `title` when non-empty, else `event_title`.
    pub fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref()).or_else(|| self.event_title())
    }

    /// The parent event title, if non-empty.
    pub fn event_title(&self) -> Option<&str> {
        non_empty(self.event_title.as_deref())
    }

    /// Best estimate of the YES price in dollars.
    ///
    /// ```text
    /// mid(yes_bid_dollars, yes_ask_dollars) | either one
    ///   -> mid(yes_bid, yes_ask) / 100      | either one / 100
    ///   -> last_price_dollars
    ///   -> last_price / 100
    /// ```
    pub fn yes_price(&self) -> Option<Decimal> {
        let dollars = |v: &Option<Value>| v.as_ref().and_then(de::decimal);
        let cents = |v: &Option<Value>| dollars(v).map(|c| c / Decimal::ONE_HUNDRED);

        mid_or_either(dollars(&self.yes_bid_dollars), dollars(&self.yes_ask_dollars))
            .or_else(|| mid_or_either(cents(&self.yes_bid), cents(&self.yes_ask)))
            .or_else(|| dollars(&self.last_price_dollars))
            .or_else(|| cents(&self.last_price))
    }

    /// Traded volume, used as the liquidity figure for Kalshi.
    pub fn liquidity(&self) -> Option<Decimal> {
        self.volume.as_ref().and_then(de::decimal)
    }

    pub fn closes_at(&self) -> Option<DateTime<Utc>> {
        self.close_time.as_deref().and_then(de::datetime)
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// An overflowing bid/ask pair counts as absent.
fn mid_or_either(bid: Option<Decimal>, ask: Option<Decimal>) -> Option<Decimal> {
    match (bid, ask) {
        (Some(bid), Some(ask)) => bid.checked_add(ask).map(|sum| sum / Decimal::TWO),
        (bid, ask) => bid.or(ask),
    }
}
