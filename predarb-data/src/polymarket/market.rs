use crate::de::{self, de_str_or_number};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

/// Integer timestamps below this are read as seconds, above as milliseconds
/// (2000-01-01T00:00:00Z in seconds).
const SECONDS_EPOCH_THRESHOLD: i64 = 946_684_800;

/// A Polymarket market as returned by the Gamma `/markets` endpoint.
///
/// Several fields are loosely typed upstream, so they are held as raw
/// [`Value`]s and parsed on demand by the accessor methods.
///
/// ### Raw Payload
/// ```json
/// {
///   "id": "512345",
///   "question": "Will the Fed cut rates in March 2025?",
///   "conditionId": "0xabc...",
///   "slug": "fed-cut-march-2025",
///   "outcomes": "[\"Yes\", \"No\"]",
///   "outcomePrices": "[\"0.62\", \"0.38\"]",
///   "lastTradePrice": 0.61,
///   "liquidityNum": 125000.5,
///   "endDate": "2025-03-19T18:00:00Z"
/// }
/// ```
///
/// See docs: <https://docs.polymarket.com/developers/gamma-markets-api/get-markets>
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolymarketMarket {
    #[serde(deserialize_with = "de_str_or_number")]
    pub id: SmolStr,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub condition_id: Option<SmolStr>,
    #[serde(default)]
    pub slug: Option<SmolStr>,
    /// Outcome labels: JSON array or JSON-encoded array string
    #[serde(default)]
    pub outcomes: Option<Value>,
    /// Outcome prices parallel to `outcomes`: JSON array or JSON-encoded array string
    #[serde(default)]
    pub outcome_prices: Option<Value>,
    #[serde(default)]
    pub last_trade_price: Option<Value>,
    #[serde(default)]
    pub liquidity_num: Option<Value>,
    /// String-typed liquidity, used when `liquidityNum` is absent
    #[serde(default)]
    pub liquidity: Option<Value>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_date_iso: Option<String>,
    #[serde(default)]
    pub closed_time: Option<String>,
    /// Integer close timestamp, seconds or milliseconds
    #[serde(default)]
    pub end_date_ts: Option<Value>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
}

impl PolymarketMarket {
    /// Minimal constructor, mostly useful for tests and fixtures.
    pub fn new(id: impl Into<SmolStr>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: Some(question.into()),
            condition_id: None,
            slug: None,
            outcomes: None,
            outcome_prices: None,
            last_trade_price: None,
            liquidity_num: None,
            liquidity: None,
            end_date: None,
            end_date_iso: None,
            closed_time: None,
            end_date_ts: None,
            active: None,
            closed: None,
        }
    }

    /// Set parallel outcome labels and prices.
    pub fn with_outcomes<L, P>(mut self, labels: L, prices: P) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        P: IntoIterator<Item = Decimal>,
    {
        let labels: Vec<Value> = labels.into_iter().map(|l| Value::String(l.into())).collect();
        let prices: Vec<Value> = prices
            .into_iter()
            .map(|p| Value::String(p.to_string()))
            .collect();
        self.outcomes = Some(Value::Array(labels));
        self.outcome_prices = Some(Value::Array(prices));
        self
    }

    /// The market question used for matching, if non-empty.
    pub fn title(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Parsed outcome labels, `None` if missing or unparseable.
    pub fn outcome_labels(&self) -> Option<Vec<String>> {
        self.outcomes.as_ref().and_then(de::string_list)
    }

    /// Price for the outcome at `index`.
    ///
    /// Falls back to `lastTradePrice` when the price array has no usable
    /// entry at that index.
    pub fn outcome_price(&self, index: usize) -> Option<Decimal> {
        let from_array = self
            .outcome_prices
            .as_ref()
            .and_then(de::list)
            .and_then(|prices| prices.get(index).and_then(de::decimal));

        from_array.or_else(|| self.last_trade_price.as_ref().and_then(de::decimal))
    }

    /// Liquidity, preferring the numeric field over the string fallback.
    pub fn liquidity(&self) -> Option<Decimal> {
        self.liquidity_num
            .as_ref()
            .and_then(de::decimal)
            .or_else(|| self.liquidity.as_ref().and_then(de::decimal))
    }

    /// Market close time.
    ///
    /// Prefers `endDate`, then `endDateIso` and `closedTime`, then the integer
    /// `endDateTs` (seconds below year 2000 in seconds, else milliseconds).
    pub fn closes_at(&self) -> Option<DateTime<Utc>> {
        [&self.end_date, &self.end_date_iso, &self.closed_time]
            .into_iter()
            .flatten()
            .find_map(|raw| de::datetime(raw))
            .or_else(|| {
                self.end_date_ts
                    .as_ref()
                    .and_then(de::integer)
                    .and_then(timestamp_to_datetime)
            })
    }
}

fn timestamp_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    if ts < SECONDS_EPOCH_THRESHOLD {
        Utc.timestamp_opt(ts, 0).single()
    } else {
        Utc.timestamp_millis_opt(ts).single()
    }
}
