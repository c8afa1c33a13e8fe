//! Kalshi public REST client for open events and their nested markets.

use super::{BASE_URL_KALSHI_REST, market::KalshiMarket};
use crate::error::FetchError;
use reqwest::Client;
use serde::Deserialize;
use smol_str::SmolStr;
use tracing::{debug, error, info};
use url::Url;

/// Maximum page size accepted by the `/events` endpoint.
const PAGE_SIZE: usize = 200;

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    events: Vec<KalshiEvent>,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KalshiEvent {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    series_ticker: Option<SmolStr>,
    #[serde(default)]
    series_title: Option<String>,
    #[serde(default)]
    markets: Vec<KalshiMarket>,
}

impl KalshiEvent {
    /// Flatten into markets carrying the parent event's title and series.
    fn into_markets(self) -> impl Iterator<Item = KalshiMarket> {
        let Self {
            title,
            series_ticker,
            series_title,
            markets,
        } = self;

        markets.into_iter().map(move |mut market| {
            market.event_title = market.event_title.or_else(|| title.clone());
            market.series_ticker = market.series_ticker.or_else(|| series_ticker.clone());
            market.series_title = market.series_title.or_else(|| series_title.clone());
            market
        })
    }
}

/// Unauthenticated client for Kalshi's public market data.
#[derive(Debug, Clone)]
pub struct KalshiClient {
    client: Client,
    base_url: Url,
}

impl KalshiClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(BASE_URL_KALSHI_REST)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        // Trailing slash so `join` appends rather than replaces the last segment
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Fetch up to `limit` markets from open events, following the cursor.
    pub async fn fetch_markets(&self, limit: usize) -> Result<Vec<KalshiMarket>, FetchError> {
        let mut markets = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(cursor.as_deref()).await?;
            let events = page.events.len();
            markets.extend(page.events.into_iter().flat_map(KalshiEvent::into_markets));

            debug!(events, total = markets.len(), "Fetched Kalshi events page");

            cursor = page.cursor.filter(|c| !c.is_empty());
            if markets.len() >= limit || cursor.is_none() || events == 0 {
                break;
            }
        }

        markets.truncate(limit);
        info!(count = markets.len(), "Fetched Kalshi markets");
        Ok(markets)
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<EventsPage, FetchError> {
        let url = self.base_url.join("events")?;

        let mut query = vec![
            ("with_nested_markets", "true".to_string()),
            ("status", "open".to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let resp = self.client.get(url).query(&query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Kalshi events request failed");
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_page_flattens_and_stamps_markets() {
        let raw = r#"{
            "cursor": "abc",
            "events": [{
                "event_ticker": "KXFED-25MAR",
                "title": "Fed decision in March",
                "series_ticker": "KXFED",
                "markets": [
                    {"ticker": "KXFED-25MAR-C25", "event_ticker": "KXFED-25MAR", "yes_bid": 40, "yes_ask": 42},
                    {"ticker": "KXFED-25MAR-H0", "event_ticker": "KXFED-25MAR", "title": "Hold"}
                ]
            }]
        }"#;

        let page: EventsPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.cursor.as_deref(), Some("abc"));

        let markets: Vec<KalshiMarket> = page
            .events
            .into_iter()
            .flat_map(KalshiEvent::into_markets)
            .collect();

        assert_eq!(markets.len(), 2);
        assert!(markets.iter().all(|m| m.event_title.as_deref() == Some("Fed decision in March")));
        assert!(markets.iter().all(|m| m.series_ticker.as_deref() == Some("KXFED")));
        assert!(markets.iter().all(|m| m.series_title.is_none()));
        assert_eq!(markets[1].title(), Some("Hold"));
    }

    #[test]
    fn test_base_url_join() {
        let client = KalshiClient::new().unwrap();
        assert_eq!(
            client.base_url.join("events").unwrap().as_str(),
            "https://api.elections.kalshi.com/trade-api/v2/events"
        );
    }
}
