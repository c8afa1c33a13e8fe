//! Polymarket Gamma REST client for public market listings.

use super::market::PolymarketMarket;
use crate::error::FetchError;
use reqwest::Client;
use tracing::{debug, error, info};
use url::Url;

const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

/// Maximum page size accepted by the Gamma `/markets` endpoint.
const PAGE_SIZE: usize = 500;

/// Unauthenticated client for the Gamma markets API.
#[derive(Debug, Clone)]
pub struct GammaClient {
    client: Client,
    base_url: Url,
}

impl GammaClient {
    /// Create a client against the production Gamma API.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(GAMMA_API_BASE)
    }

    /// Create a client against an alternative base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        // Trailing slash so `join` keeps any path prefix
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

    /// Fetch up to `limit` active, unclosed markets, paging by offset.
    pub async fn fetch_markets(&self, limit: usize) -> Result<Vec<PolymarketMarket>, FetchError> {
        let mut markets = Vec::new();

        while markets.len() < limit {
            let page_size = PAGE_SIZE.min(limit - markets.len());
            let page = self.fetch_page(page_size, markets.len()).await?;
            let fetched = page.len();
            markets.extend(page);

            debug!(fetched, total = markets.len(), "Fetched Gamma markets page");
            if fetched < page_size {
                break;
            }
        }

        info!(count = markets.len(), "Fetched Polymarket markets");
        Ok(markets)
    }

    async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PolymarketMarket>, FetchError> {
        let url = self.base_url.join("markets")?;

        let resp = self
            .client
            .get(url)
            .query(&[
                ("active", "true".to_string()),
                ("closed", "false".to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Gamma markets request failed");
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
    use rust_decimal_macros::dec;

    #[test]
    fn test_markets_page_deserializes() {
        let raw = r#"[
            {"id": "512", "question": "Fed cut in March?", "outcomes": "[\"Yes\", \"No\"]", "outcomePrices": "[\"0.6\", \"0.4\"]"},
            {"id": 513, "question": "Fed hike in March?", "liquidityNum": 10}
        ]"#;

        let page: Vec<PolymarketMarket> = serde_json::from_str(raw).unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "512");
        assert_eq!(page[0].outcome_price(0), Some(dec!(0.6)));
        assert_eq!(page[1].id, "513");
        assert_eq!(page[1].liquidity(), Some(dec!(10)));
    }

    #[test]
    fn test_base_url_join() {
        let client = GammaClient::new().unwrap();
        assert_eq!(
            client.base_url.join("markets").unwrap().as_str(),
            "https://gamma-api.polymarket.com/markets"
        );

        let client = GammaClient::with_base_url("http://localhost:8080/api").unwrap();
        assert_eq!(
            client.base_url.join("markets").unwrap().as_str(),
            "http://localhost:8080/api/markets"
        );
    }
}
