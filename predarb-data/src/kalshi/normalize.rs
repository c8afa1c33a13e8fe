use super::market::KalshiMarket;
use crate::{
    normalize::{MarketLinks, Normalize, NormalizedOutcome, is_open_price},
    platform::{Outcome, Platform},
};
use rust_decimal::Decimal;
use tracing::trace;

impl Normalize for KalshiMarket {
    /// Emit the YES side and the derived NO side (`1 - YES`).
    ///
    /// Unlike Polymarket, sides priced at exactly 0 or 1 are dropped here.
    fn normalize(&self) -> Vec<NormalizedOutcome> {
        let Some(event_title) = self.event_title() else {
            trace!(ticker = %self.ticker, "Kalshi market has no event title");
            return Vec::new();
        };

        let Some(yes_price) = self.yes_price() else {
            trace!(ticker = %self.ticker, "Kalshi market has no usable price");
            return Vec::new();
        };

        let liquidity = self.liquidity();
        let closes_at = self.closes_at();
        let links = MarketLinks {
            event_ticker: Some(self.event_ticker.clone()),
            series_ticker: self.series_ticker.clone(),
            series_title: self.series_title.clone(),
            ..Default::default()
        };

        [
            (Outcome::Yes, Some(yes_price)),
            (Outcome::No, Decimal::ONE.checked_sub(yes_price)),
        ]
        .into_iter()
        .filter_map(|(outcome, price)| price.filter(|p| is_open_price(*p)).map(|p| (outcome, p)))
        .filter_map(|(outcome, price)| {
            NormalizedOutcome::new(
                Platform::Kalshi,
                self.ticker.clone(),
                event_title,
                outcome,
                price,
            )
        })
        .map(|outcome| {
            outcome
                .with_liquidity(liquidity)
                .with_closes_at(closes_at)
                .with_links(links.clone())
        })
        .collect()
    }
}
