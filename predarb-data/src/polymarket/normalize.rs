use super::market::PolymarketMarket;
use crate::{
    normalize::{MarketLinks, Normalize, NormalizedOutcome},
    platform::{Outcome, Platform},
};
use tracing::trace;

impl Normalize for PolymarketMarket {
    /// Emit one [`NormalizedOutcome`] per label that maps onto YES or NO.
    ///
    /// Prices of exactly 0 or 1 are kept: resolved markets are filtered by
    /// the arbitrage calculator, not here.
    fn normalize(&self) -> Vec<NormalizedOutcome> {
        let Some(labels) = self.outcome_labels().filter(|labels| !labels.is_empty()) else {
            trace!(id = %self.id, "Polymarket market has no outcome labels");
            return Vec::new();
        };

        let title = self.title().unwrap_or_default();
        let liquidity = self.liquidity();
        let closes_at = self.closes_at();
        let links = MarketLinks {
            slug: self.slug.clone(),
            condition_id: self.condition_id.clone(),
            ..Default::default()
        };

        labels
            .iter()
            .enumerate()
            .filter_map(|(index, label)| {
                let outcome = Outcome::from_label(label)?;
                let price = self.outcome_price(index)?;
                NormalizedOutcome::new(Platform::Polymarket, self.id.clone(), title, outcome, price)
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn market() -> PolymarketMarket {
        let mut market = PolymarketMarket::new("512", "Will BTC hit $100k in 2025?")
            .with_outcomes(["Yes", "No"], [dec!(0.62), dec!(0.38)]);
        market.slug = Some("btc-100k-2025".into());
        market.liquidity_num = Some(json!(5000));
        market
    }

    #[test]
    fn test_normalize_binary_market() {
        let outcomes = market().normalize();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].outcome(), Outcome::Yes);
        assert_eq!(outcomes[0].price(), dec!(0.62));
        assert_eq!(outcomes[1].outcome(), Outcome::No);
        assert_eq!(outcomes[1].price(), dec!(0.38));
        assert!(outcomes.iter().all(|o| o.platform() == Platform::Polymarket));
        assert!(outcomes.iter().all(|o| o.market_id() == "512"));
        assert_eq!(outcomes[0].liquidity(), Some(dec!(5000)));
        assert_eq!(outcomes[0].links().slug.as_deref(), Some("btc-100k-2025"));
        assert_eq!(outcomes[0].event_title(), "Will BTC hit $100k in 2025?");
    }

    #[test]
    fn test_missing_or_empty_labels_yield_nothing() {
        let mut m = market();
        m.outcomes = None;
        assert!(m.normalize().is_empty());

        m.outcomes = Some(json!("[]"));
        assert!(m.normalize().is_empty());

        m.outcomes = Some(json!("not-json"));
        assert!(m.normalize().is_empty());
    }

    #[test]
    fn test_unmapped_labels_skip_only_that_side() {
        let m = PolymarketMarket::new("7", "Lakers vs Celtics")
            .with_outcomes(["Lakers", "No"], [dec!(0.55), dec!(0.45)]);

        let outcomes = m.normalize();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].outcome(), Outcome::No);
        assert_eq!(outcomes[0].price(), dec!(0.45));
    }

    #[test]
    fn test_out_of_range_and_garbage_prices_skipped() {
        let mut m = market();
        m.outcome_prices = Some(json!(["1.5", "NaN"]));
        assert!(m.normalize().is_empty());

        m.outcome_prices = Some(json!(["-0.1", "0.4"]));
        let outcomes = m.normalize();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].outcome(), Outcome::No);
    }

    #[test]
    fn test_boundary_prices_kept() {
        let m = PolymarketMarket::new("9", "Resolved market")
            .with_outcomes(["Yes", "No"], [dec!(1), dec!(0)]);

        let outcomes = m.normalize();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].price(), dec!(1));
        assert_eq!(outcomes[1].price(), dec!(0));
    }

    #[test]
    fn test_last_trade_price_fallback() {
        let mut m = market();
        m.outcome_prices = None;
        m.last_trade_price = Some(json!("0.7"));

        let outcomes = m.normalize();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.price() == dec!(0.7)));

        m.last_trade_price = None;
        assert!(m.normalize().is_empty());
    }
}
