//! End-to-end scan: match markets, price every matched outcome, post-process.

use crate::{
    cache::TtlCache,
    config::{ArbitrageConfig, MatchConfig},
    matcher::MarketMatcher,
    opportunity::{ArbitrageCalculator, ArbitrageType, Opportunity},
    postprocess::postprocess,
    verify::MatchVerifier,
};
use predarb_data::{KalshiMarket, PolymarketMarket};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use tracing::{debug, info};

/// Cross-platform arbitrage scanner over one snapshot of markets.
///
/// Holds no state between scans; concurrent scans may share one instance.
#[derive(Debug, Clone, Default)]
pub struct ArbitrageScanner {
    matcher: MarketMatcher,
    calculator: ArbitrageCalculator,
}

impl ArbitrageScanner {
    pub fn new(match_config: MatchConfig, arb_config: ArbitrageConfig) -> Self {
        Self {
            matcher: MarketMatcher::new(match_config),
            calculator: ArbitrageCalculator::new(arb_config),
        }
    }

    pub fn matcher(&self) -> &MarketMatcher {
        &self.matcher
    }

    pub fn calculator(&self) -> &ArbitrageCalculator {
        &self.calculator
    }

    /// Match, price and post-process one snapshot.
    pub async fn scan(
        &self,
        polymarket: &[PolymarketMarket],
        kalshi: &[KalshiMarket],
        verifier: Option<&dyn MatchVerifier>,
    ) -> Vec<Opportunity> {
        let pairs = self.matcher.match_markets(polymarket, kalshi, verifier).await;

        let raw: Vec<Opportunity> = pairs.iter().map(|pair| self.calculator.calculate(pair)).collect();
        let opportunities = postprocess(raw);

        let summary = ScanSummary::new(&opportunities);
        info!(
            polymarket = polymarket.len(),
            kalshi = kalshi.len(),
            matched_outcomes = pairs.len(),
            opportunities = summary.total,
            arbitrage = summary.arbitrage(),
            "Scan complete"
        );
        opportunities
    }

    /// [`scan`](Self::scan), reusing the cached result for `key` while it is fresh.
    pub async fn scan_cached<K>(
        &self,
        key: K,
        cache: &TtlCache<K, Vec<Opportunity>>,
        polymarket: &[PolymarketMarket],
        kalshi: &[KalshiMarket],
        verifier: Option<&dyn MatchVerifier>,
    ) -> Vec<Opportunity>
    where
        K: Eq + Hash,
    {
        if let Some(cached) = cache.get(&key) {
            debug!(count = cached.len(), "Serving cached scan");
            return cached;
        }

        let opportunities = self.scan(polymarket, kalshi, verifier).await;
        cache.insert(key, opportunities.clone());
        opportunities
    }
}

/// Aggregate view over a set of [`Opportunity`]s.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub true_arbitrage: usize,
    pub spread_arbitrage: usize,
    /// Largest absolute spread, in percentage points
    pub best_profit_percent: Option<Decimal>,
    /// Largest guaranteed profit among true arbitrages
    pub best_guaranteed_profit: Option<Decimal>,
}

impl ScanSummary {
    pub fn new(opportunities: &[Opportunity]) -> Self {
        let count = |kind: ArbitrageType| {
            opportunities
                .iter()
                .filter(|o| o.arbitrage_type == kind)
                .count()
        };

        Self {
            total: opportunities.len(),
            true_arbitrage: count(ArbitrageType::True),
            spread_arbitrage: count(ArbitrageType::Spread),
            best_profit_percent: opportunities.iter().map(|o| o.profit_percent.abs()).max(),
            best_guaranteed_profit: opportunities
                .iter()
                .filter(|o| o.arbitrage_type == ArbitrageType::True)
                .filter_map(|o| o.guaranteed_profit)
                .max(),
        }
    }

    pub fn arbitrage(&self) -> usize {
        self.true_arbitrage + self.spread_arbitrage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predarb_data::{MarketLinks, Outcome};
    use rust_decimal_macros::dec;

    fn opp(kind: ArbitrageType, profit_percent: Decimal, guaranteed: Option<Decimal>) -> Opportunity {
        Opportunity {
            event: "Event".to_string(),
            outcome: Outcome::Yes,
            polymarket_price: dec!(0.5),
            kalshi_price: dec!(0.5),
            spread: profit_percent / dec!(100),
            profit_percent,
            arbitrage: kind != ArbitrageType::None,
            arbitrage_type: kind,
            total_cost: None,
            guaranteed_profit: guaranteed,
            is_resolved: Some(false),
            polymarket_id: "1".into(),
            kalshi_ticker: "K".into(),
            polymarket_links: MarketLinks::default(),
            kalshi_links: MarketLinks::default(),
            liquidity: None,
            closes_at: None,
            similarity: 1.0,
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = ScanSummary::new(&[
            opp(ArbitrageType::True, dec!(8), Some(dec!(0.07))),
            opp(ArbitrageType::True, dec!(-12), Some(dec!(0.1))),
            opp(ArbitrageType::Spread, dec!(6), Some(dec!(0))),
            opp(ArbitrageType::None, dec!(1), Some(dec!(0.5))),
        ]);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.true_arbitrage, 2);
        assert_eq!(summary.spread_arbitrage, 1);
        assert_eq!(summary.arbitrage(), 3);
        assert_eq!(summary.best_profit_percent, Some(dec!(12)));
        assert_eq!(summary.best_guaranteed_profit, Some(dec!(0.1)));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(ScanSummary::new(&[]), ScanSummary::default());
    }
}
