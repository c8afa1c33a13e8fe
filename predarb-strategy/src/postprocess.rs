use crate::opportunity::Opportunity;
use indexmap::{IndexMap, map::Entry};
use predarb_data::Outcome;
use smol_str::SmolStr;
use tracing::debug;

/// Drop resolved opportunities and keep at most one per Polymarket market
/// and outcome: the one with the largest absolute spread.
///
/// Survivors keep the order in which their key was first seen.
pub fn postprocess(opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    let total = opportunities.len();
    let mut best: IndexMap<(SmolStr, Outcome), Opportunity> = IndexMap::new();

    for opportunity in opportunities.into_iter().filter(|o| !o.resolved()) {
        let key = (opportunity.polymarket_id.clone(), opportunity.outcome);
        match best.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(opportunity);
            }
            Entry::Occupied(mut entry) => {
                if opportunity.profit_percent.abs() > entry.get().profit_percent.abs() {
                    entry.insert(opportunity);
                }
            }
        }
    }

    debug!(total, kept = best.len(), "Post-processed opportunities");
    best.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunity::ArbitrageType;
    use predarb_data::MarketLinks;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn opp(id: &str, ticker: &str, outcome: Outcome, profit_percent: Decimal) -> Opportunity {
        Opportunity {
            event: "Event".to_string(),
            outcome,
            polymarket_price: dec!(0.5),
            kalshi_price: dec!(0.5) + profit_percent / dec!(100),
            spread: profit_percent / dec!(100),
            profit_percent,
            arbitrage: false,
            arbitrage_type: ArbitrageType::None,
            total_cost: None,
            guaranteed_profit: None,
            is_resolved: Some(false),
            polymarket_id: id.into(),
            kalshi_ticker: ticker.into(),
            polymarket_links: MarketLinks::default(),
            kalshi_links: MarketLinks::default(),
            liquidity: None,
            closes_at: None,
            similarity: 1.0,
        }
    }

    #[test]
    fn test_drops_resolved() {
        let mut resolved = opp("1", "KA", Outcome::Yes, dec!(10));
        resolved.is_resolved = Some(true);

        let kept = postprocess(vec![resolved, opp("2", "KB", Outcome::Yes, dec!(3))]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].polymarket_id, "2");
    }

    #[test]
    fn test_missing_flag_falls_back_to_prices() {
        let mut settled = opp("1", "KA", Outcome::Yes, dec!(1));
        settled.is_resolved = None;
        settled.polymarket_price = dec!(0.002);

        let mut open = opp("2", "KB", Outcome::Yes, dec!(1));
        open.is_resolved = None;

        let kept = postprocess(vec![settled, open]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].polymarket_id, "2");
    }

    #[test]
    fn test_dedup_keeps_largest_absolute_spread() {
        let kept = postprocess(vec![
            opp("1", "KA", Outcome::Yes, dec!(4)),
            opp("1", "KB", Outcome::Yes, dec!(-9)),
            opp("1", "KC", Outcome::Yes, dec!(6)),
            opp("1", "KA", Outcome::No, dec!(-4)),
            opp("2", "KD", Outcome::Yes, dec!(1)),
        ]);

        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].kalshi_ticker, "KB");
        assert_eq!(kept[1].outcome, Outcome::No);
        assert_eq!(kept[2].polymarket_id, "2");
    }

    #[test]
    fn test_ties_keep_first() {
        let kept = postprocess(vec![
            opp("1", "KA", Outcome::Yes, dec!(5)),
            opp("1", "KB", Outcome::Yes, dec!(-5)),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kalshi_ticker, "KA");
    }
}
