//! Fee application and true-arbitrage cost maths.
//!
//! Uses rust_decimal for exact precision in financial calculations.

use predarb_data::Outcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// YES and NO prices for one market on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SidePrices {
    pub yes: Decimal,
    pub no: Decimal,
}

impl SidePrices {
    pub fn new(yes: Decimal, no: Decimal) -> Self {
        Self { yes, no }
    }

    /// Derive both sides from one known price: `other = 1 - known`.
    pub fn from_known(outcome: Outcome, price: Decimal) -> Self {
        match outcome {
            Outcome::Yes => Self::new(price, Decimal::ONE - price),
            Outcome::No => Self::new(Decimal::ONE - price, price),
        }
    }
}

/// Result of buying the cheapest YES and cheapest NO across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrueArbitrage {
    /// Cheapest YES + cheapest NO, before fees
    pub total_cost: Decimal,
    pub total_cost_with_fees: Decimal,
    /// `max(0, 1 - total_cost_with_fees)` per $1 payout
    pub guaranteed_profit: Decimal,
}

/// Fee calculator for cross-platform positions.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Apply a multiplicative fee to a cost.
    ///
    /// Formula: cost * (1 + fee)
    pub fn with_fee(cost: Decimal, fee: Decimal) -> Decimal {
        cost * (Decimal::ONE + fee)
    }

    /// Cost and guaranteed profit of holding both outcomes, buying each side
    /// on whichever platform prices it lower.
    ///
    /// ```text
    /// total_cost           = min(poly.yes, kalshi.yes) + min(poly.no, kalshi.no)
    /// total_cost_with_fees = total_cost * (1 + fee)
    /// guaranteed_profit    = max(0, 1 - total_cost_with_fees)
    /// ```
    pub fn true_arbitrage(polymarket: SidePrices, kalshi: SidePrices, fee: Decimal) -> TrueArbitrage {
        let total_cost = polymarket.yes.min(kalshi.yes) + polymarket.no.min(kalshi.no);
        let total_cost_with_fees = Self::with_fee(total_cost, fee);
        let guaranteed_profit = (Decimal::ONE - total_cost_with_fees).max(Decimal::ZERO);

        TrueArbitrage {
            total_cost,
            total_cost_with_fees,
            guaranteed_profit,
        }
    }
}
