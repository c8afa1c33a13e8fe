//! Cross-platform market matching.
//!
//! # Algorithm
//!
//! ```text
//! every (poly, kalshi) with titles  --score >= candidate_floor-->  candidates
//! candidates sorted by similarity (stable, descending)
//! verifier?  top N in batches  --match && confidence >= min-->  verified
//! final = verified if non-empty, else candidates with similarity >= basic_threshold
//! greedy in rank order: each Kalshi ticker and Polymarket id used at most once
//! accepted pair -> normalise both sides -> one MatchedOutcomePair per shared outcome
//! ```

use crate::{
    config::MatchConfig,
    similarity::{TitleFeatures, score_features},
    verify::{MatchVerifier, Verification},
};
use futures::future::join_all;
use predarb_data::{KalshiMarket, Normalize, NormalizedOutcome, PolymarketMarket};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A tentative pairing of raw records, produced before acceptance is decided.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub polymarket: &'a PolymarketMarket,
    pub kalshi: &'a KalshiMarket,
    pub polymarket_title: &'a str,
    pub kalshi_title: &'a str,
    /// Title similarity in `[0, 1]`
    pub similarity: f64,
}

/// The same outcome of the same event, priced on both platforms.
///
/// Both sides always carry the same [`Outcome`](predarb_data::Outcome).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedOutcomePair {
    pub event_title: String,
    pub polymarket: NormalizedOutcome,
    pub kalshi: NormalizedOutcome,
    pub similarity: f64,
    /// Verifier verdict, if the pair was accepted through verification
    pub verification: Option<Verification>,
}

/// Matches Polymarket markets to Kalshi markets by title.
#[derive(Debug, Clone, Default)]
pub struct MarketMatcher {
    config: MatchConfig,
}

impl MarketMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Every pair scoring at least the candidate floor, best first.
    ///
    /// Records without a usable title on either side are skipped. Equal
    /// scores keep generation order.
    pub fn candidates<'a>(
        &self,
        polymarket: &'a [PolymarketMarket],
        kalshi: &'a [KalshiMarket],
    ) -> Vec<CandidatePair<'a>> {
        let kalshi_features: Vec<(&KalshiMarket, &str, TitleFeatures)> = kalshi
            .iter()
            .filter_map(|market| {
                let title = market.title()?;
                Some((market, title, TitleFeatures::new(title)))
            })
            .collect();

        let mut candidates = Vec::new();
        for poly in polymarket {
            let Some(poly_title) = poly.title() else {
                continue;
            };
            let poly_features = TitleFeatures::new(poly_title);

            for (kalshi, kalshi_title, features) in &kalshi_features {
                let similarity = score_features(&poly_features, features);
                if similarity >= self.config.candidate_floor {
                    candidates.push(CandidatePair {
                        polymarket: poly,
                        kalshi: *kalshi,
                        polymarket_title: poly_title,
                        kalshi_title: *kalshi_title,
                        similarity,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        debug!(count = candidates.len(), "Generated match candidates");
        candidates
    }

    /// Match markets across platforms, optionally consulting a verifier.
    pub async fn match_markets(
        &self,
        polymarket: &[PolymarketMarket],
        kalshi: &[KalshiMarket],
        verifier: Option<&dyn MatchVerifier>,
    ) -> Vec<MatchedOutcomePair> {
        let candidates = self.candidates(polymarket, kalshi);

        let verified = match verifier {
            Some(verifier) => self.verify_candidates(&candidates, verifier).await,
            None => Vec::new(),
        };

        let accepted: Vec<(CandidatePair<'_>, Option<Verification>)> = if verified.is_empty() {
            candidates
                .iter()
                .filter(|candidate| candidate.similarity >= self.config.basic_threshold)
                .map(|candidate| (*candidate, None))
                .collect()
        } else {
            info!(count = verified.len(), "Using verified candidates");
            verified
                .into_iter()
                .map(|(candidate, verification)| (candidate, Some(verification)))
                .collect()
        };

        let pairs = expand_greedy(accepted);
        info!(
            candidates = candidates.len(),
            matched_outcomes = pairs.len(),
            "Matched markets"
        );
        pairs
    }

    /// Ask the verifier about the top-ranked candidates, in rank-ordered batches.
    ///
    /// A failed call leaves that candidate unverified.
    async fn verify_candidates<'a>(
        &self,
        candidates: &[CandidatePair<'a>],
        verifier: &dyn MatchVerifier,
    ) -> Vec<(CandidatePair<'a>, Verification)> {
        let top = &candidates[..candidates.len().min(self.config.verify_candidate_cap)];
        let batch_size = self.config.verify_batch_size.max(1);
        let mut verified = Vec::new();

        for (index, batch) in top.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.verify_batch_delay()).await;
            }

            let results = join_all(
                batch
                    .iter()
                    .map(|candidate| verifier.verify(candidate.polymarket_title, candidate.kalshi_title)),
            )
            .await;

            for (candidate, result) in batch.iter().zip(results) {
                match result {
                    Ok(verification)
                        if verification.is_match
                            && verification.confidence >= self.config.verify_min_confidence =>
                    {
                        debug!(
                            polymarket = %candidate.polymarket.id,
                            kalshi = %candidate.kalshi.ticker,
                            confidence = verification.confidence,
                            "Verifier accepted candidate"
                        );
                        verified.push((*candidate, verification));
                    }
                    Ok(_) => {}
                    Err(error) => warn!(
                        %error,
                        polymarket = %candidate.polymarket.id,
                        kalshi = %candidate.kalshi.ticker,
                        "Verifier failed, candidate left unverified"
                    ),
                }
            }
        }

        verified
    }
}

/// Accept candidates in rank order, consuming each record once, and expand
/// accepted pairs into per-outcome pairs.
fn expand_greedy(accepted: Vec<(CandidatePair<'_>, Option<Verification>)>) -> Vec<MatchedOutcomePair> {
    let mut used_kalshi = HashSet::new();
    let mut used_polymarket = HashSet::new();
    let mut pairs = Vec::new();

    for (candidate, verification) in accepted {
        if used_kalshi.contains(&candidate.kalshi.ticker)
            || used_polymarket.contains(&candidate.polymarket.id)
        {
            continue;
        }
        used_kalshi.insert(candidate.kalshi.ticker.clone());
        used_polymarket.insert(candidate.polymarket.id.clone());

        debug!(
            polymarket = %candidate.polymarket.id,
            kalshi = %candidate.kalshi.ticker,
            similarity = candidate.similarity,
            "Accepted market pair"
        );

        let kalshi_outcomes = candidate.kalshi.normalize();
        for poly_outcome in candidate.polymarket.normalize() {
            for kalshi_outcome in kalshi_outcomes
                .iter()
                .filter(|k| k.outcome() == poly_outcome.outcome())
            {
                pairs.push(MatchedOutcomePair {
                    event_title: candidate.polymarket_title.to_string(),
                    polymarket: poly_outcome.clone(),
                    kalshi: kalshi_outcome.clone(),
                    similarity: candidate.similarity,
                    verification: verification.clone(),
                });
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use predarb_data::Outcome;
    use rust_decimal_macros::dec;

    fn poly(id: &str, question: &str) -> PolymarketMarket {
        PolymarketMarket::new(id, question).with_outcomes(["Yes", "No"], [dec!(0.40), dec!(0.60)])
    }

    fn kalshi(ticker: &str, title: &str) -> KalshiMarket {
        KalshiMarket::new(ticker, format!("{ticker}-EVT"), title).with_quote(dec!(0.44), dec!(0.46))
    }

    #[test]
    fn test_candidates_sorted_and_floored() {
        let matcher = MarketMatcher::default();
        let polys = [poly("1", "Bitcoin above 100k by December 2025")];
        let kalshis = [
            kalshi("KXMOON", "Lunar rover landing"),
            kalshi("KXBTC", "Bitcoin above 100k"),
            kalshi("KXBTC2", "Bitcoin above 100k by December 2025"),
        ];

        let candidates = matcher.candidates(&polys, &kalshis);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].kalshi.ticker, "KXBTC2");
        assert_eq!(candidates[0].similarity, 1.0);
        assert_eq!(candidates[1].kalshi.ticker, "KXBTC");
    }

    #[test]
    fn test_untitled_records_skipped() {
        let matcher = MarketMatcher::default();
        let polys = [poly("1", "  ")];
        let mut untitled = kalshi("KX", "Anything");
        untitled.event_title = None;
        let kalshis = [untitled];

        assert!(matcher.candidates(&polys, &kalshis).is_empty());
    }

    #[test]
    fn test_match_expands_both_outcomes() {
        let matcher = MarketMatcher::default();
        let polys = [poly("1", "Will the Fed cut rates in March 2025?")];
        let kalshis = [kalshi("KXFED", "Fed cut rates March 2025")];

        let pairs = tokio_test::block_on(matcher.match_markets(&polys, &kalshis, None));
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.polymarket.outcome() == p.kalshi.outcome()));
        assert_eq!(pairs[0].polymarket.outcome(), Outcome::Yes);
        assert_eq!(pairs[0].kalshi.price(), dec!(0.45));
        assert_eq!(pairs[1].kalshi.price(), dec!(0.55));
        assert_eq!(pairs[0].event_title, "Will the Fed cut rates in March 2025?");
        assert!(pairs[0].verification.is_none());
    }

    #[test]
    fn test_kalshi_record_consumed_once() {
        let matcher = MarketMatcher::default();
        let polys = [
            poly("1", "Fed cut rates March 2025"),
            poly("2", "Will the Fed cut rates in March 2025?"),
        ];
        let kalshis = [kalshi("KXFED", "Fed cut rates March 2025")];

        let pairs = tokio_test::block_on(matcher.match_markets(&polys, &kalshis, None));
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.polymarket.market_id() == "1"));
    }

    #[test]
    fn test_one_sided_outcomes_yield_partial_pairs() {
        let matcher = MarketMatcher::default();
        let polys = [PolymarketMarket::new("1", "Fed cut rates March 2025")
            .with_outcomes(["Yes", "Maybe"], [dec!(0.40), dec!(0.60)])];
        let kalshis = [kalshi("KXFED", "Fed cut rates March 2025")];

        let pairs = tokio_test::block_on(matcher.match_markets(&polys, &kalshis, None));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kalshi.outcome(), Outcome::Yes);
    }
}
