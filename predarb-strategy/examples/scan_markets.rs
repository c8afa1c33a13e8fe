//! Example: Fetch live Polymarket and Kalshi markets and scan for arbitrage.
//!
//! This example demonstrates the full workflow:
//! 1. Fetch open markets from the Polymarket Gamma API and the Kalshi events API
//! 2. Optionally build an LLM verifier from the environment
//! 3. Match, price and post-process the snapshot
//!
//! Usage:
//!   cargo run -p predarb-strategy --example scan_markets
//!
//! Optional environment variables:
//!   MARKET_LIMIT=500       # Markets fetched per platform (default: 500)
//!   USE_VERIFIER=1         # Verify top candidates with an LLM (needs LLM_API_KEY)
//!   MIN_PROFIT_PERCENT, TRANSACTION_FEE, BASIC_MATCH_THRESHOLD, ...

use predarb_data::{GammaClient, KalshiClient};
use predarb_strategy::{
    ArbitrageConfig, ArbitrageScanner, LlmVerifier, MatchConfig, MatchVerifier, ScanSummary,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_logging();

    let (match_config, arb_config) = match (MatchConfig::from_env(), ArbitrageConfig::from_env()) {
        (Ok(m), Ok(a)) => (m, a),
        (Err(e), _) | (_, Err(e)) => {
            error!(%e, "Invalid configuration");
            return;
        }
    };

    let limit = std::env::var("MARKET_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(500);

    let (gamma, kalshi) = match (GammaClient::new(), KalshiClient::new()) {
        (Ok(g), Ok(k)) => (g, k),
        (Err(e), _) | (_, Err(e)) => {
            error!(%e, "Failed to build REST clients");
            return;
        }
    };

    info!(limit, "Fetching markets...");
    let (polymarket, kalshi) = match tokio::join!(gamma.fetch_markets(limit), kalshi.fetch_markets(limit)) {
        (Ok(p), Ok(k)) => (p, k),
        (Err(e), _) | (_, Err(e)) => {
            error!(%e, "Failed to fetch markets");
            return;
        }
    };

    let verifier = if std::env::var("USE_VERIFIER").is_ok() {
        match LlmVerifier::from_env() {
            Ok(verifier) => {
                info!(model = verifier.model(), "Using LLM verifier");
                Some(verifier)
            }
            Err(e) => {
                warn!(%e, "LLM verifier unavailable, using similarity only");
                None
            }
        }
    } else {
        None
    };

    let scanner = ArbitrageScanner::new(match_config, arb_config);
    let opportunities = scanner
        .scan(
            &polymarket,
            &kalshi,
            verifier.as_ref().map(|v| v as &dyn MatchVerifier),
        )
        .await;

    for opp in opportunities.iter().filter(|o| o.arbitrage) {
        info!(
            event = %opp.event,
            outcome = %opp.outcome,
            kind = %opp.arbitrage_type,
            polymarket = %opp.polymarket_price,
            kalshi = %opp.kalshi_price,
            profit_percent = %opp.profit_percent,
            guaranteed_profit = ?opp.guaranteed_profit,
            polymarket_url = ?opp.polymarket_url().map(|u| u.to_string()),
            kalshi_url = ?opp.kalshi_url().map(|u| u.to_string()),
            "Arbitrage opportunity"
        );
    }

    let summary = ScanSummary::new(&opportunities);
    info!(
        total = summary.total,
        true_arbitrage = summary.true_arbitrage,
        spread_arbitrage = summary.spread_arbitrage,
        best_profit_percent = ?summary.best_profit_percent,
        best_guaranteed_profit = ?summary.best_guaranteed_profit,
        "Scan summary"
    );
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .init()
}
