//! Bounded similarity between two market titles.
//!
//! # Scoring
//!
//! ```text
//! canonical(a) == canonical(b)           -> 1.0
//! canonical(a) contains canonical(b)     -> 0.7 + 0.2 * len(shorter) / len(longer)
//! otherwise, clamped to [0, 1]:
//!     0.5 * jaccard(tokens longer than 2 chars)
//!   + 0.1 if one raw title contains the other
//!   + 0.2 * shared numbers / max(numbers)
//!   + keyword bonus in [-0.2, 0.3]
//!   + 0.1 base
//! ```
//!
//! The keyword and length-ratio terms are not strictly symmetric in their
//! arguments; only the bounds and exact-match behaviour are guaranteed.

use crate::canonical::canonicalize;
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

const JACCARD_WEIGHT: f64 = 0.5;
const RAW_CONTAINMENT_BONUS: f64 = 0.1;
const NUMBER_WEIGHT: f64 = 0.2;
const KEYWORD_SHARED_BONUS: f64 = 0.1;
const KEYWORD_ONE_SIDED_PENALTY: f64 = 0.05;
const KEYWORD_MIN: f64 = -0.2;
const KEYWORD_MAX: f64 = 0.3;
const BASE_SCORE: f64 = 0.1;

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Domain keywords whose presence on only one side is a strong mismatch signal.
const KEYWORDS: &[&str] = &[
    // People
    "trump", "biden", "harris", "vance", "newsom", "desantis", "musk", "powell",
    // Crypto
    "bitcoin", "ethereum", "solana",
    // Sports
    "nfl", "nba", "mlb", "nhl", "ufc", "superbowl", "worldcup", "olympics",
    // Macro
    "fed", "inflation", "recession", "cpi", "gdp", "unemployment", "tariff", "tariffs",
    // Politics
    "election", "senate", "house", "governor", "president", "nominee",
];

/// Pre-computed per-title features, so a title compared against many
/// others is only canonicalised once.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleFeatures {
    raw: String,
    canonical: String,
    tokens: HashSet<String>,
    numbers: HashSet<String>,
    keywords: HashSet<&'static str>,
}

impl TitleFeatures {
    pub fn new(title: &str) -> Self {
        let raw = title.trim().to_lowercase();
        let canonical = canonicalize(title);

        let words: HashSet<&str> = canonical.split_whitespace().collect();
        let tokens = words
            .iter()
            .filter(|word| word.chars().count() > 2)
            .map(|word| word.to_string())
            .collect();
        let keywords = KEYWORDS
            .iter()
            .copied()
            .filter(|keyword| words.contains(keyword))
            .collect();
        let numbers = RE_NUMBER
            .find_iter(&raw)
            .map(|m| m.as_str().to_string())
            .collect();

        Self {
            raw,
            canonical,
            tokens,
            numbers,
            keywords,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// Similarity of two raw titles in `[0, 1]`.
pub fn score(title_a: &str, title_b: &str) -> f64 {
    score_features(&TitleFeatures::new(title_a), &TitleFeatures::new(title_b))
}

/// Similarity of two pre-computed [`TitleFeatures`] in `[0, 1]`.
pub fn score_features(a: &TitleFeatures, b: &TitleFeatures) -> f64 {
    if is_exact_match(a, b) {
        return 1.0;
    }

    if let Some(ratio) = containment_ratio(&a.canonical, &b.canonical) {
        return 0.7 + 0.2 * ratio;
    }

    let total = JACCARD_WEIGHT * jaccard(&a.tokens, &b.tokens)
        + raw_containment(&a.raw, &b.raw)
        + number_overlap(&a.numbers, &b.numbers)
        + keyword_bonus(&a.keywords, &b.keywords)
        + BASE_SCORE;

    total.clamp(0.0, 1.0)
}

fn is_exact_match(a: &TitleFeatures, b: &TitleFeatures) -> bool {
    if a.canonical.is_empty() {
        !a.raw.is_empty() && a.raw == b.raw
    } else {
        a.canonical == b.canonical
    }
}

/// `len(shorter) / len(longer)` if the longer string contains the non-empty shorter one.
fn containment_ratio(a: &str, b: &str) -> Option<f64> {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() || !longer.contains(shorter) {
        return None;
    }
    Some(shorter.chars().count() as f64 / longer.chars().count() as f64)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

fn raw_containment(a: &str, b: &str) -> f64 {
    match containment_ratio(a, b) {
        Some(_) => RAW_CONTAINMENT_BONUS,
        None => 0.0,
    }
}

fn number_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / a.len().max(b.len()) as f64 * NUMBER_WEIGHT
}

fn keyword_bonus(a: &HashSet<&'static str>, b: &HashSet<&'static str>) -> f64 {
    let shared = a.intersection(b).count();
    let one_sided = a.symmetric_difference(b).count();
    let bonus = shared as f64 * KEYWORD_SHARED_BONUS - one_sided as f64 * KEYWORD_ONE_SIDED_PENALTY;
    bonus.clamp(KEYWORD_MIN, KEYWORD_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_identical_titles_score_one() {
        for title in [
            "Will Bitcoin reach $100k in 2025?",
            "Fed rate cut in March",
            "?",
            "the",
        ] {
            assert_eq!(score(title, title), 1.0, "{title:?}");
        }
    }

    #[test]
    fn test_canonical_equivalents_score_one() {
        assert_eq!(
            score("Will Donald Trump win the election?", "Trump win election"),
            1.0
        );
    }

    #[test]
    fn test_distinct_empty_canonicals_are_not_exact() {
        let s = score("?", "!!");
        assert!(s < 1.0);
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn test_containment_range() {
        let s = score("Bitcoin above 100k", "Bitcoin above 100k by December 2025");
        assert!((0.7..=0.9).contains(&s), "{s}");

        // Closer lengths score higher
        let close = score("fed cuts rates march", "fed cuts rates march 2025");
        let far = score("fed cuts", "fed cuts rates march 2025 emergency meeting");
        assert!(close > far);
    }

    #[test]
    fn test_jaccard_only_scores() {
        // 2 shared of 6 distinct tokens: 0.5 * 1/3 + 0.1
        let s = score("lunar rover landing mission", "lunar rover orbit launch");
        assert!((s - (0.5 / 3.0 + 0.1)).abs() < EPSILON, "{s}");

        // Nothing in common: base only
        let s = score("lunar rover landing", "stock market crash");
        assert!((s - 0.1).abs() < EPSILON, "{s}");
    }

    #[test]
    fn test_numbers_contribute() {
        let with_numbers = score("Rainfall above 30 inches 2025", "Snowfall above 30 inches 2025");
        let without = score("Rainfall above inches", "Snowfall above inches");
        assert!(with_numbers > without);
    }

    #[test]
    fn test_keyword_mismatch_penalised() {
        let same = score("trump approval rating january", "trump approval rating february");
        let different = score("trump approval rating january", "biden approval rating february");
        assert!(same > different);
    }

    #[test]
    fn test_bounded() {
        let titles = [
            "",
            "?",
            "Will Trump, Biden, Harris, Musk and Powell meet at the Super Bowl in 2025?",
            "Trump Biden Harris Musk Powell superbowl 2025 nfl nba mlb",
            "Bitcoin vs Ethereum market cap flip by 2026",
            "NHL NBA MLB NFL UFC",
            "inflation recession cpi gdp unemployment tariff",
        ];
        for a in titles {
            for b in titles {
                let s = score(a, b);
                assert!((0.0..=1.0).contains(&s), "score({a:?}, {b:?}) = {s}");
            }
        }
    }

    #[test]
    fn test_features_reuse_matches_direct_score() {
        let a = TitleFeatures::new("Will the Fed cut rates in March 2025?");
        let b = TitleFeatures::new("Fed March 2025 decision: cut 25bps");
        assert_eq!(score_features(&a, &b), score(
            "Will the Fed cut rates in March 2025?",
            "Fed March 2025 decision: cut 25bps"
        ));
        assert_eq!(a.canonical(), "fed cut rates march 2025");
    }
}
