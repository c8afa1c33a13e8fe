//! Title canonicalisation shared by similarity scoring and display grouping.
//!
//! ```text
//! "Will Donald Trump win the 2024 election?"  ->  "trump win 2024 election"
//! "Does the Super Bowl happen?"                ->  "superbowl"
//! ```

use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on canonicalisation passes before the fixpoint is assumed.
const MAX_PASSES: usize = 8;

static RE_LEADING_AUXILIARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(will|does|did|is|are|was|were)\s+").unwrap());

static RE_TRAILING_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s+(happen|occur|take\s+place|be\s+true|be\s+false))+\s*\??\s*$").unwrap()
});

static SYNONYMS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\b(donald|don|president)\s+trump\b", "trump"),
        (r"\b(joe|president)\s+biden\b", "biden"),
        (r"\bkamala\s+harris\b", "harris"),
        (r"\bworld\s+cup\b", "worldcup"),
        (r"\bsuper\s+bowl\b", "superbowl"),
        (r"\bfederal\s+reserve\b", "fed"),
        (r"\bbtc\b", "bitcoin"),
        (r"\beth\b", "ethereum"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "does", "for", "from", "in", "is",
    "it", "its", "of", "on", "or", "the", "this", "that", "to", "was", "were", "will", "with",
];

/// Canonical form of a market title.
///
/// Deterministic and idempotent: `canonicalize(&canonicalize(s)) == canonicalize(s)`.
pub fn canonicalize(title: &str) -> String {
    let mut current = single_pass(title);
    for _ in 1..MAX_PASSES {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn single_pass(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let text = RE_LEADING_AUXILIARY.replace(&lower, "");
    let mut text = RE_TRAILING_PHRASE.replace(&text, "").into_owned();

    for (pattern, replacement) in SYNONYMS.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
    }

    let stripped: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_auxiliary_and_stop_words() {
        assert_eq!(
            canonicalize("Will Donald Trump win the 2024 election?"),
            "trump win 2024 election"
        );
        assert_eq!(canonicalize("Is BTC above $100k?"), "bitcoin above 100k");
    }

    #[test]
    fn test_strips_trailing_phrase() {
        assert_eq!(canonicalize("Does the Super Bowl happen?"), "superbowl");
        assert_eq!(canonicalize("Will a recession occur"), "recession");
        assert_eq!(canonicalize("Will the merger take place?"), "merger");
    }

    #[test]
    fn test_synonyms_collapse() {
        assert_eq!(canonicalize("World Cup 2026 winner"), canonicalize("worldcup 2026 winner"));
        assert_eq!(canonicalize("Federal Reserve cuts rates"), "fed cuts rates");
        assert_eq!(canonicalize("President Trump signs bill"), canonicalize("Don Trump signs bill"));
    }

    #[test]
    fn test_idempotent() {
        let titles = [
            "Will Donald Trump win the 2024 election?",
            "Is it true that the Fed will cut rates?",
            "will will does happen happen?",
            "The Super Bowl: Chiefs vs. Eagles",
            "Was the event, in fact, a success? Does it occur",
            "",
            "???",
        ];
        for title in titles {
            let once = canonicalize(title);
            assert_eq!(canonicalize(&once), once, "not idempotent for {title:?}");
        }
    }

    #[test]
    fn test_punctuation_only_is_empty() {
        assert_eq!(canonicalize("?!"), "");
        assert_eq!(canonicalize("  "), "");
    }
}
