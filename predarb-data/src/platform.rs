use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Prediction market platform a record originates from.
///
/// Polymarket is platform A and Kalshi is platform B throughout the matching
/// pipeline: platform B records are the ones consumed at most once.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[display("polymarket")]
    Polymarket,
    #[display("kalshi")]
    Kalshi,
}

/// Outcome side for a binary prediction market (YES or NO).
#[derive(
    Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Display, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[display("yes")]
    Yes,
    #[display("no")]
    No,
}

impl Outcome {
    /// Get the inverse outcome.
    pub fn inverse(&self) -> Self {
        match self {
            Outcome::Yes => Outcome::No,
            Outcome::No => Outcome::Yes,
        }
    }

    /// Map a free-form outcome label onto a binary side.
    ///
    /// Case-insensitive: anything containing "YES", or exactly "TRUE" / "1",
    /// is YES; symmetric for NO. Other labels (team names, ranges) return
    /// `None` so the caller can skip just that outcome.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_uppercase();
        if label.contains("YES") || label == "TRUE" || label == "1" {
            Some(Outcome::Yes)
        } else if label.contains("NO") || label == "FALSE" || label == "0" {
            Some(Outcome::No)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_inverse() {
        assert_eq!(Outcome::Yes.inverse(), Outcome::No);
        assert_eq!(Outcome::No.inverse(), Outcome::Yes);
    }

    #[test]
    fn test_outcome_from_label() {
        assert_eq!(Outcome::from_label("Yes"), Some(Outcome::Yes));
        assert_eq!(Outcome::from_label(" yes "), Some(Outcome::Yes));
        assert_eq!(Outcome::from_label("TRUE"), Some(Outcome::Yes));
        assert_eq!(Outcome::from_label("1"), Some(Outcome::Yes));
        assert_eq!(Outcome::from_label("No"), Some(Outcome::No));
        assert_eq!(Outcome::from_label("false"), Some(Outcome::No));
        assert_eq!(Outcome::from_label("0"), Some(Outcome::No));
        assert_eq!(Outcome::from_label("Lakers"), None);
        assert_eq!(Outcome::from_label("Over 2.5"), None);
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::Polymarket.to_string(), "polymarket");
        assert_eq!(Platform::Kalshi.to_string(), "kalshi");
        assert_eq!(Outcome::Yes.to_string(), "yes");
        assert_eq!(Outcome::No.to_string(), "no");
    }
}
