//! Free-text rating interpretation for search-style providers.
//!
//! Providers such as fact-check search APIs return publisher ratings like
//! "Mostly False" or "Accurate". [`interpret_rating`] maps one rating into the
//! closed [`Verification`] set and [`tally_ratings`] folds several of them.

use crate::model::Verification;

/// Indicator phrases used to classify ratings. Matching is case-insensitive
/// substring matching; falsity indicators are tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingKeywords {
    pub falsity: Vec<String>,
    pub truth: Vec<String>,
}

const FALSITY_INDICATORS: &[&str] = &[
    "incorrect",
    "false",
    "untrue",
    "misleading",
    "wrong",
    "inaccurate",
    "debunked",
    "no evidence",
    "not true",
    "mostly false",
];

const TRUTH_INDICATORS: &[&str] = &[
    "correct",
    "true",
    "accurate",
    "verified",
    "confirmed",
    "supported by evidence",
    "factual",
    "mostly true",
];

impl Default for RatingKeywords {
    fn default() -> Self {
        Self::new(FALSITY_INDICATORS, TRUTH_INDICATORS)
    }
}

impl RatingKeywords {
    pub fn new(falsity: &[&str], truth: &[&str]) -> Self {
        Self {
            falsity: falsity.iter().map(|k| k.to_lowercase()).collect(),
            truth: truth.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

/// Classifies one rating. Text that contains both a falsity and a truth
/// indicator is a `mismatch`; text with neither (or empty text) is `no_data`.
pub fn interpret_rating(rating: &str, keywords: &RatingKeywords) -> Verification {
    let rating = rating.trim().to_lowercase();
    if rating.is_empty() {
        return Verification::NoData;
    }

    if keywords.falsity.iter().any(|k| rating.contains(k.as_str())) {
        return Verification::Mismatch;
    }
    if keywords.truth.iter().any(|k| rating.contains(k.as_str())) {
        return Verification::Match;
    }
    Verification::NoData
}

/// Folds independent ratings of the same claim into one outcome.
///
/// No matches and no mismatches is `no_data`; a nonzero mix of both is
/// `conflicting`. Incoming `conflicting` values count toward both sides.
pub fn tally_ratings<I>(ratings: I) -> Verification
where
    I: IntoIterator<Item = Verification>,
{
    let (mut matches, mut mismatches) = (0usize, 0usize);
    for rating in ratings {
        match rating {
            Verification::Match => matches += 1,
            Verification::Mismatch => mismatches += 1,
            Verification::Conflicting => {
                matches += 1;
                mismatches += 1;
            }
            Verification::NoData => {}
        }
    }

    match (matches, mismatches) {
        (0, 0) => Verification::NoData,
        (_, 0) => Verification::Match,
        (0, _) => Verification::Mismatch,
        _ => Verification::Conflicting,
    }
}
