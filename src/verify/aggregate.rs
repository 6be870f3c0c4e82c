//! Claim-level verdict aggregation.
//!
//! Deterministic reduction of per-source verdicts. The branch order is a
//! tie-break policy:
//!
//! 1. nothing with data            -> `unverified`, 0.0
//! 2. any `conflicting` source     -> `conflicting`, 0.5
//! 3. more matches than mismatches -> `true`, matches / (matches + mismatches)
//! 4. more mismatches than matches -> `false`, mismatches / (matches + mismatches)
//! 5. equal nonzero tallies        -> `conflicting`, 0.5
//!
//! Per-source confidence does not weigh into the tally.

use crate::model::{Claim, ClaimVerdict, SourceVerdict, Verification, VerdictStatus};

pub const SUMMARY_NO_DATA: &str = "no sources provided relevant data";
pub const SUMMARY_CONFLICTING: &str = "sources provided contradictory findings";
pub const SUMMARY_TIED: &str = "equal match/mismatch, so final result is conflicting";

/// Confidence assigned to every `conflicting` outcome.
pub const CONFLICTING_CONFIDENCE: f64 = 0.5;

/// Per-verification counts over a set of source verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub matches: usize,
    pub mismatches: usize,
    pub conflicting: usize,
    pub no_data: usize,
}

impl Tally {
    pub fn of(sources: &[SourceVerdict]) -> Self {
        sources.iter().fold(Self::default(), |mut tally, source| {
            match source.verification {
                Verification::Match => tally.matches += 1,
                Verification::Mismatch => tally.mismatches += 1,
                Verification::Conflicting => tally.conflicting += 1,
                Verification::NoData => tally.no_data += 1,
            }
            tally
        })
    }

    pub fn with_data(&self) -> usize {
        self.matches + self.mismatches + self.conflicting
    }

    pub fn checked(&self) -> usize {
        self.with_data() + self.no_data
    }
}

/// A claim verdict without the claim itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub status: VerdictStatus,
    pub confidence: f64,
    pub summary: String,
    pub sources_checked: usize,
    pub sources_with_data: usize,
}

pub fn aggregate(sources: &[SourceVerdict]) -> Aggregate {
    let tally = Tally::of(sources);
    let (status, confidence, summary) = decide(&tally);

    Aggregate {
        status,
        confidence,
        summary,
        sources_checked: tally.checked(),
        sources_with_data: tally.with_data(),
    }
}

fn decide(tally: &Tally) -> (VerdictStatus, f64, String) {
    let decisive = tally.matches + tally.mismatches;

    if tally.with_data() == 0 {
        return (VerdictStatus::Unverified, 0.0, SUMMARY_NO_DATA.to_string());
    }
    if tally.conflicting > 0 {
        return (
            VerdictStatus::Conflicting,
            CONFLICTING_CONFIDENCE,
            SUMMARY_CONFLICTING.to_string(),
        );
    }

    if tally.matches > tally.mismatches {
        let summary = format!(
            "{} of {} sources with data support this claim",
            tally.matches, decisive
        );
        (
            VerdictStatus::True,
            tally.matches as f64 / decisive as f64,
            summary,
        )
    } else if tally.mismatches > tally.matches {
        let summary = format!(
            "{} of {} sources with data contradict this claim",
            tally.mismatches, decisive
        );
        (
            VerdictStatus::False,
            tally.mismatches as f64 / decisive as f64,
            summary,
        )
    } else {
        (
            VerdictStatus::Conflicting,
            CONFLICTING_CONFIDENCE,
            SUMMARY_TIED.to_string(),
        )
    }
}

impl ClaimVerdict {
    /// Aggregates `sources` into the verdict for `claim`.
    pub fn from_sources(
        claim: Claim,
        sources: Vec<SourceVerdict>,
        processing_time: Option<f64>,
    ) -> Self {
        let Aggregate {
            status,
            confidence,
            summary,
            sources_checked,
            sources_with_data,
        } = aggregate(&sources);

        Self {
            claim,
            status,
            confidence,
            summary,
            sources,
            sources_checked,
            sources_with_data,
            processing_time,
        }
    }
}
