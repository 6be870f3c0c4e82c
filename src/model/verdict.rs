use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::claim::Claim;

/// Closed outcome of one source's check of one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// The source supports the claim.
    Match,
    /// The source contradicts the claim.
    Mismatch,
    /// The source had nothing usable (including every adapter failure).
    NoData,
    /// The source itself disagrees with itself (e.g. mixed reviews).
    Conflicting,
}

impl Verification {
    /// Wire name (`match`, `mismatch`, `no_data`, `conflicting`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Verification::Match => "match",
            Verification::Mismatch => "mismatch",
            Verification::NoData => "no_data",
            Verification::Conflicting => "conflicting",
        }
    }

    /// Returns `true` for anything other than [`Verification::NoData`].
    pub fn has_data(&self) -> bool {
        !matches!(self, Verification::NoData)
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "match" => Ok(Self::Match),
            "mismatch" => Ok(Self::Mismatch),
            "no_data" => Ok(Self::NoData),
            "conflicting" => Ok(Self::Conflicting),
            other => Err(format!("unknown verification value: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// Human-readable explanation, or the error text for failed checks.
    pub summary: String,
    #[serde(default)]
    pub reference_links: Vec<String>,
}

impl Evidence {
    pub fn new(summary: impl Into<String>, reference_links: Vec<String>) -> Self {
        Self {
            summary: summary.into(),
            reference_links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Adapter wall time in seconds.
    pub response_time: f64,
    /// RFC 3339 UTC timestamp of verdict creation.
    pub timestamp: String,
}

impl ResponseMetadata {
    /// Stamps the current time.
    pub fn now(elapsed: Duration) -> Self {
        Self {
            response_time: elapsed.as_secs_f64(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Normalized result of one adapter checking one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVerdict {
    pub source_name: String,
    pub verification: Verification,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub evidence: Evidence,
    pub response_metadata: ResponseMetadata,
}

impl SourceVerdict {
    /// Creates a verdict, clamping `confidence` into `[0, 1]` (NaN becomes 0).
    pub fn new(
        source_name: impl Into<String>,
        verification: Verification,
        confidence: f64,
        evidence: Evidence,
        elapsed: Duration,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            verification,
            confidence: clamp_unit(confidence),
            evidence,
            response_metadata: ResponseMetadata::now(elapsed),
        }
    }

    /// A `no_data` verdict carrying `reason` as its evidence summary.
    pub fn no_data(
        source_name: impl Into<String>,
        reason: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self::new(
            source_name,
            Verification::NoData,
            0.0,
            Evidence::new(reason, Vec::new()),
            elapsed,
        )
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Claim-level outcome across all queried sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    True,
    False,
    Conflicting,
    Unverified,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::True => "true",
            VerdictStatus::False => "false",
            VerdictStatus::Conflicting => "conflicting",
            VerdictStatus::Unverified => "unverified",
        }
    }

    /// `true` and `false` are definitive; the other two are not.
    pub fn is_verified(&self) -> bool {
        matches!(self, VerdictStatus::True | VerdictStatus::False)
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub claim: Claim,
    pub status: VerdictStatus,
    pub confidence: f64,
    pub summary: String,
    pub sources: Vec<SourceVerdict>,
    pub sources_checked: usize,
    pub sources_with_data: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}
