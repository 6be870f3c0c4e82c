use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verdict::ClaimVerdict;

/// Rolled-up outcome of one verification request.
///
/// `total_claims == verified_claims + conflicting_claims + unverified_claims`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: Uuid,
    /// Same order as the input claims.
    pub results: Vec<ClaimVerdict>,
    pub total_claims: usize,
    /// Claims whose status is `true` or `false`.
    pub verified_claims: usize,
    pub conflicting_claims: usize,
    pub unverified_claims: usize,
    /// Mean confidence over verified claims only; `0.0` when there are none.
    pub average_confidence: f64,
    pub generated_at: DateTime<Utc>,
}
