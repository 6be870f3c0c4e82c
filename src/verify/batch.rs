use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::model::{BatchResult, Claim, ClaimVerdict, SourceVerdict, VerdictStatus};

/// Rolls per-claim source verdicts up into a [`BatchResult`].
///
/// Both maps are keyed by claim text. A claim missing from `sources_by_claim`
/// aggregates over no sources (`unverified`); a claim missing from
/// `processing_times` gets no processing time. Result order follows `claims`.
pub fn aggregate_batch(
    claims: &[Claim],
    sources_by_claim: &HashMap<String, Vec<SourceVerdict>>,
    processing_times: &HashMap<String, f64>,
) -> BatchResult {
    let results: Vec<ClaimVerdict> = claims
        .iter()
        .map(|claim| {
            let sources = sources_by_claim
                .get(&claim.text)
                .cloned()
                .unwrap_or_default();
            let processing_time = processing_times.get(&claim.text).copied();
            ClaimVerdict::from_sources(claim.clone(), sources, processing_time)
        })
        .collect();

    summarize(results)
}

/// Computes batch statistics over already-aggregated verdicts.
pub fn summarize(results: Vec<ClaimVerdict>) -> BatchResult {
    let count = |status: VerdictStatus| results.iter().filter(|r| r.status == status).count();

    let verified: Vec<f64> = results
        .iter()
        .filter(|r| r.status.is_verified())
        .map(|r| r.confidence)
        .collect();

    let average_confidence = if verified.is_empty() {
        0.0
    } else {
        verified.iter().sum::<f64>() / verified.len() as f64
    };

    BatchResult {
        batch_id: Uuid::new_v4(),
        total_claims: results.len(),
        verified_claims: verified.len(),
        conflicting_claims: count(VerdictStatus::Conflicting),
        unverified_claims: count(VerdictStatus::Unverified),
        average_confidence,
        generated_at: Utc::now(),
        results,
    }
}
