//! Verification pipeline: coordinator fan-out, claim aggregation, batch roll-up.
//!
//! [`Verifier`] is the service object callers hold. It exposes the two
//! pipeline operations, [`Verifier::verify_claim`] and
//! [`Verifier::verify_batch`]. The aggregation functions are pure and can be
//! used on source verdicts gathered elsewhere.

pub mod aggregate;
pub mod batch;
pub mod coordinator;


pub use aggregate::{Aggregate, CONFLICTING_CONFIDENCE, Tally, aggregate};
pub use batch::{aggregate_batch, summarize};
pub use coordinator::{Verifier, VerifierConfig};
