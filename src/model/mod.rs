//! Claim and verdict records shared by adapters, the coordinator and callers.
//!
//! All records are created once and never mutated afterwards. They serialize
//! with snake_case field and variant names so callers can persist them as-is.

pub mod batch;
pub mod claim;
pub mod verdict;


pub use batch::BatchResult;
pub use claim::Claim;
pub use verdict::{
    ClaimVerdict, Evidence, ResponseMetadata, SourceVerdict, Verification, VerdictStatus,
};
