//! `mdrecon-recon` — Exact and fuzzy reconciliation of master data.
//!
//! Pure engine crate: receives loaded tables or value lists, returns
//! classified results. No IO.

pub mod config;
mod dedupe;
pub mod error;
pub mod hash;
pub mod matcher;
pub mod model;
pub mod scorer;

pub use config::{CompareRequest, FuzzyConfig, HashAlgorithm, HashOptions};
pub use error::ReconError;
pub use hash::HashComparer;
pub use matcher::FuzzyMatcher;
pub use model::{
    CompareResult, CompareTotals, DedupeGroup, DedupeMember, DedupeResult, DedupeTotals, KeepPolicy,
    MatchCandidate, MatchResult, MatchTotals, RecordMatch, RecordStatus, Side,
};
pub use scorer::{BuiltinScorer, SimilarityMethod, SimilarityScorer};
