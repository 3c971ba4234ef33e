pub mod matcher;
pub mod normalizer;
pub mod party_matcher;
pub mod similarity;
pub mod stats;
pub mod tolerance;

pub use matcher::{reconcile, PhaseOutcome, Reconciler};
pub use normalizer::normalize_table;
pub use stats::statistics;
pub use tolerance::Tolerance;
