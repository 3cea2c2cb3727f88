//! Merge engine
//!
//! Folds source contributions, cached rows and the word's own authored facets
//! into one canonical view per word while keeping a provenance trail for
//! every facet value.
//!
//! Not safe for concurrent merges into the same `CanonicalEnrichment`;
//! contributions fetched in parallel must be folded in on one task.

pub mod aggregate;
pub mod ledger;

pub use aggregate::{CanonicalEnrichment, MergeSummary};
pub use ledger::FacetLedger;
