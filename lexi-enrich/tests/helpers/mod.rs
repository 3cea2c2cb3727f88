//! Test Helper Utilities
//!
//! Shared fixtures and mock enrichment sources for lexi-enrich tests

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_sources;

pub use fixtures::{count_rows, fixed_clock, service, test_pool, word_with_example};
pub use mock_sources::{DefinitionSource, FailingSource, SlowSource, StaticSource};
