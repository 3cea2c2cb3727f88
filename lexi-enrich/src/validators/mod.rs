//! Post-merge validation
//!
//! Runs on the fully merged word before write-back. Any issue fails the
//! whole `supplement` call and nothing is persisted.

pub mod word_validator;

pub use word_validator::{validate_word, ValidationIssue};
