//! Database access for lexi-enrich
//!
//! Word tables are owned by the vocabulary application; this crate only
//! needs to read a word's authored facets. `insert_word` and
//! `remove_example` exist for fixtures and maintenance tooling.

pub mod words;

pub use words::{insert_word, load_word, remove_example};
