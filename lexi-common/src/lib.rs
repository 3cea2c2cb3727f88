//! # Lexi Common Library
//!
//! Shared code for the Lexi vocabulary services:
//! - Common error and result types
//! - TOML configuration and root folder resolution
//! - SQLite pool initialization and schema for the enrichment cache

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
