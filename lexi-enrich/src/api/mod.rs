//! HTTP API handlers for lexi-enrich

pub mod health;
pub mod maintenance;
pub mod words;

pub use health::health_routes;
pub use maintenance::maintenance_routes;
pub use words::word_routes;
