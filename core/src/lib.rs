//! Subscriber product recommendation engine.
//!
//! Loads subscriber and product tables, selects subscribers, asks a hosted
//! model for recommendations and parses its reply into a table and
//! categorised insights.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod export;
pub mod health;
pub mod insights;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod recommendation;
pub mod rng;
pub mod selector;
pub mod store;
pub mod table_scan;
pub mod types;
