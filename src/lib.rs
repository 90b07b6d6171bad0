//! # tree-census
//!
//! Species popularity queries over a street tree census CSV.
//!
//! ## Architecture
//!
//! - **tokenizer**: Quote-aware splitting of one comma-delimited line into fields
//! - **reader**: Lazy, one-line-at-a-time record reader over any `BufRead`
//! - **species**: Case-insensitive species identity and the deduplicating registry
//! - **trees**: Tree entities, the append-only collection, counting queries and cursor
//! - **region**: The closed set of five regions, built from configuration
//! - **census**: Dataset loading, row validation and load-time region totals
//! - **query**: Keyword matching and per-region aggregation
//! - **report**: Text and JSON rendering of query outcomes
//! - **config**: Configuration file and CLI resolution
//! - **logging**: `tracing` subscriber setup

pub mod census;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod query;
pub mod reader;
pub mod region;
pub mod report;
pub mod species;
pub mod tokenizer;
pub mod trees;

pub use census::{Census, LoadReport};
pub use error::CensusError;
pub use query::{QueryEngine, QueryOutcome, Summary};
