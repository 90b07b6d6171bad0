//! Typed errors for the census core.
//!
//! The binary and the loader wrap these in `anyhow` with context; the core
//! modules return them directly so callers can match on the variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CensusError {
    #[error("A valid status value is required (Alive, Dead, Stump or empty), got {0:?}")]
    InvalidStatus(String),

    #[error("A valid health value is required (Good, Fair, Poor or empty), got {0:?}")]
    InvalidHealth(String),

    #[error("A valid region name is required (one of {allowed}), got {value:?}")]
    InvalidRegion { value: String, allowed: String },

    #[error("Zip code {0} is out of range (00000-99999)")]
    ZipCodeOutOfRange(u32),

    #[error("Field {field} holds an invalid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Collection was modified during iteration")]
    CollectionChanged,

    #[error("Record source has no more lines")]
    EndOfRecords,

    #[error("Invalid record at line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: Box<CensusError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CensusError>;
