use std::io;
use thiserror::Error;

/// Failures of a single delivery request
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("File not found")]
    NotFound,

    #[error("Range not satisfiable for file of {length} bytes")]
    RangeNotSatisfiable { length: u64 },

    #[error("Invalid chunk count {0}: must be a positive integer")]
    InvalidChunkCount(String),

    #[error("Invalid delay {0}: must be a non-negative integer")]
    InvalidDelay(String),

    #[error("Failed to read file: {0}")]
    Read(#[from] io::Error),
}
