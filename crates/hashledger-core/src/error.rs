use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("difficulty of {requested} leading zero hex digits exceeds the {max}-digit hash")]
    DifficultyOutOfRange { requested: u32, max: usize },

    #[error("block hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch { stored: String, computed: String },

    #[error("no nonce with {difficulty} leading zero hex digits within {attempts} attempts")]
    NonceSpaceExhausted { difficulty: u32, attempts: u64 },

    #[error("mining time limit of {limit:?} elapsed after {attempts} attempts")]
    DeadlineElapsed { limit: Duration, attempts: u64 },

    #[error("block index {index} out of range for chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
