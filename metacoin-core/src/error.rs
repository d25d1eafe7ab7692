//! Error types for the core crate

use thiserror::Error;

/// Core ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
