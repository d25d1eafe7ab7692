//! Market error types
//!
//! These are hard failures: the request was malformed or unauthorized and
//! nothing was published. Business outcomes such as an unaffordable question
//! are reported through [`crate::Outcome`] instead.

use metacoin_core::{Address, Amount, CoreError, QuestionId};
use thiserror::Error;

/// Market error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    /// Caller is not the market owner
    #[error("Unauthorized: {caller} is not the market owner")]
    Unauthorized { caller: Address },

    /// No question with this id
    #[error("Question id {id} out of range (question count {count})")]
    OutOfRange { id: QuestionId, count: u64 },

    /// Question text was empty
    #[error("Question text must not be empty")]
    EmptyQuestion,

    /// Balance arithmetic overflowed
    #[error("Balance overflow for {address}: {balance} + {amount}")]
    BalanceOverflow {
        address: Address,
        balance: Amount,
        amount: Amount,
    },

    /// Insufficient balance for a direct debit
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    /// Persisted state does not satisfy the ledger invariants
    #[error("Corrupt market state: {0}")]
    CorruptState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Core type error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MarketError {
    fn from(err: toml::de::Error) -> Self {
        MarketError::Config(err.to_string())
    }
}

/// Result type for market operations
pub type MarketResult<T> = Result<T, MarketError>;
