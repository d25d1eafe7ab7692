//! MetaCoin ledger and question market
//!
//! This crate provides the token ledger, escrow-backed questions and the
//! notifications published as questions are asked and answered.

pub mod account;
pub mod config;
pub mod error;
pub mod event;
pub mod market;
pub mod question;
pub mod state;

pub use account::{Account, Ledger};
pub use config::{MarketConfig, DEFAULT_TOTAL_SUPPLY};
pub use error::{MarketError, MarketResult};
pub use event::{EventBus, FailureReason, MarketEvent, Outcome};
pub use market::QuestionMarket;
pub use question::{Question, QuestionView};
pub use state::MarketState;
