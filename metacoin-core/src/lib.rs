//! Core MetaCoin data types
//!
//! This crate provides the primitives shared by the market and its front ends:
//! - Account addresses and their hex form
//! - Amount and question identifier aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::*;
pub use types::*;
