//! Error handling
//!
//! Defines error types and reply-code mapping for the depot.

pub mod handlers;
pub mod types;

pub use types::*;
