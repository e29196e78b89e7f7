//! Server core functionality
//!
//! The TCP listener, session admission, and the per-client command loop.

pub mod core;
pub mod session;

pub use core::Server;
