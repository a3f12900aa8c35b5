//! LinkCard Common Utilities
//!
//! Shared infrastructure for all LinkCard crates:
//! - Error types and result aliases
//! - Recording clock and the elapsed-seconds ticker
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
