//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the crate logs through
//! the `log` facade only.

mod init;

pub use init::{init_logging, LogTarget, LoggingConfig};
