//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, provider endpoints, placeholders)
//! - CLI option types and parsing
//! - The library-level [`Config`]

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Cli, Command, Config, FlushArgs, LogFormat, LogLevel, MonitorArgs};
