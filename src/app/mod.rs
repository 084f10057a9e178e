//! Application plumbing around the monitor loop.
//!
//! This module provides signal handling and shutdown of background tasks.

pub mod shutdown;

// Re-export public API
pub use shutdown::{install_ctrl_c_handler, shutdown_gracefully};
