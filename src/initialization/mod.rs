//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - HTTP client for the geolocation providers
//! - DNS resolver for reverse lookups
//! - Provider request rate limiter

mod client;
mod logger;
mod rate_limiter;
mod resolver;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use rate_limiter::{init_rate_limiter, RateLimiter};
pub use resolver::init_resolver;
