//! Error type definitions.
//!
//! This module defines the error types raised at each seam of the pipeline.
//! Only [`InitializationError`] is fatal; everything else degrades inside a
//! single cycle.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Why a geolocation lookup produced no data.
///
/// Every variant is recovered by placeholder substitution; none of them is
/// ever shown to the operator as an error.
#[derive(Error, Debug)]
pub enum ResolutionFailure {
    /// The request never produced a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The provider answered but signalled an error (status code or error body).
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider body could not be decoded.
    #[error("undecodable provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Free-provider fallback is disabled, so primary data is discarded.
    #[error("primary response discarded: free providers are not permitted")]
    CommercialPolicy,
}

impl ResolutionFailure {
    /// Statistics bucket for this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            ResolutionFailure::Transport(_) => FailureKind::Transport,
            ResolutionFailure::Provider(_) => FailureKind::Provider,
            ResolutionFailure::Decode(_) => FailureKind::Decode,
            ResolutionFailure::CommercialPolicy => FailureKind::CommercialPolicy,
        }
    }
}

/// Error types for the persisted enrichment cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading, writing, renaming or deleting the cache file failed.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache contents could not be (de)serialized.
    #[error("Cache format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Error raised when the connection table cannot be read at all.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// None of the connection tables could be read.
    #[error("Failed to read connection table {path}: {source}")]
    Unreadable {
        /// Table that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The platform has no collector implementation.
    #[error("Connection enumeration is not supported on this platform")]
    Unsupported,
}

/// Buckets used to count resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// No response from the provider
    Transport,
    /// The provider refused or reported an error
    Provider,
    /// The response body was not the expected JSON
    Decode,
    /// A free-provider answer was discarded
    CommercialPolicy,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    /// Human-readable label used in the statistics summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "Provider transport error",
            FailureKind::Provider => "Provider signalled error",
            FailureKind::Decode => "Provider response decode error",
            FailureKind::CommercialPolicy => "Discarded by commercial-use policy",
        }
    }
}
