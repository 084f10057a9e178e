//! Connection table collection.
//!
//! A [`ConnectionSource`] hands the monitor one snapshot of the OS connection
//! table per cycle. On Linux the table comes from `/proc/net`; other
//! platforms get [`UnsupportedCollector`], which fails every snapshot.

mod procfs;

use crate::error_handling::CollectorError;
use crate::models::RawConnection;

pub use procfs::ProcNetCollector;

/// Source of connection table snapshots.
pub trait ConnectionSource {
    /// Returns every socket currently known to the OS.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] when the table cannot be read at all.
    fn snapshot(&mut self) -> Result<Vec<RawConnection>, CollectorError>;
}

/// Collector for platforms without a connection table reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedCollector;

impl ConnectionSource for UnsupportedCollector {
    fn snapshot(&mut self) -> Result<Vec<RawConnection>, CollectorError> {
        Err(CollectorError::Unsupported)
    }
}

/// Returns the collector for the current platform.
#[cfg(target_os = "linux")]
pub fn platform_collector() -> ProcNetCollector {
    ProcNetCollector::new()
}

/// Returns the collector for the current platform.
#[cfg(not(target_os = "linux"))]
pub fn platform_collector() -> UnsupportedCollector {
    UnsupportedCollector
}
