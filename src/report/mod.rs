//! Snapshot report output.
//!
//! [`ReportRenderer`] is the seam the monitor calls once per cycle.
//! [`HtmlReportWriter`] either keeps one self-refreshing document up to date
//! or writes a new timestamped document every cycle.

mod html;

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use log::debug;

use crate::cache::EnrichmentCache;
use crate::config::{REPORT_FILE_NAME, REPORT_FILE_SUFFIX};
use crate::models::ConnectionRecord;

pub use html::{escape_html, render_html, RenderOptions, INTERNAL_MARKER};

/// Writes the report for one cycle.
pub trait ReportRenderer {
    /// Renders `connections` with their cached metadata and returns where the
    /// report was written.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the report cannot be written.
    fn render(
        &mut self,
        connections: &[ConnectionRecord],
        cache: &EnrichmentCache,
    ) -> std::io::Result<PathBuf>;
}

/// HTML report files in a directory.
#[derive(Debug, Clone)]
pub struct HtmlReportWriter {
    dir: PathBuf,
    multiple: bool,
    refresh_secs: u64,
}

impl HtmlReportWriter {
    /// `multiple` selects one timestamped file per cycle instead of a single
    /// rolling file that reloads itself every `refresh_secs`.
    pub fn new(dir: impl Into<PathBuf>, multiple: bool, refresh_secs: u64) -> Self {
        Self {
            dir: dir.into(),
            multiple,
            refresh_secs,
        }
    }
}

impl ReportRenderer for HtmlReportWriter {
    fn render(
        &mut self,
        connections: &[ConnectionRecord],
        cache: &EnrichmentCache,
    ) -> std::io::Result<PathBuf> {
        let now = Local::now();
        let (file_name, options) = if self.multiple {
            (
                format!("{}{REPORT_FILE_SUFFIX}", now.format("%Y_%m_%d_%H_%M_%S")),
                RenderOptions::default(),
            )
        } else {
            (
                REPORT_FILE_NAME.to_string(),
                RenderOptions {
                    refresh: Some((self.refresh_secs, REPORT_FILE_NAME.to_string())),
                },
            )
        };

        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(file_name);
        fs::write(&path, render_html(connections, cache, now, &options))?;
        debug!("Report written to {}", path.display());
        Ok(path)
    }
}
