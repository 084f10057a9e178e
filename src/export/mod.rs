//! Cache flush and export.
//!
//! Writes every cached enrichment record as one
//! `ip,hostname,city,region,country,location` line, then removes the cache
//! file so the next monitor run starts from scratch.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use crate::cache::EnrichmentCache;

/// Exports the cache at `cache_path` to `output` and deletes the cache file.
///
/// # Returns
///
/// Returns the number of records exported.
///
/// # Errors
///
/// Fails if the cache file does not exist or cannot be parsed, or if the
/// output cannot be written. The cache file is only deleted after the export
/// has been written completely.
pub fn flush_cache(cache_path: &Path, output: &Path) -> Result<usize> {
    if !cache_path.exists() {
        bail!(
            "Unable to flush cache: no cache file at {}",
            cache_path.display()
        );
    }

    let cache = EnrichmentCache::try_load(cache_path)
        .with_context(|| format!("Failed to read cache file: {}", cache_path.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let mut record_count = 0;
    for (_, record) in cache.iter() {
        writeln!(writer, "{record}")
            .with_context(|| format!("Failed to write to {}", output.display()))?;
        record_count += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write to {}", output.display()))?;

    fs::remove_file(cache_path)
        .with_context(|| format!("Failed to delete cache file: {}", cache_path.display()))?;

    info!(
        "Flushed {record_count} cache entries to {}",
        output.display()
    );
    Ok(record_count)
}
