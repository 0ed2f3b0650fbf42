//! Output module for writing harvest results and reports
//!
//! This module handles:
//! - The ordered record collection and its JSON shape
//! - Writing the document with 4-space indentation, atomically
//! - Recording crawl statistics

mod result;
pub mod stats;

pub use result::{CrawlResult, RECORDS_KEY, RECORD_KEY};
pub use stats::{print_statistics, CrawlStatistics, FailureStage, ItemFailure};

use crate::HarvestError;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Indentation of the written document
const INDENT: &[u8] = b"    ";

/// Renders the result as 4-space indented JSON
pub fn to_json_string(result: &CrawlResult) -> Result<String, HarvestError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    result.serialize(&mut serializer)?;
    buf.push(b'\n');

    String::from_utf8(buf).map_err(|e| {
        HarvestError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Writes the result document to `path`
///
/// The document is written to a sibling temporary file and renamed into
/// place, so readers never observe a half-written file.
///
/// # Arguments
///
/// * `result` - The records to write
/// * `path` - Destination file
pub fn write_json(result: &CrawlResult, path: &Path) -> Result<(), HarvestError> {
    let json = to_json_string(result)?;
    let tmp = temp_path(path);

    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::debug!("Wrote {} record(s) to {}", result.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
