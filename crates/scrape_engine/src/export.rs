use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use scrape_core::FetchResult;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no results to export")]
    Empty,
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("export directory {0:?} is not a directory")]
    NotADirectory(PathBuf),
}

/// Serializes the whole result log, in completion order, as a pretty JSON array.
pub fn export_json(results: &[FetchResult]) -> Result<String, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }
    Ok(serde_json::to_string_pretty(results)?)
}

/// One result as pretty JSON, for pasting elsewhere.
pub fn result_json(result: &FetchResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("scraper-results-{}.json", at.timestamp_millis())
}

/// Writes the export into `dir` (created if missing) via a temp file and a
/// rename, so readers never see a partial file. Returns the final path.
pub fn write_export(dir: &Path, results: &[FetchResult]) -> Result<PathBuf, ExportError> {
    let json = export_json(results)?;

    if dir.exists() && !dir.is_dir() {
        return Err(ExportError::NotADirectory(dir.to_path_buf()));
    }
    std::fs::create_dir_all(dir)?;

    let target = dir.join(export_file_name(Utc::now()));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|err| ExportError::Io(err.error))?;
    Ok(target)
}
