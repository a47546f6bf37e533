//! Writing the exported artifact to disk.
//!
//! The exported file is always the raw response bytes, byte for byte. Only
//! the file name is derived from budget metadata.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::{
    error::{EngineError, ResultEngine},
    util::write_private,
};

/// Lowercases the budget name and flattens anything that does not belong in
/// a file name.
pub fn sanitize_budget_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "budget".to_string()
    } else {
        sanitized
    }
}

/// `export-<sanitized-name>-<YYYYMMDD-HHMMSS>.json`
pub fn export_file_name(budget_name: &str, at: DateTime<Local>) -> String {
    format!(
        "export-{}-{}.json",
        sanitize_budget_name(budget_name),
        at.format("%Y%m%d-%H%M%S")
    )
}

/// Per-user downloads location, with a home-relative fallback.
pub fn downloads_dir() -> ResultEngine<PathBuf> {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or_else(|| {
            EngineError::Validation("could not determine a downloads directory".to_string())
        })
}

/// Writes `raw` verbatim into `dir`, owner read/write only.
pub fn write_export_to(
    dir: &Path,
    raw: &[u8],
    budget_name: &str,
    at: DateTime<Local>,
) -> ResultEngine<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(budget_name, at));
    write_private(&path, raw)?;
    Ok(path)
}

/// Writes `raw` into the user's downloads directory.
pub fn write_export(raw: &[u8], budget_name: &str) -> ResultEngine<PathBuf> {
    let dir = downloads_dir()?;
    write_export_to(&dir, raw, budget_name, Local::now())
}
