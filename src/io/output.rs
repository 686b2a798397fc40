//! Output directory handling and run-summary export.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use crate::domain::RunSummary;
use crate::error::{AppError, ErrorKind};

/// Create the charts directory (and parents) if needed.
pub fn prepare_charts_dir(dir: &Path) -> Result<(), AppError> {
    create_dir_all(dir).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create charts directory '{}': {e}", dir.display()),
        )
    })
}

/// PNG file names already present in `dir`, sorted.
///
/// A missing directory simply has no charts.
pub fn existing_charts(dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AppError::new(
                ErrorKind::Io,
                format!("Failed to list '{}': {e}", dir.display()),
            ));
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

/// Write the run summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<PathBuf, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| {
            AppError::new(ErrorKind::Io, format!("Failed to create '{}': {e}", parent.display()))
        })?;
    }

    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write summary JSON: {e}")))?;

    Ok(path.to_path_buf())
}
