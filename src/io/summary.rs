//! JSON run summary written next to the results table.

use std::fs::File;
use std::path::Path;

use crate::error::{AppError, EXIT_SCAN_FAILED};
use crate::scan::ScanSummary;

pub fn write_summary_json(path: &Path, summary: &ScanSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_SCAN_FAILED,
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(EXIT_SCAN_FAILED, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
