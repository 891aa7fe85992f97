/// Utility functions for common operations
///
/// Size formatting and savings arithmetic shared by the compression results,
/// the run summary and the dispatcher.
use crate::constants::{COMPRESSED_PREFIX, PROGRESS_SPINNER_TEMPLATE};
use crate::error::{CompressionError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * `"<n> B"` below 1024 bytes, otherwise base-1024 units with two decimals
///   (e.g. `3584` -> `"3.50 KB"`)
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Calculate compression savings as a percentage
///
/// # Returns
/// * Savings as percentage (positive means reduction, negative means increase),
///   `0.0` when the original is empty
pub fn calculate_savings_percent(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

/// Derives `dir(path)/compressed_<basename(path)>`.
pub fn compressed_output_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CompressionError::InvalidFileName(path.to_path_buf()))?;

    let mut output_name = std::ffi::OsString::from(COMPRESSED_PREFIX);
    output_name.push(file_name);

    Ok(match path.parent() {
        Some(parent) => parent.join(output_name),
        None => PathBuf::from(output_name),
    })
}

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(PROGRESS_SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}
