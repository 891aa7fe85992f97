use crate::compressor::CompressionResult;
use crate::utils::{calculate_savings_percent, format_file_size};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct AggregatorState {
    results: Vec<CompressionResult>,
    skipped: usize,
    failed: Vec<(PathBuf, String)>,
    replaced: usize,
    replace_failures: Vec<(PathBuf, String)>,
}

/// Collects per-file outcomes from concurrent workers.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    state: Mutex<AggregatorState>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, AggregatorState> {
        // A worker that panicked mid-push cannot leave a half-written entry.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_result(&self, result: CompressionResult) {
        self.state().results.push(result);
    }

    /// A file no compressor was registered for.
    pub fn record_skip(&self) {
        self.state().skipped += 1;
    }

    pub fn record_failure(&self, path: &Path, reason: impl fmt::Display) {
        self.state()
            .failed
            .push((path.to_path_buf(), reason.to_string()));
    }

    pub fn record_replaced(&self) {
        self.state().replaced += 1;
    }

    pub fn record_replace_failure(&self, path: &Path, reason: impl fmt::Display) {
        self.state()
            .replace_failures
            .push((path.to_path_buf(), reason.to_string()));
    }

    pub fn summary(&self) -> RunSummary {
        let state = self.state();

        let mut summary = RunSummary {
            total_files: state.results.len(),
            skipped: state.skipped,
            failed: state.failed.len(),
            replaced: state.replaced,
            replace_failures: state.replace_failures.clone(),
            ..RunSummary::default()
        };

        let mut positive_original = 0u64;
        let mut positive_compressed = 0u64;
        for result in &state.results {
            summary.total_original += result.original_size();
            summary.total_compressed += result.compressed_size();
            if result.is_positive_savings() {
                summary.positive_savings += 1;
                summary.total_saved += result.saved_bytes();
                positive_original += result.original_size();
                positive_compressed += result.compressed_size();
            }
        }

        if summary.positive_savings > 0 {
            summary.savings_percent =
                Some(calculate_savings_percent(positive_original, positive_compressed));
        }
        summary
    }
}

/// Totals over one run. `savings_percent` only covers files that actually
/// shrank and is `None` when none did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total_files: usize,
    pub positive_savings: usize,
    pub total_original: u64,
    pub total_compressed: u64,
    pub total_saved: u64,
    pub savings_percent: Option<f64>,
    pub skipped: usize,
    pub failed: usize,
    pub replaced: usize,
    pub replace_failures: Vec<(PathBuf, String)>,
}

impl RunSummary {
    /// True when no file produced a result.
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "No files were compressed.")?;
        } else {
            writeln!(f, "=== Operation Summary ===")?;
            writeln!(f, "Total files processed: {}", self.total_files)?;
            writeln!(f, "Successfully compressed: {}", self.positive_savings)?;
            writeln!(f, "Total original size: {}", format_file_size(self.total_original))?;
            writeln!(
                f,
                "Total compressed size: {}",
                format_file_size(self.total_compressed)
            )?;
            match self.savings_percent {
                Some(percent) => write!(
                    f,
                    "Total savings: {} ({:.2}%)",
                    format_file_size(self.total_saved),
                    percent
                )?,
                None => write!(f, "No space savings achieved.")?,
            }
        }

        if self.skipped > 0 {
            write!(f, "\nSkipped (no compressor): {}", self.skipped)?;
        }
        if self.failed > 0 {
            write!(f, "\nFailed: {}", self.failed)?;
        }
        if self.replaced > 0 {
            write!(f, "\nOriginals replaced: {}", self.replaced)?;
        }
        if !self.replace_failures.is_empty() {
            write!(f, "\nReplace failures: {}", self.replace_failures.len())?;
            for (path, reason) in &self.replace_failures {
                write!(f, "\n  {}: {}", path.display(), reason)?;
            }
        }
        Ok(())
    }
}
