use crate::error::Result;
use crate::utils::calculate_savings_percent;
use std::path::{Path, PathBuf};

/// A content-type specific transform that writes a (hopefully) smaller copy
/// of `input` to `output`.
///
/// Implementations hold no per-call mutable state, so a single instance is
/// shared by every worker of a run and may be invoked concurrently on
/// different files.
pub trait Compressor: Send + Sync {
    /// Short human-readable name used in log lines.
    fn name(&self) -> &str;

    /// Content types this transform handles, e.g. `image/jpeg`.
    fn supported_types(&self) -> &[&str];

    /// The path `compress` will write when asked to write `candidate`,
    /// reported before any byte is written. Transforms that never adjust the
    /// extension keep the default.
    fn output_path(&self, _input: &Path, candidate: &Path) -> PathBuf {
        candidate.to_path_buf()
    }

    /// Compresses `input` into `output`.
    ///
    /// The transform may adjust the extension of `output` to match the format
    /// it actually produced; the returned result carries the real path.
    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult>;
}

/// Outcome of one successful `compress` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionResult {
    original_path: PathBuf,
    compressed_path: PathBuf,
    original_size: u64,
    compressed_size: u64,
}

impl CompressionResult {
    pub fn new(
        original_path: impl Into<PathBuf>,
        compressed_path: impl Into<PathBuf>,
        original_size: u64,
        compressed_size: u64,
    ) -> Self {
        Self {
            original_path: original_path.into(),
            compressed_path: compressed_path.into(),
            original_size,
            compressed_size,
        }
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn compressed_path(&self) -> &Path {
        &self.compressed_path
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// `(original - compressed) / original * 100`, or `0.0` for an empty original.
    pub fn savings_percent(&self) -> f64 {
        calculate_savings_percent(self.original_size, self.compressed_size)
    }

    pub fn is_positive_savings(&self) -> bool {
        self.compressed_size < self.original_size
    }

    /// Bytes saved, zero when the compressed file is not smaller.
    pub fn saved_bytes(&self) -> u64 {
        self.original_size.saturating_sub(self.compressed_size)
    }
}
