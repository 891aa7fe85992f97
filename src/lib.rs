pub mod batch;
pub mod classify;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod enumerate;
pub mod error;
pub mod logger;
pub mod pdf;
pub mod processing;
pub mod registry;
pub mod segments;
pub mod summary;
pub mod utils;

pub use batch::{replace_original, Dispatcher, ReplaceOutcome};
pub use classify::{normalize_content_type, Classifier, ContentSniffer};
pub use compressor::{CompressionResult, Compressor};
pub use config::{clamp_workers, Config, WorkerClamp};
pub use enumerate::FileEnumerator;
pub use error::{CompressionError, Result};
pub use logger::Logger;
pub use pdf::PdfCompressor;
pub use processing::{ImageCompressor, OutputFormat};
pub use registry::CompressorRegistry;
pub use segments::{rebuild_with_metadata, splice_exif_segment, Segment, SegmentError, SegmentList};
pub use summary::{ResultAggregator, RunSummary};
pub use utils::{calculate_savings_percent, compressed_output_path, format_file_size};
