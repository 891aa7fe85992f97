use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("PDF optimization error: {0}")]
    Pdf(String),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path has no usable file name: {0}")]
    InvalidFileName(PathBuf),

    #[error("Error accessing path {path}: {source}")]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Failed to remove original file {path}: {source}")]
    RemoveOriginal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Failed to rename compressed file {from} to {to}: {source}. \
         The original file has already been removed"
    )]
    RenameCompressed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to discard compressed file {path}: {source}")]
    DiscardArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(std::io::Error),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
