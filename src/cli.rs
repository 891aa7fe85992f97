use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "file-squeeze",
    about = "Compress images and PDFs in place or next to the originals",
    long_about = "file-squeeze walks the given files and directories, detects each file's content type \
                  and hands it to a matching compressor. Images (JPEG, PNG, GIF, BMP, TIFF, WebP) are \
                  re-encoded and downsized, JPEG metadata is carried over, and PDFs are structurally \
                  optimized. Results are written as compressed_<name> next to each original.",
    version,
    after_help = "EXAMPLES:\n  \
    file-squeeze ./photos\n  \
    file-squeeze -v --workers 4 report.pdf ./scans\n  \
    file-squeeze --replace \"./images/*.jpg\""
)]
pub struct Args {
    #[arg(
        help = "Files, directories or glob patterns to compress",
        long_help = "Files, directories or glob patterns to compress. Directories are walked \
                     recursively. A pattern that does not name an existing path is expanded as a glob."
    )]
    pub paths: Vec<PathBuf>,

    #[arg(short = 'v', long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        short = 'j',
        long,
        allow_negative_numbers = true,
        help = "Number of worker threads (default: half the CPUs)",
        long_help = "Number of files compressed concurrently. Values below 1 are raised to 1 \
                     and values above the number of CPUs are lowered to it."
    )]
    pub workers: Option<i64>,

    #[arg(
        short = 'r',
        long,
        help = "Replace original files with their compressed versions",
        long_help = "Replace each original with its compressed version when that version is smaller. \
                     Compressed files that are not smaller are deleted and the original is kept."
    )]
    pub replace: bool,
}
