#![allow(dead_code)]

use file_squeeze::{Classifier, CompressionError, CompressionResult, Compressor, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Three files at the top level and one in `subdir`.
pub fn create_plain_tree(root: &Path) -> Vec<PathBuf> {
    let subdir = root.join("subdir");
    fs::create_dir(&subdir).unwrap();

    let files = vec![
        root.join("one.txt"),
        root.join("two.txt"),
        root.join("three.txt"),
        subdir.join("nested.txt"),
    ];
    for (i, file) in files.iter().enumerate() {
        fs::write(file, format!("plain text file number {}\n", i).repeat(16)).unwrap();
    }
    files
}

/// Classifies every path as the same content type.
pub struct FixedClassifier(pub &'static str);

impl Classifier for FixedClassifier {
    fn classify(&self, _path: &Path) -> String {
        self.0.to_string()
    }
}

/// Reports half the original size without touching the filesystem.
pub struct HalvingCompressor;

impl Compressor for HalvingCompressor {
    fn name(&self) -> &str {
        "halving"
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        let size = fs::metadata(input)?.len();
        Ok(CompressionResult::new(input, output, size, size / 2))
    }
}

/// Writes the first half of the input as the compressed artifact.
pub struct TruncatingCompressor;

impl Compressor for TruncatingCompressor {
    fn name(&self) -> &str {
        "truncate"
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        let data = fs::read(input)?;
        let half = &data[..data.len() / 2];
        fs::write(output, half)?;
        Ok(CompressionResult::new(
            input,
            output,
            data.len() as u64,
            half.len() as u64,
        ))
    }
}

/// Writes a copy that is one byte larger than the input.
pub struct GrowingCompressor;

impl Compressor for GrowingCompressor {
    fn name(&self) -> &str {
        "grow"
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        let mut data = fs::read(input)?;
        let original_size = data.len() as u64;
        data.push(b'\n');
        fs::write(output, &data)?;
        Ok(CompressionResult::new(
            input,
            output,
            original_size,
            data.len() as u64,
        ))
    }
}

/// Fails for any file whose name contains `bad`, halves everything else.
pub struct PickyCompressor;

impl Compressor for PickyCompressor {
    fn name(&self) -> &str {
        "picky"
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        if name.contains("bad") {
            return Err(CompressionError::FileNotFound(input.to_path_buf()));
        }
        HalvingCompressor.compress(input, output)
    }
}

/// Panics on any file whose name contains `bad`, truncates everything else.
pub struct PanickingCompressor;

impl Compressor for PanickingCompressor {
    fn name(&self) -> &str {
        "panicking"
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        if name.contains("bad") {
            panic!("corrupt input: {}", name);
        }
        TruncatingCompressor.compress(input, output)
    }
}

fn marker_segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, marker];
    bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// APP1 EXIF segment wrapping `body`.
pub fn exif_segment(body: &[u8]) -> Vec<u8> {
    let mut payload = EXIF_SIGNATURE.to_vec();
    payload.extend_from_slice(body);
    marker_segment(0xE1, &payload)
}

/// A structurally valid (not decodable) JPEG byte stream: SOI, JFIF APP0,
/// the optional `extra` segments, a DQT, SOS with scan data, EOI.
pub fn jpeg_bytes(extra: &[Vec<u8>], scan: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend(marker_segment(
        0xE0,
        &[b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 72, 0, 72, 0, 0],
    ));
    for segment in extra {
        bytes.extend_from_slice(segment);
    }
    bytes.extend(marker_segment(0xDB, &[0u8; 65]));
    bytes.extend(marker_segment(0xDA, &[1, 1, 0, 0, 63, 0]));
    bytes.extend_from_slice(scan);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// Number of occurrences of `needle`, overlaps included.
pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}
