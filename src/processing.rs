use crate::compressor::{CompressionResult, Compressor};
use crate::constants::{
    IMAGE_CONTENT_TYPES, JPEG_QUALITY, LIBDEFLATER_LEVEL, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION,
    OXIPNG_PRESET,
};
use crate::error::{CompressionError, Result};
use crate::logger::Logger;
use crate::segments::rebuild_with_metadata;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use oxipng::{Deflaters, Options};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Leading bytes read to guess an input's format.
const FORMAT_SNIFF_LEN: usize = 32;

/// Formats the image compressor writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// Maps a decoded input format to the format it is re-encoded as.
    /// Formats without a dedicated encoder path fall back to JPEG.
    pub fn for_input(format: Option<ImageFormat>) -> Self {
        match format {
            Some(ImageFormat::Jpeg) => OutputFormat::Jpeg,
            Some(ImageFormat::Png) => OutputFormat::Png,
            Some(ImageFormat::Gif) => OutputFormat::Gif,
            Some(ImageFormat::Bmp) => OutputFormat::Bmp,
            Some(ImageFormat::Tiff) => OutputFormat::Tiff,
            _ => OutputFormat::Jpeg,
        }
    }

    /// Canonical extension used when the output path has to be adjusted.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        match self {
            OutputFormat::Jpeg => matches!(ext, "jpg" | "jpeg"),
            OutputFormat::Tiff => matches!(ext, "tiff" | "tif"),
            other => ext == other.extension(),
        }
    }
}

/// Matches the extension of an output path to the format actually written.
///
/// # Arguments
/// * `output` - Candidate output path, e.g. `dir/compressed_photo.webp`
/// * `format` - Format the image is re-encoded as
///
/// # Returns
/// * `output` unchanged if its extension (case-insensitive) already names
///   `format`, otherwise `output` with the canonical extension swapped in
pub fn adjust_output_path(output: &Path, format: OutputFormat) -> PathBuf {
    let matches = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format.accepts_extension(&ext.to_lowercase()))
        .unwrap_or(false);

    if matches {
        output.to_path_buf()
    } else {
        output.with_extension(format.extension())
    }
}

/// Re-encodes raster images, downsizing oversized ones and keeping the EXIF
/// block of JPEG inputs.
#[derive(Debug, Clone)]
pub struct ImageCompressor {
    logger: Logger,
}

impl ImageCompressor {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Compressor for ImageCompressor {
    fn name(&self) -> &str {
        "image"
    }

    fn supported_types(&self) -> &[&str] {
        IMAGE_CONTENT_TYPES
    }

    fn output_path(&self, input: &Path, candidate: &Path) -> PathBuf {
        adjust_output_path(candidate, OutputFormat::for_input(sniff_format(input)))
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        self.logger.verbose(format!(
            "Compressing file {} to {}",
            display_name(input),
            display_name(output)
        ));

        let original = read_with_limit(input)?;
        let original_size = original.len() as u64;

        let reader = ImageReader::new(Cursor::new(original.as_slice())).with_guessed_format()?;
        let input_format = reader.format();
        let mut img = reader.decode()?;

        resize_image(&mut img, &self.logger);

        let output_format = OutputFormat::for_input(input_format);
        let output_path = adjust_output_path(output, output_format);

        let mut encoded = encode_image(&img, output_format)?;
        if output_format == OutputFormat::Jpeg && input_format == Some(ImageFormat::Jpeg) {
            encoded = rebuild_with_metadata(&original, &encoded, &self.logger);
        }

        fs::write(&output_path, &encoded)?;
        let compressed_size = fs::metadata(&output_path)?.len();

        self.logger.verbose(format!(
            "Successfully compressed file to {}",
            output_path.display()
        ));

        Ok(CompressionResult::new(
            input,
            output_path,
            original_size,
            compressed_size,
        ))
    }
}

/// Guesses the image format from the leading bytes of `path`, the same way
/// the decoder does. `None` when the file is unreadable or unrecognised.
fn sniff_format(path: &Path) -> Option<ImageFormat> {
    let mut header = Vec::with_capacity(FORMAT_SNIFF_LEN);
    fs::File::open(path)
        .and_then(|file| file.take(FORMAT_SNIFF_LEN as u64).read_to_end(&mut header))
        .ok()?;
    image::guess_format(&header).ok()
}

/// Reads the whole file, refusing anything above `MAX_FILE_SIZE`.
pub fn read_with_limit(path: &Path) -> Result<Vec<u8>> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CompressionError::FileNotFound(path.to_path_buf()),
        _ => CompressionError::Io(e),
    })?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(metadata.len(), MAX_FILE_SIZE));
    }
    Ok(fs::read(path)?)
}

/// Shrinks the image to fit within `MAX_IMAGE_DIMENSION` on both axes,
/// preserving the aspect ratio. Smaller images are left alone.
pub fn resize_image(img: &mut DynamicImage, logger: &Logger) {
    let (width, height) = img.dimensions();
    if width <= MAX_IMAGE_DIMENSION && height <= MAX_IMAGE_DIMENSION {
        return;
    }

    *img = img.resize(
        MAX_IMAGE_DIMENSION,
        MAX_IMAGE_DIMENSION,
        image::imageops::FilterType::Lanczos3,
    );
    logger.verbose(format!(
        "Resized from {}x{} to {}x{}",
        width,
        height,
        img.width(),
        img.height()
    ));
}

/// Encodes a decoded image in the given output format.
///
/// # Arguments
/// * `img` - The (possibly resized) image
/// * `format` - Target format; JPEG uses quality 85, PNG goes through oxipng
///
/// # Returns
/// * `Ok(bytes)` - The encoded file contents
/// * `Err(CompressionError)` - If the encoder or PNG optimisation fails
pub fn encode_image(img: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;

            let mut options = Options::from_preset(OXIPNG_PRESET);
            options.force = true;
            options.deflate = Deflaters::Libdeflater {
                compression: LIBDEFLATER_LEVEL,
            };
            buffer = oxipng::optimize_from_memory(&buffer, &options)
                .map_err(|e| CompressionError::PngOptimization(e.to_string()))?;
        }
        OutputFormat::Gif | OutputFormat::Bmp => {
            let image_format = if format == OutputFormat::Gif {
                ImageFormat::Gif
            } else {
                ImageFormat::Bmp
            };
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut Cursor::new(&mut buffer), image_format)?;
        }
        OutputFormat::Tiff => {
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Tiff)?;
        }
    }

    Ok(buffer)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
