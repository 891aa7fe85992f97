use crate::compressor::{CompressionResult, Compressor};
use crate::constants::PDF_CONTENT_TYPES;
use crate::error::{CompressionError, Result};
use crate::logger::Logger;
use lopdf::Document;
use std::fs;
use std::path::Path;

/// Structural PDF optimizer: drops empty and unreferenced objects, then
/// deflates every stream that is not already filtered.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCompressor {
    logger: Logger,
}

impl PdfCompressor {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Compressor for PdfCompressor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supported_types(&self) -> &[&str] {
        PDF_CONTENT_TYPES
    }

    fn compress(&self, input: &Path, output: &Path) -> Result<CompressionResult> {
        self.logger.verbose(format!(
            "Compressing PDF {} to {}",
            input.display(),
            output.display()
        ));

        let original_size = fs::metadata(input)
            .map_err(|_| CompressionError::FileNotFound(input.to_path_buf()))?
            .len();

        let mut document = Document::load(input)
            .map_err(|e| CompressionError::Pdf(format!("{}: {}", input.display(), e)))?;

        let emptied = document.delete_zero_length_streams();
        let pruned = document.prune_objects();
        document.renumber_objects();
        document.compress();

        self.logger.verbose(format!(
            "Removed {} empty streams and {} unreferenced objects",
            emptied.len(),
            pruned.len()
        ));

        document
            .save(output)
            .map_err(|e| CompressionError::Pdf(format!("{}: {}", output.display(), e)))?;

        let compressed_size = fs::metadata(output)?.len();

        Ok(CompressionResult::new(
            input,
            output,
            original_size,
            compressed_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    fn sample_document() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = b"BT /F1 12 Tf 72 720 Td (squeeze me) Tj ET\n".repeat(200);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        // Never referenced from the catalog.
        doc.add_object(Stream::new(dictionary! {}, b"orphan".repeat(500)));
        doc
    }

    #[test]
    fn test_supported_types() {
        let compressor = PdfCompressor::default();
        assert_eq!(compressor.name(), "pdf");
        assert_eq!(compressor.supported_types(), &["application/pdf"]);
    }

    #[test]
    fn test_compress_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("doc.pdf");
        let output = temp_dir.path().join("compressed_doc.pdf");
        sample_document().save(&input).unwrap();

        let result = PdfCompressor::default().compress(&input, &output).unwrap();

        assert_eq!(result.compressed_path(), output.as_path());
        assert_eq!(result.original_size(), fs::metadata(&input).unwrap().len());
        assert_eq!(result.compressed_size(), fs::metadata(&output).unwrap().len());
        assert!(result.is_positive_savings());
        assert!(Document::load(&output).is_ok());
    }

    #[test]
    fn test_compress_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.pdf");
        let output = temp_dir.path().join("compressed_broken.pdf");
        fs::write(&input, b"%PDF-1.4 this is not really a pdf").unwrap();

        let result = PdfCompressor::default().compress(&input, &output);
        assert!(matches!(result, Err(CompressionError::Pdf(_))));
    }

    #[test]
    fn test_compress_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("absent.pdf");
        let output = temp_dir.path().join("compressed_absent.pdf");

        let result = PdfCompressor::default().compress(&input, &output);
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }
}
