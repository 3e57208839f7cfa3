// exif-cleaner/src/processors/loader.rs
use crate::core::{ExifCleanerError, ImageFile, Result};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

/// An opened source image. The file is read once and both the metadata
/// extractor and the rewriter work from the same bytes.
pub struct SourceImage {
    file: ImageFile,
    bytes: Vec<u8>,
}

impl SourceImage {
    pub fn open(file: &ImageFile) -> Result<Self> {
        log::debug!("Loading image from: {}", file.path().display());

        let bytes = std::fs::read(file.path())?;

        Ok(Self {
            file: file.clone(),
            bytes,
        })
    }

    pub fn file_name(&self) -> String {
        self.file.file_name()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the pixel data. No orientation is applied here.
    pub fn decode(&self) -> Result<DynamicImage> {
        // No decoder for HEIF containers in the image stack.
        if self.file.extension() == "heic" {
            return Err(ExifCleanerError::UnsupportedFormat {
                file: self.file_name(),
                format: "HEIC".to_string(),
            });
        }

        let image = ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()?
            .decode()
            .map_err(|source| ExifCleanerError::CorruptImage {
                file: self.file_name(),
                source,
            })?;

        let (width, height) = image.dimensions();
        log::debug!(
            "Decoded {}: {}x{} pixels, color: {:?}",
            self.file_name(),
            width,
            height,
            image.color()
        );

        Ok(image)
    }
}
