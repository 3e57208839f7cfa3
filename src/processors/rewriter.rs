// exif-cleaner/src/processors/rewriter.rs
use super::loader::SourceImage;
use crate::core::{ExifCleanerError, Result};
use crate::utils::{file_name_of, format_file_size, write_atomic};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, Pixel};
use oxipng::{optimize_from_memory, Options, StripChunks};
use std::borrow::Cow;
use std::path::Path;

/// EXIF orientation, i.e. the transform that makes the stored pixels upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Values outside 1..=8 are treated as upright.
    pub fn from_exif_value(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => image,
            Orientation::FlipHorizontal => image.fliph(),
            Orientation::Rotate180 => image.rotate180(),
            Orientation::FlipVertical => image.flipv(),
            Orientation::Transpose => image.rotate90().fliph(),
            Orientation::Rotate90 => image.rotate90(),
            Orientation::Transverse => image.rotate270().fliph(),
            Orientation::Rotate270 => image.rotate270(),
        }
    }
}

/// Writes metadata-free copies of source images.
pub struct ImageRewriter {
    jpeg_quality: u8,
    optimize_png: bool,
}

impl ImageRewriter {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            optimize_png: false,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    /// Decodes `source`, makes it upright, copies the pixels into a fresh
    /// buffer and persists it at `destination`. The destination is either
    /// fully written or left untouched.
    pub fn rewrite(
        &self,
        source: &SourceImage,
        orientation: Orientation,
        destination: &Path,
    ) -> Result<()> {
        let image = source.decode()?;
        let format = self.output_format(destination)?;
        let upright = orientation.apply(image);
        let stripped = copy_pixels(&upright);

        log::debug!(
            "Rewriting {} ({:?}) as {:?}",
            source.file_name(),
            orientation,
            format
        );

        let bytes = self.encode(&stripped, format)?;
        self.persist(&bytes, destination)
    }

    pub fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();

        match format {
            ImageFormat::Jpeg => {
                let image = jpeg_compatible(image);
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
                image.write_with_encoder(encoder)?;
            }
            ImageFormat::Png => {
                image.write_with_encoder(PngEncoder::new(&mut buffer))?;
                if self.optimize_png {
                    return self.optimize_png_bytes(&buffer);
                }
            }
            other => {
                return Err(ExifCleanerError::ProcessingError(format!(
                    "No encoder configured for {:?}",
                    other
                )))
            }
        }

        Ok(buffer)
    }

    fn output_format(&self, destination: &Path) -> Result<ImageFormat> {
        match ImageFormat::from_path(destination) {
            Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(format),
            _ => Err(ExifCleanerError::UnsupportedFormat {
                file: file_name_of(destination),
                format: destination
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            }),
        }
    }

    fn optimize_png_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut options = Options::from_preset(2);
        options.strip = StripChunks::Safe;

        optimize_from_memory(data, &options)
            .map_err(|e| ExifCleanerError::ProcessingError(format!("PNG optimization failed: {}", e)))
    }

    fn persist(&self, bytes: &[u8], destination: &Path) -> Result<()> {
        write_atomic(destination, bytes).map_err(|source| ExifCleanerError::Persistence {
            path: destination.to_path_buf(),
            source,
        })?;

        log::info!(
            "Saved image: {} ({})",
            destination.display(),
            format_file_size(bytes.len() as u64)
        );

        Ok(())
    }
}

/// Same color mode and dimensions, pixel for pixel, with nothing else attached.
pub fn copy_pixels(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buffer) => DynamicImage::ImageLuma8(copy_buffer(buffer)),
        DynamicImage::ImageLumaA8(buffer) => DynamicImage::ImageLumaA8(copy_buffer(buffer)),
        DynamicImage::ImageRgb8(buffer) => DynamicImage::ImageRgb8(copy_buffer(buffer)),
        DynamicImage::ImageRgba8(buffer) => DynamicImage::ImageRgba8(copy_buffer(buffer)),
        DynamicImage::ImageLuma16(buffer) => DynamicImage::ImageLuma16(copy_buffer(buffer)),
        DynamicImage::ImageLumaA16(buffer) => DynamicImage::ImageLumaA16(copy_buffer(buffer)),
        DynamicImage::ImageRgb16(buffer) => DynamicImage::ImageRgb16(copy_buffer(buffer)),
        DynamicImage::ImageRgba16(buffer) => DynamicImage::ImageRgba16(copy_buffer(buffer)),
        DynamicImage::ImageRgb32F(buffer) => DynamicImage::ImageRgb32F(copy_buffer(buffer)),
        DynamicImage::ImageRgba32F(buffer) => DynamicImage::ImageRgba32F(copy_buffer(buffer)),
        other => DynamicImage::ImageRgba8(copy_buffer(&other.to_rgba8())),
    }
}

fn copy_buffer<P: Pixel>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (width, height) = source.dimensions();
    let mut stripped = ImageBuffer::new(width, height);
    for (x, y, pixel) in source.enumerate_pixels() {
        stripped.put_pixel(x, y, *pixel);
    }
    stripped
}

// The JPEG encoder only takes 8-bit luma or RGB.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
        ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}
