// imgfit/src/processors/codec.rs
//! The imaging capabilities the encoder and normalizer are written against.
//!
//! [`ImageCodec`] keeps the quality search independent of the library doing
//! the actual pixel work. [`RasterCodec`] is the production implementation:
//! the `image` crate for pixels, `oxipng` for the lossless pass and
//! `img-parts` to carry EXIF and ICC data over into the output container.

use crate::core::{Image, ImgFitError, Result};
use crate::processors::loader::Loader;
use crate::processors::orientation::Orientation;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::DynamicImage;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF, ImageICC};

/// Highest oxipng preset.
const OXIPNG_MAX_PRESET: u8 = 6;

pub trait ImageCodec {
    /// Encode as baseline JPEG at `quality` (1-100).
    fn encode_jpeg(&self, image: &Image, quality: u8) -> Result<Vec<u8>>;

    /// Encode as PNG with the strongest lossless effort available.
    fn encode_lossless(&self, image: &Image) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Image> {
        Loader::new().load_from_bytes(bytes)
    }

    fn apply_orientation(&self, mut pixels: DynamicImage, orientation: Orientation) -> DynamicImage {
        pixels.apply_orientation(orientation);
        pixels
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for RasterCodec {
    fn encode_jpeg(&self, image: &Image, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        image
            .pixels()
            .write_with_encoder(encoder)
            .map_err(|e| ImgFitError::EncodingError(format!("JPEG encode failed: {}", e)))?;

        embed_jpeg_metadata(buffer, image)
    }

    fn encode_lossless(&self, image: &Image) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);
        image
            .pixels()
            .write_with_encoder(encoder)
            .map_err(|e| ImgFitError::EncodingError(format!("PNG encode failed: {}", e)))?;

        let options = oxipng::Options::from_preset(OXIPNG_MAX_PRESET);
        let optimized = oxipng::optimize_from_memory(&buffer, &options)
            .map_err(|e| ImgFitError::EncodingError(format!("PNG optimization failed: {}", e)))?;

        embed_png_metadata(optimized, image)
    }
}

fn embed_jpeg_metadata(encoded: Vec<u8>, image: &Image) -> Result<Vec<u8>> {
    if image.exif().is_none() && image.icc_profile().is_none() {
        return Ok(encoded);
    }

    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded))
        .map_err(|e| ImgFitError::EncodingError(format!("Failed to reparse JPEG: {}", e)))?;
    jpeg.set_exif(image.exif().map(Bytes::copy_from_slice));
    jpeg.set_icc_profile(image.icc_profile().map(Bytes::copy_from_slice));

    let mut output = Vec::new();
    jpeg.encoder()
        .write_to(&mut output)
        .map_err(|e| ImgFitError::EncodingError(format!("Failed to write JPEG metadata: {}", e)))?;
    Ok(output)
}

fn embed_png_metadata(encoded: Vec<u8>, image: &Image) -> Result<Vec<u8>> {
    if image.exif().is_none() && image.icc_profile().is_none() {
        return Ok(encoded);
    }

    let mut png = Png::from_bytes(Bytes::from(encoded))
        .map_err(|e| ImgFitError::EncodingError(format!("Failed to reparse PNG: {}", e)))?;
    png.set_exif(image.exif().map(Bytes::copy_from_slice));
    png.set_icc_profile(image.icc_profile().map(Bytes::copy_from_slice));

    let mut output = Vec::new();
    png.encoder()
        .write_to(&mut output)
        .map_err(|e| ImgFitError::EncodingError(format!("Failed to write PNG metadata: {}", e)))?;
    Ok(output)
}
