#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::path::Path;

/// Deterministic noisy picture. Noise keeps encoded sizes well apart across
/// qualities.
pub fn noise_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x1234_5678;
    RgbImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let n = (state >> 24) as u8;
        Rgb([
            n,
            ((x * 255) / width.max(1)) as u8 ^ (n >> 2),
            ((y * 255) / height.max(1)) as u8,
        ])
    })
}

/// Little-endian TIFF with a single IFD0 Orientation entry of the given
/// field type (3 = SHORT, 4 = LONG).
fn orientation_entry(field_type: u16, value: [u8; 4]) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&field_type.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&value);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff
}

pub fn orientation_tiff(code: u16) -> Vec<u8> {
    let [lo, hi] = code.to_le_bytes();
    orientation_entry(3, [lo, hi, 0, 0])
}

pub fn long_orientation_tiff(code: u32) -> Vec<u8> {
    orientation_entry(4, code.to_le_bytes())
}

/// q100 JPEG of `pixels`, optionally carrying an EXIF blob.
pub fn jpeg_with_exif(pixels: &RgbImage, exif: Option<Vec<u8>>) -> Vec<u8> {
    let mut encoded = Vec::new();
    DynamicImage::ImageRgb8(pixels.clone())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, 100))
        .unwrap();

    let Some(exif) = exif else {
        return encoded;
    };

    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded)).unwrap();
    jpeg.set_exif(Some(Bytes::from(exif)));
    let mut tagged = Vec::new();
    jpeg.encoder().write_to(&mut tagged).unwrap();
    tagged
}

/// q100 JPEG of `pixels`, optionally tagged with an EXIF orientation.
pub fn jpeg_bytes(pixels: &RgbImage, orientation: Option<u16>) -> Vec<u8> {
    jpeg_with_exif(pixels, orientation.map(orientation_tiff))
}

pub fn write_jpeg(path: &Path, pixels: &RgbImage, orientation: Option<u16>) {
    std::fs::write(path, jpeg_bytes(pixels, orientation)).unwrap();
}

pub fn write_png(path: &Path, pixels: &RgbImage) {
    DynamicImage::ImageRgb8(pixels.clone())
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}
