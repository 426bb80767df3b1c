// imgfit/src/processors/orientation.rs
use crate::core::{Image, ImgFitError, Result};
use crate::processors::codec::{ImageCodec, RasterCodec};
use crate::processors::metadata::MetadataProcessor;
pub use image::metadata::Orientation;

/// EXIF code for an upright image.
pub const IDENTITY_CODE: u32 = 1;

/// Maps an EXIF orientation code to the transform that undoes it.
///
/// Codes follow the EXIF convention:
/// <https://www.impulseadventure.com/photo/exif-orientation.html>
pub fn orientation_from_exif(code: u32) -> Result<Orientation> {
    u8::try_from(code)
        .ok()
        .and_then(Orientation::from_exif)
        .ok_or(ImgFitError::UnsupportedOrientationCode(code))
}

/// Bakes the orientation tag into the pixels with the default codec.
pub fn normalize(image: Image) -> Image {
    normalize_with(&RasterCodec::default(), image)
}

/// Bakes the orientation tag into the pixels and resets the tag to 1, on
/// the image and inside its EXIF blob. Images without a tag come back
/// untouched; an out-of-range tag is logged and treated as a no-op.
///
/// An EXIF blob whose orientation entry cannot be rewritten in place (a
/// LONG entry, or an out-of-range value) is dropped, so the output never
/// carries a stale rotation.
pub fn normalize_with<C: ImageCodec + ?Sized>(codec: &C, mut image: Image) -> Image {
    let Some(code) = image.orientation else {
        return image;
    };

    match orientation_from_exif(code) {
        Ok(Orientation::NoTransforms) => {}
        Ok(orientation) => {
            log::debug!(
                "Applying EXIF orientation {} ({:?}) to {}x{} image",
                code,
                orientation,
                image.pixels.width(),
                image.pixels.height()
            );
            image.pixels = codec.apply_orientation(image.pixels, orientation);
        }
        Err(e) => {
            log::warn!("{}; leaving pixels as they are", e);
        }
    }

    image.orientation = Some(IDENTITY_CODE);

    let metadata = MetadataProcessor::new();
    let stale = match image.exif.as_mut() {
        Some(exif) => {
            !metadata.reset_orientation(exif)
                && metadata
                    .read_orientation(exif)
                    .is_some_and(|left| left != IDENTITY_CODE)
        }
        None => false,
    };
    if stale {
        log::warn!("Orientation entry could not be reset in place; dropping EXIF block");
        image.exif = None;
    }

    image
}
