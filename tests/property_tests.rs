use image::{DynamicImage, Rgb, RgbImage};
use imgfit::{
    normalize, search_quality, CompressionRequest, Image, ImageCodec, OutputFormat, Result,
    SizeTargetedEncoder,
};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::HashSet;

/// Strictly increasing size model: `base + q * step` bytes at quality `q`.
fn model_size(base: u64, step: u64, quality: u8) -> u64 {
    base + u64::from(quality) * step
}

/// Highest quality whose modelled size fits, searching the way a caller
/// would expect: 100 first, then the range below it.
fn expected_quality(base: u64, step: u64, min_quality: u8, target: u64) -> (u8, bool) {
    (min_quality..=100)
        .rev()
        .find(|&q| model_size(base, step, q) <= target)
        .map(|q| (q, true))
        .unwrap_or((min_quality, false))
}

struct SizedCodec {
    base: u64,
    step: u64,
    lossless_calls: RefCell<usize>,
}

impl ImageCodec for SizedCodec {
    fn encode_jpeg(&self, _image: &Image, quality: u8) -> Result<Vec<u8>> {
        Ok(vec![0; model_size(self.base, self.step, quality) as usize])
    }

    fn encode_lossless(&self, image: &Image) -> Result<Vec<u8>> {
        *self.lossless_calls.borrow_mut() += 1;
        let (w, h) = image.dimensions();
        Ok(vec![0; (w * h) as usize])
    }
}

fn pattern(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 31 % 256) as u8, (y * 17 % 256) as u8, ((x + y) % 256) as u8])
    }))
}

proptest! {
    #[test]
    fn search_picks_highest_fitting_quality(
        base in 0u64..5_000,
        step in 1u64..200,
        min_quality in 1u8..=100,
        target in 0u64..30_000,
    ) {
        let mut probed = Vec::new();
        let outcome = search_quality(min_quality, target, |q| {
            probed.push(q);
            Ok(vec![0; model_size(base, step, q) as usize])
        })
        .unwrap();

        let (quality, fits) = expected_quality(base, step, min_quality, target);
        prop_assert_eq!(outcome.quality, quality);
        prop_assert_eq!(outcome.encoded.len() as u64, model_size(base, step, quality));
        prop_assert_eq!((outcome.encoded.len() as u64) <= target, fits);

        let unique: HashSet<_> = probed.iter().collect();
        prop_assert_eq!(unique.len(), probed.len());
        prop_assert_eq!(outcome.probes, probed.len());
        // q100 plus a bisection of at most 99 values.
        prop_assert!(probed.len() <= 8);
        prop_assert!(probed.iter().all(|&q| q >= min_quality));
    }

    #[test]
    fn result_reports_target_honestly(
        base in 0u64..2_000,
        step in 1u64..50,
        min_quality in 1u8..=100,
        target in 1u64..10_000,
    ) {
        let codec = SizedCodec { base, step, lossless_calls: RefCell::new(0) };
        let encoder = SizeTargetedEncoder::with_codec(codec);
        let image = Image::new(pattern(4, 4), OutputFormat::Jpeg);
        let request = CompressionRequest::new(target, min_quality, OutputFormat::Jpeg).unwrap();

        let result = encoder.encode(&image, &request).unwrap();

        prop_assert_eq!(result.final_size_bytes, result.encoded_bytes.len() as u64);
        prop_assert_eq!(result.met_target, result.final_size_bytes <= target);
        let quality = result.quality_used.unwrap();
        prop_assert!(quality >= min_quality);
        if !result.met_target {
            prop_assert_eq!(quality, min_quality);
        }
    }

    #[test]
    fn png_is_encoded_exactly_once(
        width in 1u32..32,
        height in 1u32..32,
        target in 1u64..2_000,
    ) {
        let codec = SizedCodec { base: 0, step: 1, lossless_calls: RefCell::new(0) };
        let encoder = SizeTargetedEncoder::with_codec(codec);
        let image = Image::new(pattern(width, height), OutputFormat::Png);
        let request = CompressionRequest::new(target, 85, OutputFormat::Png).unwrap();

        let result = encoder.encode(&image, &request).unwrap();

        prop_assert_eq!(*encoder.codec().lossless_calls.borrow(), 1);
        prop_assert_eq!(result.quality_used, None);
        prop_assert_eq!(result.met_target, u64::from(width * height) <= target);
    }

    #[test]
    fn normalize_is_idempotent(
        width in 1u32..24,
        height in 1u32..24,
        code in 1u32..=8,
    ) {
        let image = Image::new(pattern(width, height), OutputFormat::Png).with_orientation(code);

        let once = normalize(image);
        prop_assert_eq!(once.orientation(), Some(1));
        let swapped = matches!(code, 5..=8);
        let expected = if swapped { (height, width) } else { (width, height) };
        prop_assert_eq!(once.dimensions(), expected);

        let pixels = once.pixels().to_rgb8();
        let twice = normalize(once);
        prop_assert_eq!(twice.pixels().to_rgb8(), pixels);
        prop_assert_eq!(twice.orientation(), Some(1));
    }
}
