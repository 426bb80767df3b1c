// imgfit/src/processors/encoder.rs
use crate::core::{
    CompressionRequest, CompressionResult, Image, OutputFormat, Result, MAX_QUALITY,
};
use crate::processors::codec::{ImageCodec, RasterCodec};

/// Outcome of a quality search: the chosen quality and its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub quality: u8,
    pub encoded: Vec<u8>,
    /// Number of encodes performed.
    pub probes: usize,
}

/// Finds the highest quality in `min_quality..=100` whose encoding fits in
/// `target_bytes`, calling `probe` at most once per quality.
///
/// Quality 100 is tried first and returned as is when it fits. Otherwise the
/// remaining range is bisected, keeping the highest feasible quality seen.
/// When nothing fits, the `min_quality` encoding is returned and the caller
/// is expected to report the miss.
pub fn search_quality<F>(min_quality: u8, target_bytes: u64, mut probe: F) -> Result<SearchOutcome>
where
    F: FnMut(u8) -> Result<Vec<u8>>,
{
    let fits = |len: usize| len as u64 <= target_bytes;
    let mut probes = 1;

    let top = probe(MAX_QUALITY)?;
    log::debug!("q={:3} -> {} bytes", MAX_QUALITY, top.len());
    if fits(top.len()) {
        return Ok(SearchOutcome {
            quality: MAX_QUALITY,
            encoded: top,
            probes,
        });
    }

    let mut floor = (min_quality == MAX_QUALITY).then_some(top);
    let mut best: Option<(u8, Vec<u8>)> = None;
    let (mut low, mut high) = (min_quality, MAX_QUALITY - 1);

    while low <= high {
        let mid = low + (high - low) / 2;
        let encoded = probe(mid)?;
        probes += 1;
        log::debug!("q={:3} -> {} bytes", mid, encoded.len());

        if fits(encoded.len()) {
            best = Some((mid, encoded));
            low = mid + 1;
        } else {
            if mid == min_quality {
                floor = Some(encoded);
            }
            // mid >= min_quality >= 1
            high = mid - 1;
        }
    }

    let (quality, encoded) = match (best, floor) {
        (Some(found), _) => found,
        (None, Some(encoded)) => (min_quality, encoded),
        (None, None) => {
            probes += 1;
            (min_quality, probe(min_quality)?)
        }
    };

    Ok(SearchOutcome {
        quality,
        encoded,
        probes,
    })
}

/// Encodes an image as small as needed to fit a byte budget.
///
/// JPEG goes through [`search_quality`]; PNG gets a single lossless pass at
/// the codec's strongest setting and simply reports whether it fit.
pub struct SizeTargetedEncoder<C = RasterCodec> {
    codec: C,
}

impl SizeTargetedEncoder<RasterCodec> {
    pub fn new() -> Self {
        Self::with_codec(RasterCodec::new())
    }
}

impl Default for SizeTargetedEncoder<RasterCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> SizeTargetedEncoder<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn encode(&self, image: &Image, request: &CompressionRequest) -> Result<CompressionResult> {
        request.validate()?;

        match request.format {
            OutputFormat::Jpeg => self.encode_jpeg(image, request),
            OutputFormat::Png => self.encode_png(image, request),
        }
    }

    fn encode_jpeg(&self, image: &Image, request: &CompressionRequest) -> Result<CompressionResult> {
        let outcome = search_quality(request.min_quality, request.target_bytes, |quality| {
            self.codec.encode_jpeg(image, quality)
        })?;

        let result = CompressionResult::new(
            outcome.encoded,
            Some(outcome.quality),
            request.target_bytes,
        );
        log::debug!(
            "JPEG search settled on q={} ({} bytes, target {}, {} encodes)",
            outcome.quality,
            result.final_size_bytes,
            request.target_bytes,
            outcome.probes
        );
        Ok(result)
    }

    fn encode_png(&self, image: &Image, request: &CompressionRequest) -> Result<CompressionResult> {
        let encoded = self.codec.encode_lossless(image)?;
        let result = CompressionResult::new(encoded, None, request.target_bytes);
        log::debug!(
            "PNG pass produced {} bytes (target {})",
            result.final_size_bytes,
            request.target_bytes
        );
        Ok(result)
    }
}

/// Encodes `image` with the default codec.
pub fn encode(image: &Image, request: &CompressionRequest) -> Result<CompressionResult> {
    SizeTargetedEncoder::new().encode(image, request)
}
