// imgfit/src/core/mod.rs
pub mod processor;

use image::{DynamicImage, GenericImageView};
use std::path::PathBuf;
use thiserror::Error;

pub use processor::{FileReport, FileStatus, ImageProcessor};

pub const DEFAULT_TARGET_BYTES: u64 = 19 * 1024 * 1024;
pub const DEFAULT_MIN_QUALITY: u8 = 85;
pub const MAX_QUALITY: u8 = 100;
pub const MAX_DIMENSION: u32 = 100_000;

/// Container the pixels were decoded from, and the one they go back into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
        }
    }
}

/// A decoded raster plus the metadata that travels with it.
///
/// `orientation` holds the raw EXIF code as read at load time, which may be
/// out of the 1..=8 range on malformed files. It is reset to 1 by
/// [`normalize`](crate::normalize).
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) pixels: DynamicImage,
    pub(crate) format: OutputFormat,
    pub(crate) orientation: Option<u32>,
    pub(crate) exif: Option<Vec<u8>>,
    pub(crate) icc_profile: Option<Vec<u8>>,
}

impl Image {
    pub fn new(pixels: DynamicImage, format: OutputFormat) -> Self {
        Self {
            pixels,
            format,
            orientation: None,
            exif: None,
            icc_profile: None,
        }
    }

    pub fn with_orientation(mut self, code: u32) -> Self {
        self.orientation = Some(code);
        self
    }

    pub fn with_exif(mut self, exif: Vec<u8>) -> Self {
        self.exif = Some(exif);
        self
    }

    pub fn with_icc_profile(mut self, icc: Vec<u8>) -> Self {
        self.icc_profile = Some(icc);
        self
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn orientation(&self) -> Option<u32> {
        self.orientation
    }

    pub fn exif(&self) -> Option<&[u8]> {
        self.exif.as_deref()
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionRequest {
    pub target_bytes: u64,
    pub min_quality: u8,
    pub format: OutputFormat,
}

impl CompressionRequest {
    pub fn new(target_bytes: u64, min_quality: u8, format: OutputFormat) -> Result<Self> {
        let request = Self {
            target_bytes,
            min_quality,
            format,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_bytes == 0 {
            return Err(ImgFitError::InvalidRequest(
                "Target size must be greater than zero".to_string(),
            ));
        }

        if self.min_quality == 0 || self.min_quality > MAX_QUALITY {
            return Err(ImgFitError::InvalidRequest(format!(
                "Minimum quality must be between 1 and 100, got {}",
                self.min_quality
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionResult {
    pub encoded_bytes: Vec<u8>,
    /// Set on the JPEG path only.
    pub quality_used: Option<u8>,
    pub met_target: bool,
    pub final_size_bytes: u64,
}

impl CompressionResult {
    pub(crate) fn new(encoded_bytes: Vec<u8>, quality_used: Option<u8>, target_bytes: u64) -> Self {
        let final_size_bytes = encoded_bytes.len() as u64;
        Self {
            encoded_bytes,
            quality_used,
            met_target: final_size_bytes <= target_bytes,
            final_size_bytes,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub compressed: usize,
    pub unmet: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_size_before: u64,
    pub total_size_after: u64,
    pub errors: Vec<(PathBuf, String)>,
}

impl ProcessingStats {
    pub fn total(&self) -> usize {
        self.compressed + self.unmet + self.skipped + self.failed
    }

    /// Percentage saved over the files that were rewritten.
    pub fn savings_percent(&self) -> f64 {
        if self.total_size_before == 0 {
            return 0.0;
        }

        let savings = (self.total_size_before as f64 - self.total_size_after as f64)
            / self.total_size_before as f64
            * 100.0;
        savings.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct SqueezeConfig {
    pub target_bytes: u64,
    pub min_quality: u8,
    pub overwrite: bool,
    pub keep_oversized: bool,
    pub suffix: String,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            target_bytes: DEFAULT_TARGET_BYTES,
            min_quality: DEFAULT_MIN_QUALITY,
            overwrite: false,
            keep_oversized: false,
            suffix: "compressed".to_string(),
        }
    }
}

impl SqueezeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_bytes == 0 {
            return Err(ImgFitError::InvalidParameter(
                "Target size must be greater than zero".to_string(),
            ));
        }

        if self.min_quality == 0 || self.min_quality > MAX_QUALITY {
            return Err(ImgFitError::InvalidParameter(
                "Minimum quality must be between 1 and 100".to_string(),
            ));
        }

        if !self.overwrite && self.suffix.is_empty() {
            return Err(ImgFitError::InvalidParameter(
                "An output suffix is required unless overwriting".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_for(&self, format: OutputFormat) -> Result<CompressionRequest> {
        CompressionRequest::new(self.target_bytes, self.min_quality, format)
    }
}

#[derive(Error, Debug)]
pub enum ImgFitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported orientation code: {0}")]
    UnsupportedOrientationCode(u32),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ImgFitError>;
