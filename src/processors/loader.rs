// imgfit/src/processors/loader.rs
use crate::core::{Image, ImgFitError, OutputFormat, Result, MAX_DIMENSION};
use crate::processors::metadata::MetadataProcessor;
use image::{DynamicImage, GenericImageView, ImageFormat};
use img_parts::{Bytes, DynImage, ImageEXIF, ImageICC};
use std::path::Path;

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((MAX_DIMENSION, MAX_DIMENSION)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn load(&self, path: &Path) -> Result<Image> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;
        let data = std::fs::read(path)?;
        self.load_from_bytes(&data)
    }

    /// Decodes a JPEG or PNG along with its orientation tag, EXIF blob and
    /// ICC profile. Metadata is kept in the container's native encoding.
    pub fn load_from_bytes(&self, data: &[u8]) -> Result<Image> {
        if data.is_empty() {
            return Err(ImgFitError::InvalidParameter("Image data is empty".to_string()));
        }

        let format = self.detect_format(data)?;
        let pixels = image::load_from_memory_with_format(data, image_format(format))
            .map_err(|e| ImgFitError::Decode(format!("Failed to decode image: {}", e)))?;
        self.check_dimensions(&pixels)?;

        let mut image = Image::new(pixels, format);

        match DynImage::from_bytes(Bytes::copy_from_slice(data)) {
            Ok(Some(container)) => {
                if let Some(exif) = container.exif() {
                    let metadata = MetadataProcessor::new();
                    if let Some(code) = metadata.read_orientation(&exif) {
                        image = image.with_orientation(code);
                    }
                    image = image.with_exif(metadata.tiff_payload(&exif).to_vec());
                }
                if let Some(icc) = container.icc_profile() {
                    image = image.with_icc_profile(icc.to_vec());
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Could not read metadata segments, dropping them: {}", e);
            }
        }

        let (width, height) = image.dimensions();
        log::debug!(
            "Loaded {} image: {}x{} pixels, color: {:?}, orientation: {:?}",
            format.label(),
            width,
            height,
            image.pixels().color(),
            image.orientation()
        );

        Ok(image)
    }

    pub fn detect_format(&self, data: &[u8]) -> Result<OutputFormat> {
        match image::guess_format(data) {
            Ok(ImageFormat::Jpeg) => Ok(OutputFormat::Jpeg),
            Ok(ImageFormat::Png) => Ok(OutputFormat::Png),
            Ok(other) => Err(ImgFitError::UnsupportedFormat(format!("{:?}", other))),
            Err(_) => Err(ImgFitError::UnsupportedFormat(
                "unrecognised image data".to_string(),
            )),
        }
    }

    fn check_dimensions(&self, image: &DynamicImage) -> Result<()> {
        if let Some((max_w, max_h)) = self.max_dimensions {
            let (width, height) = image.dimensions();
            if width > max_w || height > max_h {
                return Err(ImgFitError::InvalidParameter(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }
        Ok(())
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ImgFitError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(ImgFitError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Png => ImageFormat::Png,
    }
}
