// imgfit/src/processors/metadata.rs
use crate::core::{ImgFitError, Result};
use exif::{Exif, In, Reader, Tag};
use image::metadata::Orientation;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_PREFIX: &[u8] = b"Exif\0\0";

/// Reads and rewrites the EXIF fields this tool cares about.
///
/// Blobs are raw TIFF structures as stored in a JPEG APP1 segment (with or
/// without the `Exif\0\0` prefix) or a PNG `eXIf` chunk.
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_metadata(&self, path: &Path) -> Result<Option<Exif>> {
        let file = File::open(path)?;
        let mut bufreader = BufReader::new(&file);

        match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => {
                log::debug!("Found EXIF data in {}", path.display());
                Ok(Some(exif))
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found in {}", path.display());
                Ok(None)
            }
            Err(e) => {
                log::warn!("Failed to read EXIF from {}: {}", path.display(), e);
                Err(ImgFitError::Metadata(format!("EXIF read error: {}", e)))
            }
        }
    }

    /// The TIFF structure without the JPEG `Exif\0\0` marker, which
    /// containers add back on write.
    pub fn tiff_payload<'a>(&self, blob: &'a [u8]) -> &'a [u8] {
        strip_prefix(blob)
    }

    /// Raw orientation code from IFD0, whatever its value.
    pub fn read_orientation(&self, blob: &[u8]) -> Option<u32> {
        let tiff = strip_prefix(blob);
        match Reader::new().read_raw(tiff.to_vec()) {
            Ok(exif) => exif
                .get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0)),
            Err(e) => {
                log::debug!("Unreadable EXIF blob, ignoring orientation: {}", e);
                None
            }
        }
    }

    /// Rewrites IFD0's Orientation entry to 1 in place. Returns false when
    /// there is no entry to rewrite: none at all, a non-SHORT entry, or a
    /// value outside 1-8.
    pub fn reset_orientation(&self, blob: &mut [u8]) -> bool {
        let start = if blob.starts_with(EXIF_PREFIX) {
            EXIF_PREFIX.len()
        } else {
            0
        };
        Orientation::remove_from_exif_chunk(&mut blob[start..]).is_some()
    }

    pub fn print_metadata(&self, exif: &Exif) -> String {
        let mut output = String::new();
        output.push_str("=== EXIF Metadata ===\n");

        let common_fields = [
            (Tag::Make, "Camera Make"),
            (Tag::Model, "Camera Model"),
            (Tag::DateTimeOriginal, "Original Date/Time"),
            (Tag::Orientation, "Orientation"),
            (Tag::PixelXDimension, "Pixel Width"),
            (Tag::PixelYDimension, "Pixel Height"),
            (Tag::Software, "Software"),
        ];

        for (tag, label) in &common_fields {
            if let Some(field) = exif.get_field(*tag, In::PRIMARY) {
                let value = field.display_value().with_unit(exif).to_string();
                output.push_str(&format!("{:25}: {}\n", label, value));
            }
        }

        output
    }
}

impl Default for MetadataProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_prefix(blob: &[u8]) -> &[u8] {
    blob.strip_prefix(EXIF_PREFIX).unwrap_or(blob)
}
