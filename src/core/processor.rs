// imgfit/src/core/processor.rs
use super::{ImgFitError, OutputFormat, Result, SqueezeConfig};
use crate::processors::{normalize_with, ImageCodec, Loader, RasterCodec, SizeTargetedEncoder};
use crate::utils::{format_megabytes, generate_output_path};
use std::fmt;
use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Already at or under the target, left alone.
    Skipped { target_bytes: u64 },
    Compressed {
        format: OutputFormat,
        quality: Option<u8>,
    },
    StillTooLarge {
        format: OutputFormat,
        quality: Option<u8>,
        written: bool,
    },
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Skipped { target_bytes } => {
                write!(f, "skip (≤{:.2} MB)", format_megabytes(*target_bytes))
            }
            FileStatus::Compressed { format, quality: Some(q) } => {
                write!(f, "{} ✓ (q={})", format.label(), q)
            }
            FileStatus::Compressed { format, quality: None } => write!(f, "{} ✓", format.label()),
            FileStatus::StillTooLarge { format, quality: Some(q), .. } => {
                write!(f, "{} ✗ (≥q{} still big)", format.label(), q)
            }
            FileStatus::StillTooLarge { format, quality: None, .. } => {
                write!(f, "{} ✗ (still big)", format.label())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    /// Where the result was written, if it was.
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    pub original_size: u64,
    /// Size of the written file, or of the original when nothing was written.
    pub final_size: u64,
}

/// Runs one file through load, normalize, encode and persist.
pub struct ImageProcessor<C = RasterCodec> {
    config: SqueezeConfig,
    loader: Loader,
    encoder: SizeTargetedEncoder<C>,
}

impl ImageProcessor<RasterCodec> {
    pub fn new(config: SqueezeConfig) -> Self {
        Self::with_codec(config, RasterCodec::new())
    }
}

impl<C: ImageCodec> ImageProcessor<C> {
    pub fn with_codec(config: SqueezeConfig, codec: C) -> Self {
        Self {
            config,
            loader: Loader::new(),
            encoder: SizeTargetedEncoder::with_codec(codec),
        }
    }

    pub fn config(&self) -> &SqueezeConfig {
        &self.config
    }

    /// Output location under the overwrite/suffix policy.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        if self.config.overwrite {
            input.to_path_buf()
        } else {
            generate_output_path(input, None, &self.config.suffix)
        }
    }

    pub fn process(&self, input: &Path) -> Result<FileReport> {
        let output = self.output_path_for(input);
        self.process_to(input, &output)
    }

    pub fn process_to(&self, input: &Path, output: &Path) -> Result<FileReport> {
        self.validate_input(input)?;

        let original_size = std::fs::metadata(input)?.len();
        let target_bytes = self.config.target_bytes;

        if original_size <= target_bytes {
            log::debug!(
                "Skipping {} ({} bytes, target {})",
                input.display(),
                original_size,
                target_bytes
            );
            return Ok(FileReport {
                input: input.to_path_buf(),
                output: None,
                status: FileStatus::Skipped { target_bytes },
                original_size,
                final_size: original_size,
            });
        }

        let image = self.loader.load(input)?;
        let image = normalize_with(self.encoder.codec(), image);
        let format = image.format();
        let request = self.config.request_for(format)?;
        let result = self.encoder.encode(&image, &request)?;

        let should_write = result.met_target || self.config.keep_oversized;
        if should_write {
            persist(output, &result.encoded_bytes)?;
            log::info!(
                "Saved {} ({} -> {} bytes)",
                output.display(),
                original_size,
                result.final_size_bytes
            );
        } else {
            log::warn!(
                "{} stays over target ({} bytes at best), not written",
                input.display(),
                result.final_size_bytes
            );
        }

        let status = if result.met_target {
            FileStatus::Compressed {
                format,
                quality: result.quality_used,
            }
        } else {
            FileStatus::StillTooLarge {
                format,
                quality: result.quality_used,
                written: should_write,
            }
        };

        Ok(FileReport {
            input: input.to_path_buf(),
            output: should_write.then(|| output.to_path_buf()),
            status,
            original_size,
            final_size: if should_write {
                result.final_size_bytes
            } else {
                original_size
            },
        })
    }

    fn validate_input(&self, input: &Path) -> Result<()> {
        if !input.exists() {
            return Err(ImgFitError::InvalidParameter(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }

        if !input.is_file() {
            return Err(ImgFitError::InvalidParameter(format!(
                "Input path is not a file: {}",
                input.display()
            )));
        }

        Ok(())
    }
}

/// Writes through a temp file in the destination directory, then renames it
/// into place.
fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    if let Some(permissions) = output_permissions(path) {
        file.as_file().set_permissions(permissions)?;
    }
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|e| ImgFitError::Io(e.error))?;
    Ok(())
}

/// An overwritten file keeps its mode. New files get 0644 rather than the
/// temp file's 0600.
fn output_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}
