// imgfit/src/utils/mod.rs
use crate::core::{ImgFitError, Result};
use std::path::{Path, PathBuf};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// `<stem>_<suffix>.<ext>` next to the input, unless an explicit output is
/// given.
pub fn generate_output_path(input_path: &Path, output: Option<&Path>, suffix: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = input_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");

            let new_filename = match input_path.extension().and_then(|ext| ext.to_str()) {
                Some(extension) => format!("{}_{}.{}", stem, suffix, extension),
                None => format!("{}_{}", stem, suffix),
            };

            input_path.with_file_name(new_filename)
        }
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn format_megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub fn megabytes_to_bytes(megabytes: f64) -> Result<u64> {
    if !megabytes.is_finite() || megabytes <= 0.0 {
        return Err(ImgFitError::InvalidParameter(format!(
            "Target size must be a positive number of MB, got {}",
            megabytes
        )));
    }

    let bytes = (megabytes * BYTES_PER_MB).floor();
    if bytes < 1.0 {
        return Err(ImgFitError::InvalidParameter(format!(
            "Target size of {} MB is below one byte",
            megabytes
        )));
    }

    Ok(bytes as u64)
}

pub fn is_supported_format(path: &Path) -> bool {
    matches!(
        get_file_extension(path).as_deref(),
        Some("jpg") | Some("jpeg") | Some("png")
    )
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}
