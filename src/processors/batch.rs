// imgfit/src/processors/batch.rs
use crate::core::{
    FileReport, FileStatus, ImageProcessor, ImgFitError, ProcessingStats, Result, SqueezeConfig,
};
use crate::processors::codec::{ImageCodec, RasterCodec};
use crate::utils::{format_megabytes, is_supported_format};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walks a folder and squeezes every oversized JPEG/PNG in it, one file at
/// a time.
pub struct BatchProcessor<C = RasterCodec> {
    processor: ImageProcessor<C>,
    show_progress: bool,
}

impl BatchProcessor<RasterCodec> {
    pub fn new(config: SqueezeConfig) -> Result<Self> {
        Self::with_codec(config, RasterCodec::new())
    }
}

impl<C: ImageCodec> BatchProcessor<C> {
    pub fn with_codec(config: SqueezeConfig, codec: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            processor: ImageProcessor::with_codec(config, codec),
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn process_directory(&self, input_dir: &Path) -> Result<ProcessingStats> {
        self.validate_paths(input_dir)?;

        let image_paths = self.collect_image_paths(input_dir);
        let mut stats = ProcessingStats::default();

        if image_paths.is_empty() {
            log::warn!("No image files found in {}", input_dir.display());
            return Ok(stats);
        }

        log::info!(
            "Scanning {} ({} images)",
            input_dir.display(),
            image_paths.len()
        );

        let pb = self.create_progress_bar(image_paths.len());

        for path in &image_paths {
            let shown = path.strip_prefix(input_dir).unwrap_or(path);

            match self.processor.process(path) {
                Ok(report) => {
                    emit(
                        &pb,
                        format!(
                            "{} → {}",
                            shown.display(),
                            status_line(&report.status.to_string(), report.final_size)
                        ),
                    );
                    record(&mut stats, &report);
                }
                Err(e) => {
                    let original = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                    emit(
                        &pb,
                        format!(
                            "{} → {}",
                            shown.display(),
                            status_line(&format!("error: {}", e), original)
                        ),
                    );
                    log::debug!("Failed on {}: {:?}", path.display(), e);
                    stats.failed += 1;
                    stats.errors.push((path.clone(), e.to_string()));
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message(format!(
            "{} compressed, {} still big, {} skipped, {} failed ({:.1}% saved)",
            stats.compressed,
            stats.unmet,
            stats.skipped,
            stats.failed,
            stats.savings_percent()
        ));

        Ok(stats)
    }

    pub fn collect_image_paths(&self, input_dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        paths.sort();
        paths
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{msg:.cyan} [{bar:40.cyan/blue}] {percent:>3}% [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message("Compressing");
        pb
    }

    pub fn validate_paths(&self, input_dir: &Path) -> Result<()> {
        if !input_dir.exists() {
            return Err(ImgFitError::InvalidParameter(format!(
                "Folder not found: {}",
                input_dir.display()
            )));
        }

        if !input_dir.is_dir() {
            return Err(ImgFitError::InvalidParameter(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        Ok(())
    }
}

fn record(stats: &mut ProcessingStats, report: &FileReport) {
    match report.status {
        FileStatus::Skipped { .. } => {
            stats.skipped += 1;
            return;
        }
        FileStatus::Compressed { .. } => stats.compressed += 1,
        FileStatus::StillTooLarge { .. } => stats.unmet += 1,
    }

    if report.output.is_some() {
        stats.total_size_before += report.original_size;
        stats.total_size_after += report.final_size;
    }
}

// Hidden bars swallow println.
fn emit(pb: &ProgressBar, line: String) {
    if pb.is_hidden() {
        println!("{}", line);
    } else {
        pb.println(line);
    }
}

fn status_line(label: &str, size: u64) -> String {
    format!("{:<38}{:6.2} MB", label, format_megabytes(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::encoder::tests::ScriptedCodec;
    use image::{DynamicImage, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn populate(dir: &Path) {
        fs::create_dir(dir.join("nested")).unwrap();
        for name in ["a.png", "B.PNG", "nested/c.png"] {
            DynamicImage::ImageRgb8(RgbImage::new(20, 20))
                .save_with_format(dir.join(name), image::ImageFormat::Png)
                .unwrap();
        }
        fs::write(dir.join("notes.txt"), b"not an image").unwrap();
        fs::write(dir.join("broken.jpg"), b"not a jpeg either").unwrap();
    }

    fn batch(target_bytes: u64, png_size: usize) -> BatchProcessor<ScriptedCodec<fn(u8) -> usize>> {
        let config = SqueezeConfig {
            target_bytes,
            ..Default::default()
        };
        let size_at: fn(u8) -> usize = |_| 0;
        let codec = ScriptedCodec::new(size_at).with_png_size(png_size);
        BatchProcessor::with_codec(config, codec)
            .unwrap()
            .with_progress(false)
    }

    #[test]
    fn collects_supported_files_recursively() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());

        let paths = batch(1, 0).collect_image_paths(dir.path());
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(names.len(), 4);
        assert!(names.contains(&PathBuf::from("nested/c.png")));
        assert!(names.contains(&PathBuf::from("B.PNG")));
        assert!(!names.contains(&PathBuf::from("notes.txt")));
    }

    #[test]
    fn failures_are_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());

        let stats = batch(5, 3).process_directory(dir.path()).unwrap();

        assert_eq!(stats.compressed, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].0.ends_with("broken.jpg"));
        assert!(dir.path().join("nested/c_compressed.png").exists());
    }

    #[test]
    fn everything_under_target_is_skipped() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());
        fs::remove_file(dir.path().join("broken.jpg")).unwrap();

        let stats = batch(u64::MAX, 3).process_directory(dir.path()).unwrap();

        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.total_size_before, 0);
    }

    #[test]
    fn missing_folder_is_rejected() {
        let result = batch(1, 0).process_directory(Path::new("no/such/folder"));
        assert!(matches!(result, Err(ImgFitError::InvalidParameter(_))));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SqueezeConfig {
            min_quality: 0,
            ..Default::default()
        };
        assert!(BatchProcessor::new(config).is_err());
    }
}
