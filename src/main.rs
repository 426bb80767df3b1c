use anyhow::{bail, Context};
use clap::Parser;
use imgfit::{
    format_file_size, megabytes_to_bytes, BatchProcessor, Cli, Commands, ImageProcessor, Loader,
    MetadataProcessor, SqueezeConfig, TargetArgs,
};
use log::LevelFilter;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Batch {
            folder,
            target,
            overwrite,
        } => process_batch(folder, target, overwrite),
        Commands::Compress {
            input,
            output,
            target,
        } => process_compress(input, output, target),
        Commands::Info { input } => process_info(input),
    }
}

fn build_config(target: &TargetArgs, overwrite: bool) -> anyhow::Result<SqueezeConfig> {
    let config = SqueezeConfig {
        target_bytes: megabytes_to_bytes(target.target_mb)?,
        min_quality: target.min_quality,
        overwrite,
        keep_oversized: target.keep_oversized,
        ..Default::default()
    };
    config.validate()?;
    Ok(config)
}

fn process_batch(folder: PathBuf, target: TargetArgs, overwrite: bool) -> anyhow::Result<()> {
    if !folder.is_dir() {
        bail!("Folder not found: {}", folder.display());
    }

    let config = build_config(&target, overwrite)?;
    let processor = BatchProcessor::new(config)?;
    let stats = processor
        .process_directory(&folder)
        .with_context(|| format!("Failed to process {}", folder.display()))?;

    println!(
        "\nAll done! {} of {} images compressed, {} still too big, {} skipped, {} failed.",
        stats.compressed,
        stats.total(),
        stats.unmet,
        stats.skipped,
        stats.failed
    );

    Ok(())
}

fn process_compress(
    input: PathBuf,
    output: Option<PathBuf>,
    target: TargetArgs,
) -> anyhow::Result<()> {
    let config = build_config(&target, false)?;
    let processor = ImageProcessor::new(config);
    let output_path = output.unwrap_or_else(|| processor.output_path_for(&input));

    let report = processor
        .process_to(&input, &output_path)
        .with_context(|| format!("Failed to compress {}", input.display()))?;

    println!(
        "{} → {} ({} → {})",
        input.display(),
        report.status,
        format_file_size(report.original_size),
        format_file_size(report.final_size)
    );
    if let Some(written) = report.output {
        println!("Saved to: {}", written.display());
    }

    Ok(())
}

fn process_info(input: PathBuf) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("File does not exist: {}", input.display());
    }

    let loader = Loader::new();
    let metadata_processor = MetadataProcessor::new();

    let file_size = std::fs::metadata(&input)?.len();
    let image = loader
        .load(&input)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    let (width, height) = image.dimensions();

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(file_size));
    println!("Dimensions: {} x {} pixels", width, height);
    println!("Format: {}", image.format().label());
    println!("Color: {:?}", image.pixels().color());
    match image.orientation() {
        Some(code) => println!("Orientation: {}", code),
        None => println!("Orientation: none"),
    }
    println!("Has ICC profile: {}", image.icc_profile().is_some());
    println!("Has EXIF metadata: {}", image.exif().is_some());

    if let Ok(Some(exif)) = metadata_processor.read_metadata(&input) {
        println!();
        print!("{}", metadata_processor.print_metadata(&exif));
    }

    Ok(())
}
