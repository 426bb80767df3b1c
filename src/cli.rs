// imgfit/src/cli.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "imgfit",
    version,
    about = "Squeeze oversized JPEG/PNG images under a size budget",
    long_about = "Re-encodes JPEG and PNG files that are larger than a target size so they \
                  fit under it. Pixel resolution is kept, and EXIF orientation is baked into \
                  the pixels. JPEGs get the highest quality that fits; PNGs get a single \
                  maximum-effort lossless pass."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Size goal after compression, in MB
    #[arg(long, default_value_t = 19.0)]
    pub target_mb: f64,

    /// Lowest JPEG quality allowed (1-100)
    #[arg(long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub min_quality: u8,

    /// Write the best attempt even when it is still over the target
    #[arg(long)]
    pub keep_oversized: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a folder recursively and compress every oversized image in it
    Batch {
        /// Folder to scan
        folder: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Replace originals instead of writing *_compressed copies
        #[arg(long)]
        overwrite: bool,
    },

    /// Compress a single image
    Compress {
        /// Input image (JPEG or PNG)
        input: PathBuf,

        /// Output path (default: <name>_compressed.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show size, dimensions, orientation and embedded metadata of an image
    Info {
        /// Image file
        input: PathBuf,
    },
}
