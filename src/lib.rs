mod cli;
mod core;
mod processors;
mod utils;

pub use cli::{Cli, Commands, TargetArgs};
pub use crate::core::{
    CompressionRequest, CompressionResult, FileReport, FileStatus, Image, ImageProcessor,
    ImgFitError, OutputFormat, ProcessingStats, Result, SqueezeConfig, DEFAULT_MIN_QUALITY,
    DEFAULT_TARGET_BYTES,
};
pub use processors::{
    encode, normalize, normalize_with, orientation_from_exif, search_quality, BatchProcessor,
    ImageCodec, Loader, MetadataProcessor, Orientation, RasterCodec, SearchOutcome,
    SizeTargetedEncoder,
};
pub use utils::{
    format_file_size, format_megabytes, generate_output_path, is_supported_format,
    megabytes_to_bytes,
};

pub mod prelude {
    pub use crate::{
        encode, normalize, BatchProcessor, CompressionRequest, CompressionResult, Image,
        ImageProcessor, Loader, OutputFormat, SizeTargetedEncoder, SqueezeConfig,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
