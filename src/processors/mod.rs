// imgfit/src/processors/mod.rs
mod batch;
pub mod codec;
pub mod encoder;
mod loader;
pub mod metadata;
pub mod orientation;

pub use batch::BatchProcessor;
pub use codec::{ImageCodec, RasterCodec};
pub use encoder::{encode, search_quality, SearchOutcome, SizeTargetedEncoder};
pub use loader::Loader;
pub use metadata::MetadataProcessor;
pub use orientation::{normalize, normalize_with, orientation_from_exif, Orientation};

pub mod prelude {
    pub use super::{BatchProcessor, Loader, MetadataProcessor, RasterCodec, SizeTargetedEncoder};
}
