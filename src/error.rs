//! Error types for the codec glue and the conversion pipelines.
//!
//! The pixel transforms themselves cannot fail; everything here comes from reading
//! or writing files, from buffers of the wrong shape, or from the worker pool.

use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing image files.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("image {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension {extension:?} for {}; expected jpg, jpeg or png", path.display())]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("could not read image {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not write image {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("buffer does not hold {width}x{height} cells of {channels} channel(s)")]
    ShapeMismatch {
        width: u32,
        height: u32,
        channels: usize,
    },

    #[error("cannot encode a buffer with {0} channel(s)")]
    UnsupportedChannels(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures inside the conversion pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("expected a 3-channel colour buffer, found {0} channel(s)")]
    UnsupportedChannels(usize),

    #[error("grayscale worker pool is shut down")]
    WorkerPoolClosed,

    #[error("grayscale worker dropped rows {0:?} before replying")]
    WorkerDropped(Range<u32>),
}
