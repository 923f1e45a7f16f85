// THEORY:
// This file is the main entry point for the `grayscale_vision` library crate.
// It exposes the pipelines (`GrayscalePipeline`, `ParallelPipeline`) as the
// high-level interface, plus the core transforms for callers that want to drive the
// stages themselves:
//
// - `Pixel::luminosity`: one BGR sample to one intensity.
// - `to_grayscale`: a whole colour image to a new grayscale image.
// - `is_grayscale`: the single-sample "already monochrome?" check.
// - `fit_within`: aspect-preserving downscale into a display footprint.
//
// Decoding and encoding live in `io` and are the only parts of the crate that touch
// the filesystem.

pub mod core_modules;
pub mod error;
pub mod io;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::converter::{convert_rows, to_grayscale};
pub use core_modules::detector::is_grayscale;
pub use core_modules::frame::frame::{ColorImage, DecodedImage, Dimensions, GrayscaleImage, Raster};
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::resizer::{
    fit_within, fit_within_using, target_dimensions, AreaResampler, Resample, MAX_HEIGHT,
    MAX_WIDTH,
};
pub use error::{CodecError, PipelineError};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::{ConversionData, GrayscalePipeline, PipelineConfig, Report};
