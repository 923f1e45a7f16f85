// THEORY:
// The `pipeline` module is the top-level API of the converter. It strings the core
// stages together in the order a caller needs them and hands back a single report.
//
// Stage 1: Detection. A decoded buffer that is already monochrome is returned as-is.
// Stage 2: Conversion. Anything else must be a BGR buffer, and is converted with
//          the luminosity method into a new grayscale image.
// Stage 3: Preview. On request, the original and the grayscale image are each fitted
//          inside the display footprint. This stage is separate so callers that only
//          save the output never pay for a resize.
//
// `parallel_pipeline` offers the same contract with the conversion fanned out over a
// worker pool.

use crate::core_modules::converter;
use crate::core_modules::detector;
use crate::core_modules::frame::frame::{ColorImage, DecodedImage, Dimensions, GrayscaleImage, Raster};
use crate::core_modules::resizer::{self, MAX_HEIGHT, MAX_WIDTH};
use crate::error::PipelineError;
use log::info;
use std::borrow::Cow;

const DEFAULT_MIN_ROWS_PER_BAND: u32 = 64;

/// Configuration for the pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Width of the display footprint previews are fitted into.
    pub max_width: u32,
    /// Height of the display footprint previews are fitted into.
    pub max_height: u32,
    /// Number of conversion workers in the parallel pipeline.
    pub worker_count: usize,
    /// Smallest band of rows handed to one worker. Small images stay in one band.
    pub min_rows_per_band: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            worker_count: num_cpus::get(),
            min_rows_per_band: DEFAULT_MIN_ROWS_PER_BAND,
        }
    }
}

impl PipelineConfig {
    pub fn display_bounds(&self) -> Dimensions {
        Dimensions::new(self.max_width, self.max_height)
    }
}

/// The result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionData {
    /// The colour source, handed back so it can still be previewed.
    pub original: ColorImage,
    pub grayscale: GrayscaleImage,
}

/// The primary output of the pipeline for a single image.
#[derive(Debug, Clone)]
pub enum Report {
    /// The input was already monochrome; no conversion was done.
    AlreadyGrayscale(DecodedImage),
    Converted(ConversionData),
}

/// Outcome of the detection stage.
pub(crate) enum Detection {
    AlreadyGrayscale(DecodedImage),
    NeedsConversion(ColorImage),
}

/// The synchronous pipeline.
#[derive(Debug, Clone, Default)]
pub struct GrayscalePipeline {
    config: PipelineConfig,
}

impl GrayscalePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn generate_report(&self, image: DecodedImage) -> Result<Report, PipelineError> {
        match self.detect(image)? {
            Detection::AlreadyGrayscale(image) => Ok(Report::AlreadyGrayscale(image)),
            Detection::NeedsConversion(original) => {
                let grayscale = converter::to_grayscale(&original);
                Ok(Self::converted(original, grayscale))
            }
        }
    }

    /// Fits any buffer inside the configured display footprint.
    pub fn preview<'a, R: Raster + Clone>(&self, image: &'a R) -> Cow<'a, R> {
        resizer::fit_within(image, self.config.display_bounds())
    }

    pub(crate) fn detect(&self, image: DecodedImage) -> Result<Detection, PipelineError> {
        if detector::is_grayscale(&image) {
            info!("{} image is already grayscale; skipping conversion", image.dimensions());
            return Ok(Detection::AlreadyGrayscale(image));
        }
        image
            .into_color()
            .map(Detection::NeedsConversion)
            .map_err(|rejected| PipelineError::UnsupportedChannels(rejected.channels()))
    }

    pub(crate) fn converted(original: ColorImage, grayscale: GrayscaleImage) -> Report {
        info!("converted {} image to grayscale", original.dimensions());
        Report::Converted(ConversionData {
            original,
            grayscale,
        })
    }
}
