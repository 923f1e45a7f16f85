// THEORY:
// Conversion is embarrassingly parallel: every output row depends only on the same
// input row. The parallel pipeline cuts an image into contiguous bands of rows and
// fans them out over a fixed pool of tokio workers.
//
// A single dispatcher hands tasks to workers round-robin. Each task carries a shared
// handle to the source image, its row range and a oneshot sender for the reply.
// Bands are awaited in submission order, so the stitched output is laid out the same
// no matter which worker finishes first. The result is byte-identical to the
// sequential converter.
//
// Workers are spawned onto the ambient runtime, so pools must be created from
// within a Tokio context.

use crate::core_modules::converter;
use crate::core_modules::frame::frame::{ColorImage, DecodedImage, GrayscaleImage, Raster};
use crate::error::PipelineError;
use crate::pipeline::{Detection, GrayscalePipeline, PipelineConfig, Report};
use futures::future::{join_all, try_join_all};
use log::debug;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// One band of rows to convert.
pub struct BandTask {
    pub source: Arc<ColorImage>,
    pub rows: Range<u32>,
    pub result_sender: oneshot::Sender<Vec<u8>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<BandTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one) and their dispatcher.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<BandTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..size)
            .map(|_| mpsc::unbounded_channel::<BandTask>())
            .unzip();

        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        let workers = worker_receivers
            .into_iter()
            .map(|mut worker_receiver| {
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        let BandTask {
                            source,
                            rows,
                            result_sender,
                        } = task;
                        let band = converter::convert_rows(&source, rows);
                        // The source handle must be gone before the reply lands; the
                        // caller unwraps the Arc once every band is in.
                        drop(source);
                        let _ = result_sender.send(band);
                    }
                })
            })
            .collect();

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub async fn convert_band(
        &self,
        source: Arc<ColorImage>,
        rows: Range<u32>,
    ) -> Result<Vec<u8>, PipelineError> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = BandTask {
            source,
            rows: rows.clone(),
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| PipelineError::WorkerPoolClosed)?;

        result_receiver
            .await
            .map_err(|_| PipelineError::WorkerDropped(rows))
    }

    /// Stops accepting work and waits for every worker to drain.
    pub async fn shutdown(self) {
        let WorkerPool {
            task_sender,
            dispatcher,
            workers,
        } = self;
        drop(task_sender);
        let _ = dispatcher.await;
        join_all(workers).await;
    }
}

/// Splits `height` rows into at most `workers` contiguous bands of at least
/// `min_rows` rows each (the last band may be shorter).
fn plan_bands(height: u32, workers: usize, min_rows: u32) -> Vec<Range<u32>> {
    let workers = u32::try_from(workers.max(1)).unwrap_or(u32::MAX);
    let rows_per_band = height.div_ceil(workers).max(min_rows).max(1);
    (0..height)
        .step_by(rows_per_band as usize)
        .map(|start| start..start.saturating_add(rows_per_band).min(height))
        .collect()
}

/// Row-parallel grayscale converter backed by a `WorkerPool`.
pub struct ParallelConverter {
    worker_pool: WorkerPool,
    min_rows_per_band: u32,
}

impl ParallelConverter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            worker_pool: WorkerPool::new(config.worker_count),
            min_rows_per_band: config.min_rows_per_band,
        }
    }

    pub async fn convert(&self, image: Arc<ColorImage>) -> Result<GrayscaleImage, PipelineError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Ok(converter::to_grayscale(&image));
        }

        let bands = plan_bands(height, self.worker_pool.size(), self.min_rows_per_band);
        debug!(
            "converting {} image in {} band(s) over {} worker(s)",
            image.dimensions(),
            bands.len(),
            self.worker_pool.size()
        );

        let pending = bands
            .into_iter()
            .map(|rows| self.worker_pool.convert_band(Arc::clone(&image), rows));
        let outputs = try_join_all(pending).await?;

        Ok(GrayscaleImage::from_converted(width, height, outputs.concat()))
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}

/// `GrayscalePipeline` with the conversion stage fanned out over a worker pool.
pub struct ParallelPipeline {
    pipeline: GrayscalePipeline,
    converter: ParallelConverter,
}

impl ParallelPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let converter = ParallelConverter::new(&config);
        Self {
            pipeline: GrayscalePipeline::new(config),
            converter,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }

    pub async fn generate_report(&self, image: DecodedImage) -> Result<Report, PipelineError> {
        match self.pipeline.detect(image)? {
            Detection::AlreadyGrayscale(image) => Ok(Report::AlreadyGrayscale(image)),
            Detection::NeedsConversion(original) => {
                let shared = Arc::new(original);
                let grayscale = self.converter.convert(Arc::clone(&shared)).await?;
                let original = Arc::try_unwrap(shared).unwrap_or_else(|still_shared| {
                    debug!("source image still shared after conversion; cloning it");
                    (*still_shared).clone()
                });
                Ok(GrayscalePipeline::converted(original, grayscale))
            }
        }
    }

    pub fn preview<'a, R: Raster + Clone>(&self, image: &'a R) -> Cow<'a, R> {
        self.pipeline.preview(image)
    }

    pub async fn shutdown(self) {
        self.converter.shutdown().await;
    }
}
