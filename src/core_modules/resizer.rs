// THEORY:
// The resizer fits an image inside a display footprint without distorting it.
//
// If the image already fits, it is handed back untouched as a borrow. Otherwise a
// single scale factor, the smaller of maxW / W and maxH / H, is applied to both
// axes and the result is floored. The factor is never formed as a float: the
// binding axis is picked by cross-multiplying, it lands exactly on its bound, and
// the other axis is scaled in integer arithmetic. Both axes are clamped to at least
// one pixel so extreme aspect ratios still produce a drawable image.
//
// The actual resampling goes through the `Resample` seam. `AreaResampler`, the
// default, averages each destination cell over its real-valued source footprint,
// weighting every source pixel by how much of it the footprint covers. Every source
// pixel contributes to the output.

use crate::core_modules::frame::frame::{Dimensions, Raster};
use log::{debug, warn};
use std::borrow::Cow;

/// Default display footprint width.
pub const MAX_WIDTH: u32 = 1728;
/// Default display footprint height.
pub const MAX_HEIGHT: u32 = 972;

/// Resampling primitive used to produce the scaled buffer.
pub trait Resample {
    /// Resample `image` to exactly `target`. `target` has both axes >= 1.
    fn resample<R: Raster>(&self, image: &R, target: Dimensions) -> R;
}

/// Area-averaging resampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaResampler;

/// Computes the size `source` must be scaled to in order to fit `bounds`.
/// Returns `None` when `source` already fits.
pub fn target_dimensions(source: Dimensions, bounds: Dimensions) -> Option<Dimensions> {
    if source.fits_within(bounds) {
        return None;
    }

    let (w, h) = (source.width as u64, source.height as u64);
    let (max_w, max_h) = (bounds.width as u64, bounds.height as u64);

    // max_w / w <= max_h / h, rearranged to avoid division.
    let (new_w, new_h) = if max_w * h <= max_h * w {
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    };

    if new_w == 0 || new_h == 0 {
        warn!(
            "scaling {} into {} rounds an axis to zero; clamping to one pixel",
            source, bounds
        );
    }
    Some(Dimensions::new(new_w.max(1) as u32, new_h.max(1) as u32))
}

/// Fits `image` inside `bounds` with the default area resampler.
pub fn fit_within<R: Raster + Clone>(image: &R, bounds: Dimensions) -> Cow<'_, R> {
    fit_within_using(image, bounds, &AreaResampler)
}

/// Fits `image` inside `bounds`, delegating the resampling to `resampler`.
pub fn fit_within_using<'a, R, S>(image: &'a R, bounds: Dimensions, resampler: &S) -> Cow<'a, R>
where
    R: Raster + Clone,
    S: Resample,
{
    match target_dimensions(image.dimensions(), bounds) {
        None => Cow::Borrowed(image),
        Some(target) => {
            debug!("resizing {} to {} to fit {}", image.dimensions(), target, bounds);
            Cow::Owned(resampler.resample(image, target))
        }
    }
}

/// One source index and the share of a destination cell it contributes.
#[derive(Debug, Clone, Copy)]
struct Tap {
    source: usize,
    weight: f32,
}

/// For every destination index on one axis, the source taps covering its footprint.
fn footprint_taps(source_len: u32, target_len: u32) -> Vec<Vec<Tap>> {
    let scale = source_len as f64 / target_len as f64;
    (0..target_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = (start + scale).min(source_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(source_len as usize);
            (first..last)
                .filter_map(|s| {
                    let covered = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (covered > 1e-9).then(|| Tap {
                        source: s,
                        weight: (covered / scale) as f32,
                    })
                })
                .collect()
        })
        .collect()
}

impl Resample for AreaResampler {
    fn resample<R: Raster>(&self, image: &R, target: Dimensions) -> R {
        let channels = image.channels();
        let source = image.dimensions();
        let src = image.as_raw();

        if source.area() == 0 || target.area() == 0 || channels == 0 {
            let data = vec![0; target.area() * channels];
            return image.rebuild(target.width, target.height, data);
        }

        let columns = footprint_taps(source.width, target.width);
        let rows = footprint_taps(source.height, target.height);

        // Horizontal pass: every source row collapsed to the target width.
        let mid_stride = target.width as usize * channels;
        let src_stride = image.row_stride();
        let mut horizontal = vec![0f32; source.height as usize * mid_stride];
        for (src_row, mid_row) in src
            .chunks_exact(src_stride)
            .zip(horizontal.chunks_exact_mut(mid_stride))
        {
            for (x, taps) in columns.iter().enumerate() {
                let cell = &mut mid_row[x * channels..(x + 1) * channels];
                for tap in taps {
                    let sample = &src_row[tap.source * channels..(tap.source + 1) * channels];
                    for (acc, &value) in cell.iter_mut().zip(sample) {
                        *acc += tap.weight * value as f32;
                    }
                }
            }
        }

        // Vertical pass: collapse the intermediate rows to the target height.
        let mut data = vec![0u8; target.area() * channels];
        let mut accumulator = vec![0f32; mid_stride];
        for (out_row, taps) in data.chunks_exact_mut(mid_stride).zip(&rows) {
            accumulator.iter_mut().for_each(|acc| *acc = 0.0);
            for tap in taps {
                let mid_row = &horizontal[tap.source * mid_stride..(tap.source + 1) * mid_stride];
                for (acc, &value) in accumulator.iter_mut().zip(mid_row) {
                    *acc += tap.weight * value;
                }
            }
            for (out, &acc) in out_row.iter_mut().zip(&accumulator) {
                *out = acc.round().clamp(0.0, 255.0) as u8;
            }
        }

        image.rebuild(target.width, target.height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::frame::{ColorImage, DecodedImage, GrayscaleImage};
    use crate::core_modules::pixel::pixel::Pixel;

    fn bounds() -> Dimensions {
        Dimensions::new(MAX_WIDTH, MAX_HEIGHT)
    }

    #[test]
    fn fitting_images_are_returned_as_is() {
        let image = GrayscaleImage::from_raw(100, 50, vec![9; 5000]).unwrap();
        let fitted = fit_within(&image, bounds());
        assert!(matches!(fitted, Cow::Borrowed(_)));
        assert_eq!(fitted.as_ref(), &image);
    }

    #[test]
    fn exact_bounds_count_as_fitting() {
        assert_eq!(target_dimensions(Dimensions::new(1728, 972), bounds()), None);
    }

    #[test]
    fn uhd_frame_scales_to_the_display_footprint() {
        let target = target_dimensions(Dimensions::new(3840, 2160), bounds());
        assert_eq!(target, Some(Dimensions::new(1728, 972)));
    }

    #[test]
    fn tall_images_are_height_bound() {
        // scale = min(1728 / 1000, 972 / 3000) = 0.324
        let target = target_dimensions(Dimensions::new(1000, 3000), bounds());
        assert_eq!(target, Some(Dimensions::new(324, 972)));
    }

    #[test]
    fn wide_images_are_width_bound() {
        // scale = 1728 / 4000 = 0.432; 1500 * 0.432 = 648
        let target = target_dimensions(Dimensions::new(4000, 1500), bounds());
        assert_eq!(target, Some(Dimensions::new(1728, 648)));
    }

    #[test]
    fn only_one_axis_over_still_scales_both() {
        // scale = min(1728 / 800, 972 / 1944) = 0.5
        let target = target_dimensions(Dimensions::new(800, 1944), bounds());
        assert_eq!(target, Some(Dimensions::new(400, 972)));
    }

    #[test]
    fn extreme_aspect_ratios_clamp_to_one_pixel() {
        let target = target_dimensions(Dimensions::new(100_000, 2), Dimensions::new(100, 100));
        assert_eq!(target, Some(Dimensions::new(100, 1)));
    }

    #[test]
    fn resized_buffers_keep_their_kind() {
        let image = ColorImage::filled(40, 20, Pixel::new(10, 20, 30));
        let fitted = fit_within(&image, Dimensions::new(10, 10));
        assert_eq!(fitted.dimensions(), Dimensions::new(10, 5));
        assert!(fitted.as_raw().chunks_exact(3).all(|bgr| bgr == [10, 20, 30]));

        let decoded = DecodedImage::from_raw(8, 8, 1, vec![77; 64]).unwrap();
        let fitted = fit_within(&decoded, Dimensions::new(4, 4));
        assert_eq!(fitted.channels(), 1);
        assert_eq!(fitted.as_raw(), &[77; 16]);
    }

    #[test]
    fn area_resampling_averages_whole_blocks() {
        #[rustfmt::skip]
        let data = vec![
            0, 10,  100, 100,
            20, 30, 100, 100,
            255, 255, 0, 0,
            255, 255, 0, 4,
        ];
        let image = GrayscaleImage::from_raw(4, 4, data).unwrap();
        let small = AreaResampler.resample(&image, Dimensions::new(2, 2));
        assert_eq!(small.as_raw(), &[15, 100, 255, 1]);
    }

    #[test]
    fn area_resampling_weights_fractional_footprints() {
        // 3 -> 2: each output cell covers 1.5 source cells.
        let image = GrayscaleImage::from_raw(3, 1, vec![0, 90, 180]).unwrap();
        let small = AreaResampler.resample(&image, Dimensions::new(2, 1));
        // (0 * 1 + 90 * 0.5) / 1.5 = 30; (90 * 0.5 + 180 * 1) / 1.5 = 150
        assert_eq!(small.as_raw(), &[30, 150]);
    }

    #[test]
    fn channels_are_averaged_independently() {
        let pixels = [Pixel::new(0, 100, 200), Pixel::new(100, 100, 0)];
        let image = ColorImage::from_pixels(2, 1, &pixels).unwrap();
        let small = AreaResampler.resample(&image, Dimensions::new(1, 1));
        assert_eq!(small.pixel(0, 0), Pixel::new(50, 100, 100));
    }

    #[derive(Default)]
    struct CountingResampler(std::cell::Cell<usize>);

    impl Resample for CountingResampler {
        fn resample<R: Raster>(&self, image: &R, target: Dimensions) -> R {
            self.0.set(self.0.get() + 1);
            AreaResampler.resample(image, target)
        }
    }

    #[test]
    fn resampler_is_only_invoked_when_needed() {
        let resampler = CountingResampler::default();
        let small = GrayscaleImage::from_raw(2, 2, vec![0; 4]).unwrap();
        let large = GrayscaleImage::from_raw(20, 2, vec![0; 40]).unwrap();
        let limit = Dimensions::new(10, 10);

        let _ = fit_within_using(&small, limit, &resampler);
        assert_eq!(resampler.0.get(), 0);
        let resized = fit_within_using(&large, limit, &resampler);
        assert_eq!(resampler.0.get(), 1);
        assert_eq!(resized.dimensions(), Dimensions::new(10, 1));
    }
}
