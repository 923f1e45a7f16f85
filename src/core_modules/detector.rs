// THEORY:
// The detector answers one question before any work is done: is this buffer
// already monochrome?
//
// It is deliberately a single-sample heuristic. A one-channel buffer is grayscale.
// A three-channel buffer is judged by its top-left pixel alone: if blue, green and
// red agree there, the whole image is assumed to be neutral. Nothing else is
// scanned. A colour image whose corner happens to be gray is therefore reported as
// grayscale; callers accept that in exchange for an O(1) check.

use crate::core_modules::frame::frame::Raster;
use crate::core_modules::pixel::pixel::{self, Pixel};
use log::debug;

/// Reports whether `image` is already grayscale.
///
/// - 1 channel: always `true`.
/// - 3 channels: `true` iff the three channels of pixel (0, 0) are equal. An empty
///   buffer has no such pixel and reports `false`.
/// - any other channel count: `false`.
pub fn is_grayscale<R: Raster>(image: &R) -> bool {
    let verdict = match image.channels() {
        1 => true,
        pixel::CHANNELS => image
            .as_raw()
            .get(..pixel::CHANNELS)
            .is_some_and(|corner| Pixel::from(corner).is_achromatic()),
        _ => false,
    };
    debug!(
        "{} buffer with {} channel(s) is grayscale: {}",
        image.dimensions(),
        image.channels(),
        verdict
    );
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::frame::{ColorImage, DecodedImage, GrayscaleImage};

    #[test]
    fn single_channel_buffers_are_grayscale() {
        let image = DecodedImage::from_raw(10, 10, 1, vec![42; 100]).unwrap();
        assert!(is_grayscale(&image));
        let gray = GrayscaleImage::from_raw(10, 10, vec![0; 100]).unwrap();
        assert!(is_grayscale(&gray));
    }

    #[test]
    fn neutral_corner_means_grayscale() {
        let image = ColorImage::filled(4, 4, Pixel::new(128, 128, 128));
        assert!(is_grayscale(&image));
    }

    #[test]
    fn coloured_corner_means_colour_regardless_of_the_rest() {
        let mut pixels = vec![Pixel::new(50, 50, 50); 16];
        pixels[0] = Pixel::new(10, 20, 30);
        let image = ColorImage::from_pixels(4, 4, &pixels).unwrap();
        assert!(!is_grayscale(&image));
    }

    #[test]
    fn only_the_corner_is_sampled() {
        // Known false positive: a gray corner on an otherwise colourful image.
        let mut pixels = vec![Pixel::new(0, 0, 255); 9];
        pixels[0] = Pixel::new(7, 7, 7);
        let image = ColorImage::from_pixels(3, 3, &pixels).unwrap();
        assert!(is_grayscale(&image));
    }

    #[test]
    fn other_channel_counts_are_not_grayscale() {
        let two = DecodedImage::from_raw(2, 2, 2, vec![9; 8]).unwrap();
        let four = DecodedImage::from_raw(2, 2, 4, vec![9; 16]).unwrap();
        assert!(!is_grayscale(&two));
        assert!(!is_grayscale(&four));
    }

    #[test]
    fn empty_colour_buffer_has_no_sample() {
        let image = ColorImage::from_raw(0, 3, Vec::new()).unwrap();
        assert!(!is_grayscale(&image));
    }
}
