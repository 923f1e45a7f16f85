// THEORY:
// The converter applies `Pixel::luminosity` to every cell of a colour image and
// collects the results into a new single-channel image of the same shape.
//
// Each output cell depends on exactly one input cell, so rows are independent.
// `convert_rows` exposes that: it converts a contiguous band of rows and is the unit
// of work the parallel pipeline fans out. `to_grayscale` is the same walk over the
// whole buffer in one pass.

use crate::core_modules::frame::frame::{ColorImage, GrayscaleImage, Raster};
use crate::core_modules::pixel::pixel::{self, Pixel};
use log::debug;
use std::ops::Range;

/// Converts a colour image into a grayscale image of identical dimensions.
pub fn to_grayscale(image: &ColorImage) -> GrayscaleImage {
    debug!("converting {} colour image to grayscale", image.dimensions());
    let data = luminosity_of(image.as_raw());
    GrayscaleImage::from_converted(image.width(), image.height(), data)
}

/// Converts rows `rows.start..rows.end` of `image` and returns their intensities,
/// row-major. Rows past the bottom edge are ignored.
pub fn convert_rows(image: &ColorImage, rows: Range<u32>) -> Vec<u8> {
    let stride = image.row_stride();
    let end = rows.end.min(image.height()) as usize;
    let start = (rows.start as usize).min(end);
    luminosity_of(&image.as_raw()[start * stride..end * stride])
}

fn luminosity_of(bytes: &[u8]) -> Vec<u8> {
    bytes
        .chunks_exact(pixel::CHANNELS)
        .map(|bgr| Pixel::from(bgr).luminosity())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> ColorImage {
        let pixels: Vec<Pixel> = (0..width * height)
            .map(|i| {
                let x = (i % width) as u8;
                let y = (i / width) as u8;
                Pixel::new(x.wrapping_mul(7), y.wrapping_mul(13), x ^ y)
            })
            .collect();
        ColorImage::from_pixels(width, height, &pixels).unwrap()
    }

    #[test]
    fn output_keeps_shape_and_cell_order() {
        let image = gradient(17, 9);
        let gray = to_grayscale(&image);
        assert_eq!(gray.dimensions(), image.dimensions());
        for y in 0..image.height() {
            for x in 0..image.width() {
                assert_eq!(gray.intensity(x, y), image.pixel(x, y).luminosity());
            }
        }
    }

    #[test]
    fn single_pixel_matches_worked_example() {
        let image = ColorImage::from_pixels(1, 1, &[Pixel::new(10, 20, 30)]).unwrap();
        assert_eq!(to_grayscale(&image).as_raw(), &[21]);
    }

    #[test]
    fn non_square_images_are_not_transposed() {
        let image = gradient(4, 2);
        let gray = to_grayscale(&image);
        assert_eq!((gray.width(), gray.height()), (4, 2));
        assert_eq!(gray.row(1)[3], image.pixel(3, 1).luminosity());
    }

    #[test]
    fn degenerate_images_convert_to_empty_grids() {
        for (w, h) in [(0, 0), (6, 0), (0, 4)] {
            let image = ColorImage::from_raw(w, h, Vec::new()).unwrap();
            let gray = to_grayscale(&image);
            assert_eq!((gray.width(), gray.height()), (w, h));
            assert!(gray.as_raw().is_empty());
        }
    }

    #[test]
    fn row_bands_concatenate_to_full_conversion() {
        let image = gradient(11, 10);
        let mut stitched = convert_rows(&image, 0..3);
        stitched.extend(convert_rows(&image, 3..7));
        stitched.extend(convert_rows(&image, 7..10));
        assert_eq!(stitched, to_grayscale(&image).into_raw());
    }

    #[test]
    fn row_bands_clip_to_the_bottom_edge() {
        let image = gradient(3, 2);
        assert_eq!(convert_rows(&image, 1..50).len(), 3);
        assert!(convert_rows(&image, 5..9).is_empty());
    }

    #[test]
    fn already_neutral_images_convert_to_their_own_channel() {
        let image = ColorImage::filled(5, 3, Pixel::new(200, 200, 200));
        assert!(to_grayscale(&image).as_raw().iter().all(|&v| v == 200));
    }
}
