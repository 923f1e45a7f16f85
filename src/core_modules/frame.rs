// THEORY:
// The `Frame` module holds the image buffers every other module reads and writes.
// Like `Pixel`, these are "dumb" data containers: they own a flat, row-major byte
// buffer and know how to index into it, nothing more.
//
// Key architectural principles:
// 1.  **Flat storage**: Each image is one contiguous `Vec<u8>` with interleaved
//     channels, so row `y` starts at `y * width * channels`. Walking a row is a
//     linear scan, which keeps conversion cache friendly.
// 2.  **Immutability by convention**: No transform mutates its input. Every stage
//     borrows a buffer and hands back a new one.
// 3.  **A shared shape**: The `Raster` trait exposes width, height, channel count and
//     raw bytes. The detector and the resizer are written once against it and work
//     on colour, grayscale and freshly decoded buffers alike.
//
// Degenerate shapes (zero width or zero height) are valid. They carry an empty
// buffer and keep their nominal dimensions.

pub mod frame {
    use crate::core_modules::pixel::pixel::{self, Pixel};

    /// A (width, height) pair used for bounds and resize targets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Dimensions {
        pub width: u32,
        pub height: u32,
    }

    impl Dimensions {
        pub fn new(width: u32, height: u32) -> Self {
            Self { width, height }
        }

        /// Number of cells in a grid of this size.
        pub fn area(&self) -> usize {
            self.width as usize * self.height as usize
        }

        /// True when this size is no larger than `bounds` on either axis.
        pub fn fits_within(&self, bounds: Dimensions) -> bool {
            self.width <= bounds.width && self.height <= bounds.height
        }
    }

    impl std::fmt::Display for Dimensions {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}x{}", self.width, self.height)
        }
    }

    /// Common view over every interleaved 8-bit buffer in the crate.
    pub trait Raster: Sized {
        fn width(&self) -> u32;
        fn height(&self) -> u32;
        /// Interleaved bytes per cell.
        fn channels(&self) -> usize;
        /// The row-major backing bytes.
        fn as_raw(&self) -> &[u8];
        /// Rebuild a buffer of the same kind and channel count with new contents.
        /// `data` must hold `width * height * channels()` bytes.
        fn rebuild(&self, width: u32, height: u32, data: Vec<u8>) -> Self;

        fn dimensions(&self) -> Dimensions {
            Dimensions::new(self.width(), self.height())
        }

        /// Bytes between the start of consecutive rows.
        fn row_stride(&self) -> usize {
            self.width() as usize * self.channels()
        }
    }

    fn expected_len(width: u32, height: u32, channels: usize) -> usize {
        width as usize * height as usize * channels
    }

    /// A BGR colour image, three bytes per cell.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ColorImage {
        width: u32,
        height: u32,
        data: Vec<u8>,
    }

    impl ColorImage {
        /// Wrap an interleaved BGR buffer. `None` if the length does not match.
        pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
            (data.len() == expected_len(width, height, pixel::CHANNELS)).then_some(Self {
                width,
                height,
                data,
            })
        }

        /// Build an image from row-major pixels. `None` if the count does not match.
        pub fn from_pixels(width: u32, height: u32, pixels: &[Pixel]) -> Option<Self> {
            let data = pixels
                .iter()
                .flat_map(|p| <[u8; pixel::CHANNELS]>::from(*p))
                .collect();
            Self::from_raw(width, height, data)
        }

        /// A `width x height` image filled with one pixel.
        pub fn filled(width: u32, height: u32, fill: Pixel) -> Self {
            let cells = expected_len(width, height, 1);
            let data = <[u8; pixel::CHANNELS]>::from(fill).repeat(cells);
            Self {
                width,
                height,
                data,
            }
        }

        /// The pixel at column `x`, row `y`. Panics when out of bounds.
        pub fn pixel(&self, x: u32, y: u32) -> Pixel {
            let start = (y as usize * self.width as usize + x as usize) * pixel::CHANNELS;
            Pixel::from(&self.data[start..start + pixel::CHANNELS])
        }

        /// The interleaved bytes of row `y`.
        pub fn row(&self, y: u32) -> &[u8] {
            let stride = self.row_stride();
            let start = y as usize * stride;
            &self.data[start..start + stride]
        }

        pub fn into_raw(self) -> Vec<u8> {
            self.data
        }
    }

    impl Raster for ColorImage {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn channels(&self) -> usize {
            pixel::CHANNELS
        }
        fn as_raw(&self) -> &[u8] {
            &self.data
        }
        fn rebuild(&self, width: u32, height: u32, data: Vec<u8>) -> Self {
            debug_assert_eq!(data.len(), expected_len(width, height, self.channels()));
            Self {
                width,
                height,
                data,
            }
        }
    }

    /// A single-channel intensity image.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct GrayscaleImage {
        width: u32,
        height: u32,
        data: Vec<u8>,
    }

    impl GrayscaleImage {
        pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
            (data.len() == expected_len(width, height, 1)).then_some(Self {
                width,
                height,
                data,
            })
        }

        /// Wraps converter output, which has one byte per source cell by construction.
        pub(crate) fn from_converted(width: u32, height: u32, data: Vec<u8>) -> Self {
            debug_assert_eq!(data.len(), expected_len(width, height, 1));
            Self {
                width,
                height,
                data,
            }
        }

        /// The intensity at column `x`, row `y`. Panics when out of bounds.
        pub fn intensity(&self, x: u32, y: u32) -> u8 {
            self.data[y as usize * self.width as usize + x as usize]
        }

        pub fn row(&self, y: u32) -> &[u8] {
            let start = y as usize * self.width as usize;
            &self.data[start..start + self.width as usize]
        }

        pub fn into_raw(self) -> Vec<u8> {
            self.data
        }
    }

    impl Raster for GrayscaleImage {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn channels(&self) -> usize {
            1
        }
        fn as_raw(&self) -> &[u8] {
            &self.data
        }
        fn rebuild(&self, width: u32, height: u32, data: Vec<u8>) -> Self {
            debug_assert_eq!(data.len(), expected_len(width, height, self.channels()));
            Self {
                width,
                height,
                data,
            }
        }
    }

    /// A buffer as handed over by the codec, with whatever channel count it decoded to.
    /// One channel is luma; three channels are BGR.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DecodedImage {
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    }

    impl DecodedImage {
        pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Option<Self> {
            (data.len() == expected_len(width, height, channels)).then_some(Self {
                width,
                height,
                channels,
                data,
            })
        }

        /// Reinterpret a 3-channel buffer as a colour image.
        /// Any other channel count hands the buffer back unchanged.
        pub fn into_color(self) -> Result<ColorImage, DecodedImage> {
            if self.channels != pixel::CHANNELS {
                return Err(self);
            }
            Ok(ColorImage {
                width: self.width,
                height: self.height,
                data: self.data,
            })
        }

        pub fn into_raw(self) -> Vec<u8> {
            self.data
        }
    }

    impl Raster for DecodedImage {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn channels(&self) -> usize {
            self.channels
        }
        fn as_raw(&self) -> &[u8] {
            &self.data
        }
        fn rebuild(&self, width: u32, height: u32, data: Vec<u8>) -> Self {
            debug_assert_eq!(data.len(), expected_len(width, height, self.channels));
            Self {
                width,
                height,
                channels: self.channels,
                data,
            }
        }
    }

    impl From<ColorImage> for DecodedImage {
        fn from(image: ColorImage) -> Self {
            DecodedImage {
                width: image.width,
                height: image.height,
                channels: pixel::CHANNELS,
                data: image.data,
            }
        }
    }

    impl From<GrayscaleImage> for DecodedImage {
        fn from(image: GrayscaleImage) -> Self {
            DecodedImage {
                width: image.width,
                height: image.height,
                channels: 1,
                data: image.data,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::frame::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn from_raw_rejects_mismatched_lengths() {
        assert!(ColorImage::from_raw(2, 2, vec![0; 11]).is_none());
        assert!(ColorImage::from_raw(2, 2, vec![0; 12]).is_some());
        assert!(GrayscaleImage::from_raw(3, 2, vec![0; 5]).is_none());
        assert!(DecodedImage::from_raw(2, 1, 4, vec![0; 8]).is_some());
    }

    #[test]
    fn pixels_are_addressed_row_major() {
        let pixels: Vec<Pixel> = (0..6u8).map(|i| Pixel::new(i, i + 10, i + 20)).collect();
        let image = ColorImage::from_pixels(3, 2, &pixels).unwrap();
        assert_eq!(image.pixel(0, 0), Pixel::new(0, 10, 20));
        assert_eq!(image.pixel(2, 0), Pixel::new(2, 12, 22));
        assert_eq!(image.pixel(0, 1), Pixel::new(3, 13, 23));
        assert_eq!(image.row(1), &[3, 13, 23, 4, 14, 24, 5, 15, 25]);
    }

    #[test]
    fn degenerate_shapes_keep_their_dimensions() {
        let image = ColorImage::from_raw(5, 0, Vec::new()).unwrap();
        assert_eq!(image.dimensions(), Dimensions::new(5, 0));
        assert!(image.as_raw().is_empty());
    }

    #[test]
    fn decoded_buffers_only_become_colour_with_three_channels() {
        let color = DecodedImage::from_raw(1, 1, 3, vec![1, 2, 3]).unwrap();
        assert_eq!(color.into_color().unwrap().pixel(0, 0), Pixel::new(1, 2, 3));

        let luma = DecodedImage::from_raw(1, 1, 1, vec![7]).unwrap();
        let rejected = luma.into_color().unwrap_err();
        assert_eq!(rejected.channels(), 1);
    }

    #[test]
    fn dimensions_fit_check_is_inclusive() {
        let bounds = Dimensions::new(1728, 972);
        assert!(Dimensions::new(1728, 972).fits_within(bounds));
        assert!(!Dimensions::new(1729, 10).fits_within(bounds));
        assert!(!Dimensions::new(10, 973).fits_within(bounds));
    }
}
