// THEORY:
// The `Pixel` module is the smallest unit of the converter. It is a "dumb" data
// container for one colour sample plus the single heuristic the whole crate is
// built around: luminosity, the perceived brightness of that sample.
//
// Channel order is fixed as (blue, green, red). That is the order decoded buffers
// arrive in, so a pixel can be lifted straight out of a 3-byte slice without any
// shuffling.
//
// Luminosity is the Rec. 601 weighted sum truncated toward zero:
//
//     floor(0.299 * R + 0.587 * G + 0.114 * B)
//
// The weights are scaled by 1000 so the sum is evaluated in integers. For 8-bit
// inputs this is the exact floor of the real-valued formula, and a neutral sample
// (R == G == B) maps back onto itself with no rounding drift.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Intensity = Byte;

    /// Number of interleaved bytes per colour sample.
    pub const CHANNELS: usize = 3;

    const RED_WEIGHT: u32 = 299;
    const GREEN_WEIGHT: u32 = 587;
    const BLUE_WEIGHT: u32 = 114;
    const WEIGHT_SCALE: u32 = 1000;

    /// A "dumb" data container representing a single BGR colour sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The red channel value (0-255).
        pub red: Channel,
    }

    impl Pixel {
        pub fn new(blue: Channel, green: Channel, red: Channel) -> Self {
            Pixel { blue, green, red }
        }

        /// Luminosity (Rec. 601 luma), truncated to an 8-bit intensity.
        #[inline]
        pub fn luminosity(&self) -> Intensity {
            let weighted = RED_WEIGHT * self.red as u32
                + GREEN_WEIGHT * self.green as u32
                + BLUE_WEIGHT * self.blue as u32;
            // The weights sum to WEIGHT_SCALE, so the quotient never exceeds 255.
            (weighted / WEIGHT_SCALE) as Intensity
        }

        /// True when all three channels carry the same value.
        #[inline]
        pub fn is_achromatic(&self) -> bool {
            self.blue == self.green && self.green == self.red
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.blue, pixel.green, pixel.red]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn luminosity_truncates_weighted_sum() {
        // 0.299 * 30 + 0.587 * 20 + 0.114 * 10 = 21.85
        assert_eq!(Pixel::new(10, 20, 30).luminosity(), 21);
    }

    #[test]
    fn luminosity_matches_formula_across_channel_sweep() {
        for red in (0..=255u32).step_by(5) {
            for green in (0..=255u32).step_by(17) {
                for blue in (0..=255u32).step_by(51) {
                    let expected = (299 * red + 587 * green + 114 * blue) / 1000;
                    let pixel = Pixel::new(blue as u8, green as u8, red as u8);
                    assert_eq!(pixel.luminosity() as u32, expected);
                }
            }
        }
    }

    #[test]
    fn luminosity_extremes_stay_in_range() {
        assert_eq!(Pixel::new(0, 0, 0).luminosity(), 0);
        assert_eq!(Pixel::new(255, 255, 255).luminosity(), 255);
        assert_eq!(Pixel::new(0, 0, 255).luminosity(), 76);
        assert_eq!(Pixel::new(0, 255, 0).luminosity(), 149);
        assert_eq!(Pixel::new(255, 0, 0).luminosity(), 29);
    }

    #[test]
    fn neutral_samples_map_onto_themselves() {
        for value in 0..=255u8 {
            let pixel = Pixel::new(value, value, value);
            assert!(pixel.is_achromatic());
            assert_eq!(pixel.luminosity(), value);
        }
    }

    #[test]
    fn bytes_are_read_in_bgr_order() {
        let bytes: &[u8] = &[1, 2, 3];
        let pixel = Pixel::from(bytes);
        assert_eq!(pixel, Pixel { blue: 1, green: 2, red: 3 });
        assert_eq!(<[u8; CHANNELS]>::from(pixel), [1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "Cannot convert 4 bytes into pixel.")]
    fn wrong_channel_count_is_a_contract_violation() {
        let bytes: &[u8] = &[1, 2, 3, 4];
        let _ = Pixel::from(bytes);
    }
}
