// THEORY (Pixel):
// The `Pixel` is the smallest unit the encoder sees. It is a "dumb" data container
// for the three color channels of one bitmap position. Alpha is dropped on the way
// in: the model was trained on opaque RGB photos and never sees transparency.
//
// Pixels arrive from three places:
// - packed ARGB words (0xAARRGGBB), the layout platform bitmaps hand out,
// - RGB byte triples from a decoded `image::RgbImage`,
// - direct construction in tests.
//
// Normalization lives here because it is a single-pixel transform: each channel is
// divided by 255 to land in [0.0, 1.0]. Nothing in this module looks at neighbors.

pub mod pixel {
    use crate::error::ClassifierError;

    pub type Channel = u8;
    pub type NormalizedChannel = f32;
    pub type PackedArgb = u32;

    /// Divisor that maps an 8-bit channel onto [0.0, 1.0].
    pub const CHANNEL_MAX: NormalizedChannel = 255.0;

    /// A single opaque RGB pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// Unpacks a 0xAARRGGBB word. The alpha byte is discarded.
        #[inline]
        pub const fn from_argb(value: PackedArgb) -> Self {
            Pixel {
                red: ((value >> 16) & 0xFF) as Channel,
                green: ((value >> 8) & 0xFF) as Channel,
                blue: (value & 0xFF) as Channel,
            }
        }

        /// Packs the pixel back into a fully opaque 0xFFRRGGBB word.
        #[inline]
        pub const fn to_argb(self) -> PackedArgb {
            0xFF00_0000
                | ((self.red as PackedArgb) << 16)
                | ((self.green as PackedArgb) << 8)
                | self.blue as PackedArgb
        }

        /// Channels in model order: red, green, blue, each in [0.0, 1.0].
        #[inline]
        pub fn normalized(&self) -> [NormalizedChannel; 3] {
            [
                self.red as NormalizedChannel / CHANNEL_MAX,
                self.green as NormalizedChannel / CHANNEL_MAX,
                self.blue as NormalizedChannel / CHANNEL_MAX,
            ]
        }
    }

    impl TryFrom<&[u8]> for Pixel {
        type Error = ClassifierError;

        /// Reads the first three bytes as R, G, B. Any trailing alpha byte is ignored.
        fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
            match bytes {
                [red, green, blue, ..] => Ok(Pixel::new(*red, *green, *blue)),
                _ => Err(ClassifierError::LengthMismatch {
                    expected: 3,
                    actual: bytes.len(),
                }),
            }
        }
    }

    impl From<image::Rgb<u8>> for Pixel {
        fn from(rgb: image::Rgb<u8>) -> Self {
            let [red, green, blue] = rgb.0;
            Pixel::new(red, green, blue)
        }
    }

    impl From<Pixel> for image::Rgb<u8> {
        fn from(pixel: Pixel) -> Self {
            image::Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }
}
