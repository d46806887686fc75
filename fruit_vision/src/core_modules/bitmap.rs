// THEORY:
// The `Bitmap` is the owned raster handed over by image acquisition. Like `Pixel`,
// it is a "dumb" container: a width, a height and a flattened row-major `Vec<Pixel>`.
// It knows how to build itself from the formats acquisition produces and how to hand
// its rows back out, but it does not know anything about tensors or models.
//
// Construction is the only place a bitmap can be malformed, so every constructor
// checks that the pixel count matches `width * height`. After that the bitmap is
// never mutated; the encoder reads it exactly once.

pub mod bitmap {
    use crate::core_modules::pixel::pixel::{PackedArgb, Pixel};
    use crate::error::{ClassifierError, Result};
    use image::RgbImage;

    const RGB_CHANNELS: usize = 3;

    /// A decoded, owned RGB raster.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Bitmap {
        /// The width of the bitmap in pixels.
        width: u32,
        /// The height of the bitmap in pixels.
        height: u32,
        /// Row-major pixel data, `width * height` entries.
        pixels: Vec<Pixel>,
    }

    impl Bitmap {
        pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self> {
            let expected = width as usize * height as usize;
            if pixels.len() != expected {
                return Err(ClassifierError::LengthMismatch {
                    expected,
                    actual: pixels.len(),
                });
            }
            Ok(Self {
                width,
                height,
                pixels,
            })
        }

        /// A bitmap where every position holds the same pixel.
        pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
            Self {
                width,
                height,
                pixels: vec![pixel; width as usize * height as usize],
            }
        }

        /// Builds a bitmap from packed 0xAARRGGBB words with a row stride equal to `width`.
        pub fn from_argb(width: u32, height: u32, values: &[PackedArgb]) -> Result<Self> {
            let pixels = values.iter().copied().map(Pixel::from_argb).collect();
            Self::new(width, height, pixels)
        }

        /// Builds a bitmap from tightly packed RGB8 bytes.
        pub fn from_rgb_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
            let expected = width as usize * height as usize * RGB_CHANNELS;
            if bytes.len() != expected {
                return Err(ClassifierError::LengthMismatch {
                    expected,
                    actual: bytes.len(),
                });
            }
            let pixels = bytes
                .chunks_exact(RGB_CHANNELS)
                .map(|rgb| Pixel::new(rgb[0], rgb[1], rgb[2]))
                .collect();
            Self::new(width, height, pixels)
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn dimensions(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        pub fn is_square(&self) -> bool {
            self.width == self.height
        }

        pub fn pixels(&self) -> &[Pixel] {
            &self.pixels
        }

        /// Returns the pixel at column `x`, row `y`, or `None` when out of bounds.
        pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
            if x >= self.width || y >= self.height {
                return None;
            }
            self.pixels
                .get(y as usize * self.width as usize + x as usize)
                .copied()
        }

        /// Iterates rows from top to bottom; each row runs left to right.
        pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
            // chunks_exact(0) panics; an empty bitmap simply has no rows.
            let stride = (self.width as usize).max(1);
            self.pixels.chunks_exact(stride)
        }

        pub fn to_rgb_image(&self) -> RgbImage {
            RgbImage::from_fn(self.width, self.height, |x, y| {
                self.pixels[y as usize * self.width as usize + x as usize].into()
            })
        }
    }

    impl From<&RgbImage> for Bitmap {
        fn from(image: &RgbImage) -> Self {
            let (width, height) = image.dimensions();
            let pixels = image.pixels().map(|rgb| Pixel::from(*rgb)).collect();
            Self {
                width,
                height,
                pixels,
            }
        }
    }

    impl From<RgbImage> for Bitmap {
        fn from(image: RgbImage) -> Self {
            Bitmap::from(&image)
        }
    }
}
