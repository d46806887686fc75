// THEORY:
// Acquisition hands over photos of any size and aspect ratio; the encoder only takes
// a square of the model's side length. These helpers close that gap the same way
// every time: center-crop to the largest square, then scale with nearest-neighbour
// sampling (no smoothing filter) to the model side length.
//
// The PNG writer exists for debugging. It dumps exactly what the encoder will see.

pub mod image_helper {
    use crate::core_modules::bitmap::bitmap::Bitmap;
    use crate::error::Result;
    use image::imageops::FilterType;
    use image::{DynamicImage, ImageEncoder, RgbImage};
    use log::debug;
    use std::path::Path;

    /// Opens and decodes an image file (JPEG, PNG, ...).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let image = image::open(path.as_ref())?;
        debug!(
            "loaded {} ({}x{})",
            path.as_ref().display(),
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// Crops the largest centered square out of `image`.
    pub fn crop_to_square(image: &DynamicImage) -> DynamicImage {
        let (width, height) = (image.width(), image.height());
        let side = width.min(height);
        if width == height {
            return image.clone();
        }
        let x = (width - side) / 2;
        let y = (height - side) / 2;
        image.crop_imm(x, y, side, side)
    }

    /// Nearest-neighbour resize to `side` x `side`, dropping any alpha channel.
    pub fn scale_to(image: &DynamicImage, side: u32) -> RgbImage {
        image.resize_exact(side, side, FilterType::Nearest).to_rgb8()
    }

    /// Crop, scale and convert: the full path from a decoded photo to encoder input.
    pub fn prepare(image: &DynamicImage, side: u32) -> Bitmap {
        let square = crop_to_square(image);
        let scaled = scale_to(&square, side);
        debug!(
            "prepared {}x{} photo as {}x{} model input",
            image.width(),
            image.height(),
            side,
            side
        );
        Bitmap::from(scaled)
    }

    pub fn save_png<P: AsRef<Path>>(path: P, bitmap: &Bitmap) -> Result<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        let (width, height) = bitmap.dimensions();

        encoder.write_image(
            bitmap.to_rgb_image().as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(())
    }
}
