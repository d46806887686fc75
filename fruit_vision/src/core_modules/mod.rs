pub mod bitmap;
pub mod decoder;
pub mod encoder;
pub mod image_helper;
pub mod pixel;
