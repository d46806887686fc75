// THEORY:
// The encoder turns a prepared `Bitmap` into the flat float buffer the model reads.
// The layout is load-bearing: the model wrapper interprets the buffer as
// [1, side, side, 3] with rows outermost, columns next and channels (R, G, B)
// innermost. Any change to the traversal order silently scrambles the input.
//
// The encoder is pure. The only failure is a bitmap of the wrong shape, which is
// rejected up front so that no partial tensor ever exists.

use crate::core_modules::bitmap::bitmap::Bitmap;
use crate::error::{ClassifierError, Result};
use log::debug;

pub const CHANNELS: usize = 3;
const F32_BYTES: usize = std::mem::size_of::<f32>();

/// A fully materialized, normalized model input.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTensor {
    side: u32,
    values: Vec<f32>,
}

impl EncodedTensor {
    /// Logical shape as the model sees it: batch, height, width, channels.
    pub fn shape(&self) -> [usize; 4] {
        let side = self.side as usize;
        [1, side, side, CHANNELS]
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// Serializes the values in the host's native byte order.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.values.len() * F32_BYTES);
        for value in &self.values {
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
        bytes
    }

    /// Rebuilds a tensor of the given side from native-endian bytes.
    pub fn from_ne_bytes(side: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % F32_BYTES != 0 {
            return Err(ClassifierError::MalformedBuffer { len: bytes.len() });
        }
        let expected = side as usize * side as usize * CHANNELS;
        let actual = bytes.len() / F32_BYTES;
        if actual != expected {
            return Err(ClassifierError::LengthMismatch { expected, actual });
        }
        let values = bytes
            .chunks_exact(F32_BYTES)
            .map(|word| f32::from_ne_bytes([word[0], word[1], word[2], word[3]]))
            .collect();
        Ok(Self { side, values })
    }
}

/// Encodes square bitmaps of one fixed side length.
#[derive(Debug, Clone, Copy)]
pub struct ImageEncoder {
    side: u32,
}

impl ImageEncoder {
    pub fn new(side: u32) -> Self {
        Self { side }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Number of f32 values every tensor from this encoder holds.
    pub fn tensor_len(&self) -> usize {
        self.side as usize * self.side as usize * CHANNELS
    }

    pub fn encode(&self, bitmap: &Bitmap) -> Result<EncodedTensor> {
        let (width, height) = bitmap.dimensions();
        if width != self.side || height != self.side {
            return Err(ClassifierError::DimensionMismatch {
                expected_width: self.side,
                expected_height: self.side,
                actual_width: width,
                actual_height: height,
            });
        }

        let mut values = Vec::with_capacity(self.tensor_len());
        for row in bitmap.rows() {
            for pixel in row {
                values.extend_from_slice(&pixel.normalized());
            }
        }

        debug!(
            "encoded {}x{} bitmap into {} values ({} bytes)",
            width,
            height,
            values.len(),
            values.len() * F32_BYTES
        );

        Ok(EncodedTensor {
            side: self.side,
            values,
        })
    }
}
