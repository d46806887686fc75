// THEORY:
// The model is an opaque artifact produced by an external toolchain. This crate
// never looks inside it. Everything it needs from the model fits in one call: take
// a fully built tensor, return one score per class.
//
// Closures implement the trait too, so a host application can wrap whatever runtime
// it ships with (or a canned vector in tests) without a new type.

use crate::core_modules::encoder::EncodedTensor;
use crate::error::Result;

pub trait InferenceModel {
    /// Runs the model on `input` and returns the raw confidence vector.
    fn process(&mut self, input: &EncodedTensor) -> Result<Vec<f32>>;
}

impl<F> InferenceModel for F
where
    F: FnMut(&EncodedTensor) -> Result<Vec<f32>>,
{
    fn process(&mut self, input: &EncodedTensor) -> Result<Vec<f32>> {
        self(input)
    }
}
