// THEORY:
// Every failure the classifier core can report is a contract violation between
// collaborators (wrong bitmap shape, wrong score count, malformed byte buffers)
// or an I/O problem at the edges. None of them are transient, so there is one flat
// error enum and no retry machinery anywhere in the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error(
        "dimension mismatch: expected {expected_width}x{expected_height} bitmap, got {actual_width}x{actual_height}"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("label table is empty")]
    EmptyLabelTable,

    #[error("malformed buffer: {len} bytes is not a whole number of f32 values")]
    MalformedBuffer { len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("worker task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
