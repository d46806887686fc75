// THEORY:
// This file is the main entry point for the `fruit_vision` library crate.
// It exposes the two reproducible halves of the photo classifier (the image encoder
// and the result decoder) plus the glue that connects them to an external model.
//
// The high-level interface is `pipeline::ClassificationPipeline`; the batch encoder
// in `parallel_pipeline` serves tools that prepare model inputs offline. The
// `core_modules` stay public so hosts that already hold a prepared bitmap or a raw
// score buffer can call the encoder or decoder directly.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod inference;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::{CLASS_LABELS, ClassifierConfig, IMAGE_SIZE};
pub use error::{ClassifierError, Result};
pub use inference::InferenceModel;
