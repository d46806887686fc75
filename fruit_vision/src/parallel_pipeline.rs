// THEORY:
// Classifying a photo is strictly one-at-a-time, but turning a folder of photos into
// model inputs is embarrassingly parallel: each file is loaded, prepared and encoded
// with no shared state. This module fans that work out over tokio's blocking pool,
// keeps at most one job per CPU in flight and hands the results back in input order.
//
// A failure in one file never poisons the batch; every path gets its own `Result`.

use crate::core_modules::encoder::{EncodedTensor, ImageEncoder};
use crate::core_modules::image_helper::image_helper;
use crate::error::{ClassifierError, Result};
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Loads, prepares and encodes a single file. Blocking.
pub fn encode_file(path: &Path, image_size: u32) -> Result<EncodedTensor> {
    let image = image_helper::load(path)?;
    let bitmap = image_helper::prepare(&image, image_size);
    ImageEncoder::new(image_size).encode(&bitmap)
}

/// Encodes every file in `paths`, `num_cpus::get()` at a time.
pub async fn encode_batch(paths: Vec<PathBuf>, image_size: u32) -> Vec<Result<EncodedTensor>> {
    let workers = num_cpus::get().max(1);
    debug!("encoding {} files with {} workers", paths.len(), workers);

    stream::iter(paths)
        .map(move |path| async move {
            let display = path.display().to_string();
            let joined = tokio::task::spawn_blocking(move || encode_file(&path, image_size)).await;
            match joined {
                Ok(result) => {
                    if let Err(e) = &result {
                        warn!("failed to encode {}: {}", display, e);
                    }
                    result
                }
                Err(e) => Err(ClassifierError::Task(e.to_string())),
            }
        })
        .buffered(workers)
        .collect()
        .await
}
