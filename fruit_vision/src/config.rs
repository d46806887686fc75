// THEORY:
// The bundled model was trained for one input side length and one ordered set of
// classes. Both are process-wide constants. `ClassifierConfig` wraps them so the
// same pipeline can be pointed at a different model export through a JSON file,
// but the defaults are always the constants below and nothing mutates a config
// after the pipeline is built.

use crate::error::{ClassifierError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Side length, in pixels, of the square model input.
pub const IMAGE_SIZE: u32 = 224;

/// Model output index to class name.
pub const CLASS_LABELS: [&str; 5] = ["Pera", "Manzana", "Kiwi", "Fresa", "Banana"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Side length of the square bitmap the encoder accepts.
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    /// Class names, index-aligned with the model's confidence vector.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

fn default_image_size() -> u32 {
    IMAGE_SIZE
}

fn default_labels() -> Vec<String> {
    CLASS_LABELS.iter().map(|label| label.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            image_size: default_image_size(),
            labels: default_labels(),
        }
    }
}

impl ClassifierConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClassifierConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given; falls back to the built-in model settings otherwise
    /// or when the file cannot be used.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("loaded classifier config from {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "could not use classifier config {} ({}), falling back to defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(ClassifierError::InvalidConfig(
                "image_size must be greater than zero".to_string(),
            ));
        }
        if self.labels.is_empty() {
            return Err(ClassifierError::EmptyLabelTable);
        }
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }
}
