// THEORY:
// The `pipeline` module is the top-level API for classifying a photo. It strings the
// stages together in a fixed order and owns nothing but the stage objects:
//
// 1. Preparation: center-crop and nearest-neighbour scale to the model side.
// 2. Encoding: row-major, RGB-interleaved, normalized f32 tensor.
// 3. Inference: the opaque model behind `InferenceModel`.
// 4. Decoding: arg-max label plus the per-class confidence report.
//
// Each stage fully materializes its output before the next starts. `classify_*`
// takes `&mut self`, so one pipeline never has two classifications in flight.

use crate::config::ClassifierConfig;
use crate::core_modules::bitmap::bitmap::Bitmap;
use crate::core_modules::decoder::ResultDecoder;
use crate::core_modules::encoder::ImageEncoder;
use crate::core_modules::image_helper::image_helper;
use crate::error::Result;
use crate::inference::InferenceModel;
use image::DynamicImage;
use log::debug;
use std::path::Path;

// Re-export key data structures for the public API.
pub use crate::core_modules::decoder::{ClassScore, ClassificationResult};
pub use crate::core_modules::encoder::EncodedTensor;

/// Encoder, model and decoder wired together for one label table.
pub struct ClassificationPipeline<M: InferenceModel> {
    config: ClassifierConfig,
    encoder: ImageEncoder,
    decoder: ResultDecoder,
    model: M,
}

impl<M: InferenceModel> ClassificationPipeline<M> {
    pub fn new(config: ClassifierConfig, model: M) -> Result<Self> {
        config.validate()?;
        let encoder = ImageEncoder::new(config.image_size);
        let decoder = ResultDecoder::new(config.labels.iter().cloned())?;
        Ok(Self {
            config,
            encoder,
            decoder,
            model,
        })
    }

    /// Classifies a bitmap that is already square and at the model side length.
    pub fn classify_bitmap(&mut self, bitmap: &Bitmap) -> Result<ClassificationResult> {
        let tensor = self.encoder.encode(bitmap)?;
        debug!("running inference on tensor of shape {:?}", tensor.shape());
        let confidences = self.model.process(&tensor)?;
        self.decoder.decode(&confidences)
    }

    /// Prepares an arbitrary decoded photo and classifies it.
    pub fn classify_image(&mut self, image: &DynamicImage) -> Result<ClassificationResult> {
        let bitmap = image_helper::prepare(image, self.config.image_size);
        self.classify_bitmap(&bitmap)
    }

    pub fn classify_path<P: AsRef<Path>>(&mut self, path: P) -> Result<ClassificationResult> {
        let image = image_helper::load(path)?;
        self.classify_image(&image)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::ClassifierError;

    fn fixed_model(scores: Vec<f32>) -> impl FnMut(&EncodedTensor) -> Result<Vec<f32>> {
        move |_: &EncodedTensor| Ok(scores.clone())
    }

    #[test]
    fn bitmap_flows_through_to_label() {
        let mut pipeline =
            ClassificationPipeline::new(ClassifierConfig::default(), fixed_model(vec![0.1, 0.7, 0.05, 0.05, 0.1]))
                .expect("default config is valid");

        let bitmap = Bitmap::filled(224, 224, Pixel::new(200, 30, 40));
        let result = pipeline.classify_bitmap(&bitmap).expect("classification");

        assert_eq!(result.predicted_label, "Manzana");
        assert!(result.report.contains("Manzana: 70.0%\n"));
    }

    #[test]
    fn model_receives_fully_encoded_tensor() {
        let mut seen = Vec::new();
        {
            let model = |tensor: &EncodedTensor| -> Result<Vec<f32>> {
                seen.push((tensor.shape(), tensor.as_slice()[..3].to_vec()));
                Ok(vec![0.0, 0.0, 0.9, 0.1, 0.0])
            };
            let mut pipeline =
                ClassificationPipeline::new(ClassifierConfig::default(), model).expect("valid config");
            let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
                640,
                480,
                image::Rgb([255, 0, 51]),
            ));
            let result = pipeline.classify_image(&image).expect("classification");
            assert_eq!(result.predicted_label, "Kiwi");
        }

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, [1, 224, 224, 3]);
        assert_eq!(seen[0].1, vec![1.0f32, 0.0, 51.0 / 255.0]);
    }

    #[test]
    fn model_errors_propagate_unchanged() {
        let model = |_: &EncodedTensor| -> Result<Vec<f32>> {
            Err(ClassifierError::Inference("Error in initializing the model".to_string()))
        };
        let mut pipeline = ClassificationPipeline::new(ClassifierConfig::default(), model).expect("valid config");

        let err = pipeline
            .classify_bitmap(&Bitmap::filled(224, 224, Pixel::default()))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }

    #[test]
    fn wrong_score_count_is_reported() {
        let mut pipeline =
            ClassificationPipeline::new(ClassifierConfig::default(), fixed_model(vec![1.0; 4])).expect("valid config");

        let err = pipeline
            .classify_bitmap(&Bitmap::filled(224, 224, Pixel::default()))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::LengthMismatch { expected: 5, actual: 4 }));
    }

    #[test]
    fn unprepared_bitmap_is_rejected_before_inference() {
        let mut calls = 0;
        let result = {
            let model = |_: &EncodedTensor| -> Result<Vec<f32>> {
                calls += 1;
                Ok(vec![0.0; 5])
            };
            let mut pipeline =
                ClassificationPipeline::new(ClassifierConfig::default(), model).expect("valid config");
            pipeline.classify_bitmap(&Bitmap::filled(100, 100, Pixel::default()))
        };

        assert!(matches!(result, Err(ClassifierError::DimensionMismatch { .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = ClassifierConfig {
            labels: Vec::new(),
            ..ClassifierConfig::default()
        };
        assert!(ClassificationPipeline::new(config, fixed_model(Vec::new())).is_err());
    }

    #[test]
    fn custom_side_length_is_honored() {
        let config = ClassifierConfig {
            image_size: 16,
            labels: vec!["a".to_string(), "b".to_string()],
        };
        let mut pipeline = ClassificationPipeline::new(config, |tensor: &EncodedTensor| -> Result<Vec<f32>> {
            assert_eq!(tensor.len(), 16 * 16 * 3);
            Ok(vec![0.2, 0.8])
        })
        .expect("valid config");

        let image = DynamicImage::new_rgb8(50, 30);
        let result = pipeline.classify_image(&image).expect("classification");
        assert_eq!(result.predicted_label, "b");
        assert_eq!(pipeline.config().image_size, 16);
    }
}
