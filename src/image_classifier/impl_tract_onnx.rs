use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::image_classifier::tract::image::{resize_image_to_tensor, softmax};
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::sync::Arc;
use tract_onnx::prelude::*;

use super::models::model_config::ModelConfig;

pub struct ImageClassifierTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    config: ModelConfig,
}

impl ImageClassifierTractOnnx {
    pub fn new(
        config: ModelConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let logger = logger.with_namespace("image_classifier");
        let _ = logger.info(&format!(
            "Loading classifier from {}",
            config.onnx_model_path.display()
        ));

        let (height, width) = config.input_shape;
        let model = tract_onnx::onnx()
            .model_for_path(&config.onnx_model_path)?
            .with_input_fact(
                0,
                f32::fact([1, 3, height as usize, width as usize]).into(),
            )?
            .into_optimized()?
            .into_runnable()?;

        let _ = logger.info(&format!(
            "Classifier ready | input={}x{} | labels={:?}",
            width, height, config.labels
        ));

        Ok(Self { model, config })
    }

    fn label_for(&self, index: usize) -> String {
        self.config
            .labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn classify(
        &self,
        image: &DynamicImage,
    ) -> Result<Vec<Classification>, Box<dyn std::error::Error + Send + Sync>> {
        let (height, width) = self.config.input_shape;
        let input =
            resize_image_to_tensor(image, width, height, self.config.mean, self.config.std)?;

        let outputs = self.model.run(tvec!(input.into_tvalue()))?;
        let output = outputs
            .first()
            .ok_or("classifier produced no outputs")?
            .to_array_view::<f32>()?;

        // [1, num_classes] logits
        let logits: Vec<f32> = output.iter().copied().collect();
        if logits.is_empty() {
            return Err("classifier produced an empty output".into());
        }

        let mut classifications: Vec<Classification> = softmax(&logits)
            .into_iter()
            .enumerate()
            .map(|(index, confidence)| Classification {
                label: self.label_for(index),
                confidence,
            })
            .collect();

        classifications.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Ok(classifications)
    }
}
