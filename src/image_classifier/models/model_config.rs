use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub onnx_model_path: PathBuf,
    /// (height, width) fed to the network.
    pub input_shape: (u32, u32),
    /// Class names in output-index order.
    pub labels: Vec<String>,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            onnx_model_path: PathBuf::from("models/smoke_classifier.onnx"),
            input_shape: (256, 256),
            labels: vec!["no_smoke".to_string(), "smoke".to_string()],
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}
