use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use rand::distr::{Distribution, Uniform};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

enum Mode {
    Random { labels: Vec<String> },
    Fixed { label: String, confidence: f32 },
    Failing { message: String },
    Panicking { message: String },
}

pub struct ImageClassifierFake {
    mode: Mode,
    calls: AtomicUsize,
    logger: Option<Arc<dyn Logger + Send + Sync>>,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            mode: Mode::Random {
                labels: vec!["no_smoke".to_string(), "smoke".to_string()],
            },
            calls: AtomicUsize::new(0),
            logger: Some(logger.with_namespace("image_classifier").with_namespace("fake")),
        }
    }

    #[allow(dead_code)]
    pub fn fixed(label: &str, confidence: f32) -> Self {
        Self {
            mode: Mode::Fixed {
                label: label.to_string(),
                confidence,
            },
            calls: AtomicUsize::new(0),
            logger: None,
        }
    }

    #[allow(dead_code)]
    pub fn failing(message: &str) -> Self {
        Self {
            mode: Mode::Failing {
                message: message.to_string(),
            },
            calls: AtomicUsize::new(0),
            logger: None,
        }
    }

    #[allow(dead_code)]
    pub fn panicking(message: &str) -> Self {
        Self {
            mode: Mode::Panicking {
                message: message.to_string(),
            },
            calls: AtomicUsize::new(0),
            logger: None,
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(
        &self,
        _image: &DynamicImage,
    ) -> Result<Vec<Classification>, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            Mode::Fixed { label, confidence } => Ok(vec![Classification {
                label: label.clone(),
                confidence: *confidence,
            }]),
            Mode::Failing { message } => Err(message.clone().into()),
            Mode::Panicking { message } => panic!("{}", message),
            Mode::Random { labels } => {
                if let Some(logger) = &self.logger {
                    let _ = logger.info("Classifying frame with fake classifier...");
                }

                let mut rng = rand::rng();
                let index_dist = Uniform::new(0, labels.len())?;
                let confidence_dist = Uniform::new(0.5f32, 1.0f32)?;

                let winner = index_dist.sample(&mut rng);
                let confidence = confidence_dist.sample(&mut rng);

                let mut classifications: Vec<Classification> = labels
                    .iter()
                    .enumerate()
                    .map(|(index, label)| Classification {
                        label: label.clone(),
                        confidence: if index == winner {
                            confidence
                        } else {
                            (1.0 - confidence) / (labels.len() - 1).max(1) as f32
                        },
                    })
                    .collect();
                classifications.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

                Ok(classifications)
            }
        }
    }
}
