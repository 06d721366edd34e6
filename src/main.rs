use api::state::AppState;
use clap::Parser;
use config::{Args, Config};
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use image_classifier::interface::ImageClassifier;
use library::logger::impl_tracing::LoggerTracing;
use library::logger::interface::Logger;
use pipeline::video_processor::VideoProcessor;
use std::sync::Arc;
use task_registry::TaskRegistry;
use tracing_subscriber::EnvFilter;
use video_decoder::impl_fake::VideoDecoderFake;
use video_decoder::interface::VideoDecoder;

mod annotation;
mod api;
mod config;
mod image_classifier;
mod library;
mod pipeline;
mod sensor_log;
mod task_registry;
mod video_decoder;
mod video_timestamp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log_level)?)
        .init();

    let config = Config::from(&args);
    config.ensure_directories()?;

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerTracing::new());

    let (image_classifier, video_decoder): (
        Arc<dyn ImageClassifier + Send + Sync>,
        Arc<dyn VideoDecoder + Send + Sync>,
    ) = if args.fake {
        let _ = logger.warn("Running with the fake classifier and synthetic video");
        (
            Arc::new(ImageClassifierFake::new(logger.clone())),
            Arc::new(VideoDecoderFake::default()),
        )
    } else {
        let image_classifier =
            ImageClassifierTractOnnx::new(config.classifier.clone(), logger.clone())
                .map_err(|error| anyhow::anyhow!(error))?;
        (Arc::new(image_classifier), real_video_decoder(logger.clone())?)
    };

    let task_registry = Arc::new(TaskRegistry::new());

    let video_processor = VideoProcessor::new(
        config.pipeline.clone(),
        logger.clone(),
        image_classifier,
        video_decoder,
        task_registry.clone(),
    );

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, logger, task_registry, video_processor);

    api::serve(state, bind_addr).await?;

    Ok(())
}

#[cfg(feature = "opencv")]
fn real_video_decoder(
    logger: Arc<dyn Logger + Send + Sync>,
) -> anyhow::Result<Arc<dyn VideoDecoder + Send + Sync>> {
    Ok(Arc::new(
        video_decoder::impl_opencv::VideoDecoderOpenCv::new(logger),
    ))
}

#[cfg(not(feature = "opencv"))]
fn real_video_decoder(
    _logger: Arc<dyn Logger + Send + Sync>,
) -> anyhow::Result<Arc<dyn VideoDecoder + Send + Sync>> {
    anyhow::bail!("built without video decoding; rebuild with `--features opencv` or run with `--fake`")
}
