use crate::config::Config;
use crate::library::logger::interface::Logger;
use crate::pipeline::video_processor::VideoProcessor;
use crate::task_registry::TaskRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub task_registry: Arc<TaskRegistry>,
    pub video_processor: VideoProcessor,
}

impl AppState {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        task_registry: Arc<TaskRegistry>,
        video_processor: VideoProcessor,
    ) -> Self {
        Self {
            config: Arc::new(config),
            logger: logger.with_namespace("api"),
            task_registry,
            video_processor,
        }
    }
}
