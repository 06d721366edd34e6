use crate::annotation::store::{friendly_result_path, task_result_path, write_annotation};
use crate::annotation::{FrameAnnotation, FrameClassification, SensorSnapshot, VideoAnnotation};
use crate::config::PipelineConfig;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::pipeline::error::ProcessingError;
use crate::sensor_log::{read_sensor_log, SensorTimeline};
use crate::task_registry::{TaskRegistry, TaskStatus};
use crate::video_decoder::interface::VideoDecoder;
use crate::video_timestamp::{
    compact_stamp, effective_fps, format_clock, frame_timestamp, parse_video_start, safe_stem,
};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub task_id: String,
    pub video_path: PathBuf,
    pub sensor_path: Option<PathBuf>,
    pub include_sensors: bool,
}

#[derive(Clone)]
pub struct VideoProcessor {
    config: PipelineConfig,
    logger: Arc<dyn Logger + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    video_decoder: Arc<dyn VideoDecoder + Send + Sync>,
    task_registry: Arc<TaskRegistry>,
}

impl VideoProcessor {
    pub fn new(
        config: PipelineConfig,
        logger: Arc<dyn Logger + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        video_decoder: Arc<dyn VideoDecoder + Send + Sync>,
        task_registry: Arc<TaskRegistry>,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("pipeline"),
            image_classifier,
            video_decoder,
            task_registry,
        }
    }

    /// Runs one task to completion, recording the outcome in the registry.
    /// Blocking; callers run it off the async runtime.
    pub fn process(&self, request: ProcessRequest) {
        let logger = self.logger.with_namespace(&request.task_id);

        match self.annotate(&request, logger.as_ref()) {
            Ok(()) => {
                self.task_registry
                    .set_status(&request.task_id, TaskStatus::Completed);
                let _ = logger.info("Completed");
            }
            Err(error) => {
                let _ = logger.error(&format!("Failed: {}", describe(&error)));
                self.task_registry
                    .set_status(&request.task_id, TaskStatus::Error(error.to_string()));
            }
        }
    }

    /// Runs [`Self::process`] on the blocking pool. A worker that panics
    /// still leaves the task in an `error` state.
    pub fn spawn(&self, request: ProcessRequest) -> JoinHandle<()> {
        let task_id = request.task_id.clone();
        let logger = self.logger.with_namespace(&task_id);
        let task_registry = self.task_registry.clone();

        let processor = self.clone();
        let worker = tokio::task::spawn_blocking(move || processor.process(request));

        tokio::spawn(async move {
            if let Err(error) = worker.await {
                let detail = join_failure(error);
                let _ = logger.error(&format!("Worker died: {}", detail));
                task_registry.set_status(
                    &task_id,
                    TaskStatus::Error(format!("processing panicked: {}", detail)),
                );
            }
        })
    }

    fn annotate(&self, request: &ProcessRequest, logger: &dyn Logger) -> Result<(), ProcessingError> {
        let stem = file_stem(&request.video_path);
        let video_start = parse_video_start(&stem)?;

        let timeline = if request.include_sensors {
            self.load_timeline(request.sensor_path.as_deref(), logger)
        } else {
            None
        };

        let mut stream = self
            .video_decoder
            .open(&request.video_path)
            .map_err(ProcessingError::OpenVideo)?;

        let metadata = stream.metadata();
        let fps = effective_fps(metadata.fps);
        let _ = logger.info(&format!(
            "Processing {} | start={} | fps={:.2} | frames={:?}",
            request.video_path.display(),
            video_start,
            fps,
            metadata.frame_count
        ));

        let sample_every = self.config.sample_every.max(1);
        let mut annotation = VideoAnnotation::new(file_name(&request.video_path), metadata.frame_count);
        let mut frame_index: u64 = 0;

        loop {
            if frame_index % sample_every != 0 {
                let advanced = stream
                    .skip_frame()
                    .map_err(|source| ProcessingError::Decode { frame_index, source })?;
                if !advanced {
                    break;
                }
                frame_index += 1;
                continue;
            }

            let frame = match stream
                .next_frame()
                .map_err(|source| ProcessingError::Decode { frame_index, source })?
            {
                Some(frame) => frame,
                None => break,
            };

            let now = frame_timestamp(video_start, frame_index, fps)
                .ok_or(ProcessingError::FrameTime { frame_index })?;
            let entry = self.annotate_frame(frame_index, now, &frame, request, timeline.as_ref())?;

            if self.config.log_every_n > 0 && frame_index % self.config.log_every_n == 0 {
                let _ = logger.info(&format!(
                    "[frame {}] {} | cls={}({:.3})",
                    frame_index, entry.timestamp, entry.cls.label, entry.cls.conf
                ));
            }

            annotation.data.insert(frame_index, entry);
            frame_index += 1;
        }

        let _ = logger.info(&format!(
            "Annotated {} of {} frames",
            annotation.data.len(),
            frame_index
        ));

        self.task_registry
            .store_result(&request.task_id, annotation.clone());

        let json_dir = &self.config.json_output_dir;
        let by_id = task_result_path(json_dir, &request.task_id);
        let friendly = friendly_result_path(json_dir, &compact_stamp(video_start), &safe_stem(&stem));
        write_annotation(&by_id, &annotation)?;
        write_annotation(&friendly, &annotation)?;
        let _ = logger.info(&format!(
            "Saved {} | {}",
            by_id.display(),
            friendly.display()
        ));

        Ok(())
    }

    fn annotate_frame(
        &self,
        frame_index: u64,
        now: NaiveDateTime,
        frame: &image::DynamicImage,
        request: &ProcessRequest,
        timeline: Option<&SensorTimeline>,
    ) -> Result<FrameAnnotation, ProcessingError> {
        let top = self
            .image_classifier
            .classify(frame)
            .map_err(|source| ProcessingError::Classify { frame_index, source })?
            .into_iter()
            .next()
            .ok_or(ProcessingError::NoClassification { frame_index })?;

        let sensors = request.include_sensors.then(|| {
            SensorSnapshot::from_reading(timeline.and_then(|timeline| timeline.latest_at(now)))
        });

        Ok(FrameAnnotation {
            timestamp: format_clock(now),
            cls: FrameClassification {
                label: top.label,
                conf: top.confidence,
            },
            sensors,
        })
    }

    /// An unreadable sensor log degrades to "no readings" instead of failing the task.
    fn load_timeline(&self, sensor_path: Option<&Path>, logger: &dyn Logger) -> Option<SensorTimeline> {
        let path = sensor_path.filter(|path| path.exists())?;

        match read_sensor_log(path) {
            Ok(log) => {
                for line in &log.unparsed_datetime_lines {
                    let _ = logger.warn(&format!(
                        "{} line {}: unparseable Datetime, reading ignored",
                        path.display(),
                        line
                    ));
                }
                let timeline = SensorTimeline::from_log(&log);
                let _ = logger.info(&format!(
                    "Loaded sensors: {} rows, {} timed",
                    log.readings.len(),
                    timeline.len()
                ));
                Some(timeline)
            }
            Err(error) => {
                let _ = logger.warn(&format!("Cannot read sensors: {}", error));
                None
            }
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn describe(error: &ProcessingError) -> String {
    match error {
        ProcessingError::OpenVideo(source) => format!("{} ({})", error, source),
        _ => error.to_string(),
    }
}

fn join_failure(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
