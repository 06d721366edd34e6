use crate::api::state::AppState;
use crate::pipeline::video_processor::ProcessRequest;
use crate::task_registry::{TaskRegistry, TaskStatus};
use axum::extract::multipart::{Field, Multipart};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const VIDEO_CONTENT_TYPES: [&str; 4] = [
    "video/mp4",
    "video/avi",
    "video/mov",
    "application/octet-stream",
];
const SENSOR_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub task_id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub error: String,
    pub status: &'static str,
    /// Present once the task was registered; its status reads `aborted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

#[derive(Debug)]
enum UploadError {
    Rejected(String),
    Stream(String),
    Io(std::io::Error),
}

#[derive(Debug, Default)]
struct ReceivedFiles {
    video_path: Option<PathBuf>,
    sensor_path: Option<PathBuf>,
}

impl ReceivedFiles {
    async fn remove(&self) {
        for path in [&self.video_path, &self.sensor_path].into_iter().flatten() {
            let _ = tokio::fs::remove_file(path).await;
        }
    }
}

pub async fn upload_video_and_sensor(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let logger = state.logger.with_namespace("upload");
    let task_id = TaskRegistry::new_task_id();
    let mut received = ReceivedFiles::default();

    let outcome = receive_files(&state, &task_id, &mut multipart, &mut received).await;
    let registered = state.task_registry.status(&task_id).is_some();

    if let Err(error) = outcome {
        received.remove().await;

        let (code, message) = match error {
            UploadError::Rejected(message) => (StatusCode::BAD_REQUEST, message),
            UploadError::Stream(detail) if registered => {
                let _ = logger.warn(&format!("[{}] upload stream broke: {}", task_id, detail));
                (
                    StatusCode::BAD_REQUEST,
                    "Client disconnected during upload".to_string(),
                )
            }
            UploadError::Stream(detail) => (StatusCode::BAD_REQUEST, detail),
            UploadError::Io(error) => {
                let _ = logger.error(&format!("[{}] cannot store upload: {}", task_id, error));
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };

        if registered {
            state.task_registry.set_status(&task_id, TaskStatus::Aborted);
            return failure(code, message, Some(task_id));
        }
        return failure(code, message, None);
    }

    let Some(video_path) = received.video_path.clone() else {
        received.remove().await;
        return failure(
            StatusCode::BAD_REQUEST,
            "video file is required".to_string(),
            None,
        );
    };

    let request = ProcessRequest {
        task_id: task_id.clone(),
        video_path,
        include_sensors: received.sensor_path.is_some(),
        sensor_path: received.sensor_path,
    };
    let _ = logger.info(&format!(
        "[{}] stored {} (sensors: {})",
        task_id,
        request.video_path.display(),
        request.include_sensors
    ));

    state.video_processor.spawn(request);

    Json(UploadAccepted {
        task_id,
        status: "files uploaded, processing started.",
    })
    .into_response()
}

async fn receive_files(
    state: &AppState,
    task_id: &str,
    multipart: &mut Multipart,
    received: &mut ReceivedFiles,
) -> Result<(), UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| UploadError::Stream(error.body_text()))?
    {
        let part = field.name().map(str::to_owned);
        match part.as_deref() {
            Some("video") => {
                if received.video_path.is_some() {
                    return Err(UploadError::Rejected(
                        "only one video per upload".to_string(),
                    ));
                }
                if !VIDEO_CONTENT_TYPES.contains(&content_type(&field).as_str()) {
                    return Err(UploadError::Rejected(
                        "Unsupported video MIME type.".to_string(),
                    ));
                }

                let name = upload_basename(field.file_name())
                    .unwrap_or_else(|| format!("{}_video", task_id));
                let path = state.config.video_dir.join(name);

                state
                    .task_registry
                    .set_status(task_id, TaskStatus::Processing);
                received.video_path = Some(path.clone());
                stream_to_file(field, &path).await?;
            }
            Some("sensor") => {
                if received.sensor_path.is_some() {
                    return Err(UploadError::Rejected(
                        "only one sensor file per upload".to_string(),
                    ));
                }
                if content_type(&field) != SENSOR_CONTENT_TYPE {
                    return Err(UploadError::Rejected(
                        "sensor file must be text/plain".to_string(),
                    ));
                }

                let name = upload_basename(field.file_name())
                    .unwrap_or_else(|| format!("{}_sensor.txt", task_id));
                let path = state.config.sensor_dir.join(name);

                received.sensor_path = Some(path.clone());
                stream_to_file(field, &path).await?;
            }
            _ => {}
        }
    }

    Ok(())
}

async fn stream_to_file(mut field: Field<'_>, path: &Path) -> Result<(), UploadError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(UploadError::Io)?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|error| UploadError::Stream(error.body_text()))?
    {
        file.write_all(&chunk).await.map_err(UploadError::Io)?;
    }
    file.flush().await.map_err(UploadError::Io)?;

    Ok(())
}

/// Media type without parameters; parts that omit it are `text/plain` (RFC 7578).
fn content_type(field: &Field<'_>) -> String {
    field
        .content_type()
        .unwrap_or("text/plain")
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Client-supplied names lose any directory components.
pub fn upload_basename(file_name: Option<&str>) -> Option<String> {
    let name = Path::new(file_name?).file_name()?.to_string_lossy().into_owned();
    (!name.is_empty()).then_some(name)
}

fn failure(code: StatusCode, error: String, task_id: Option<String>) -> Response {
    (
        code,
        Json(UploadFailure {
            error,
            status: "failure",
            task_id,
        }),
    )
        .into_response()
}
