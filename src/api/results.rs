use crate::annotation::store::{
    read_annotation, task_result_path, video_only_result_path, write_annotation,
};
use crate::api::state::AppState;
use crate::task_registry::TaskStatus;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};

pub const NOT_COMPLETE: &str = "Processing is not yet complete, please check the status.";
pub const NO_DATA: &str = "No data for task_id.";

#[derive(Debug, Default, Deserialize)]
pub struct VideoOnlyQuery {
    /// Drop the per-frame sensor readings.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub video_only: bool,
}

/// Query flags as browsers and scripts send them: `1`, `yes`, `on` and so on.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(serde::de::Error::custom(format!(
            "invalid boolean {:?}",
            raw
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub task_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_body(message: impl Into<String>) -> Response {
    Json(ErrorResponse {
        error: message.into(),
    })
    .into_response()
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<StatusResponse> {
    let status = state.task_registry.status_label(&task_id);
    Json(StatusResponse { task_id, status })
}

pub async fn get_video_info(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(query): Query<VideoOnlyQuery>,
) -> Response {
    if state.task_registry.status(&task_id) != Some(TaskStatus::Completed) {
        return error_body(NOT_COMPLETE);
    }

    match state.task_registry.result(&task_id) {
        Some(annotation) if query.video_only => Json(annotation.without_sensors()).into_response(),
        Some(annotation) => Json(annotation.as_ref()).into_response(),
        None => error_body(NO_DATA),
    }
}

/// Serves the persisted result file as a download.
pub async fn get_video_json(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(query): Query<VideoOnlyQuery>,
) -> Response {
    let logger = state.logger.with_namespace("video_json");
    let missing = format!("No result file for {}. Has processing finished?", task_id);

    // ids become file names; only accept ones this server could have issued
    if uuid::Uuid::parse_str(&task_id).is_err() {
        return error_body(missing);
    }

    let json_dir = state.config.pipeline.json_output_dir.clone();
    let path = task_result_path(&json_dir, &task_id);
    if !path.exists() {
        return error_body(missing);
    }

    let served = if query.video_only {
        let video_only_path = video_only_result_path(&json_dir, &task_id);
        let written = tokio::task::spawn_blocking({
            let video_only_path = video_only_path.clone();
            move || {
                let annotation = read_annotation(&path)?;
                write_annotation(&video_only_path, &annotation.without_sensors())
            }
        })
        .await;

        match written {
            Ok(Ok(())) => video_only_path,
            Ok(Err(error)) => {
                let _ = logger.error(&format!("[{}] {}", task_id, error));
                return (StatusCode::INTERNAL_SERVER_ERROR, error_body(error.to_string()))
                    .into_response();
            }
            Err(error) => {
                let _ = logger.error(&format!("[{}] video-only export panicked: {}", task_id, error));
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    } else {
        path
    };

    let bytes = match tokio::fs::read(&served).await {
        Ok(bytes) => bytes,
        Err(error) => {
            let _ = logger.error(&format!("[{}] cannot read {}: {}", task_id, served.display(), error));
            return error_body(missing);
        }
    };

    let download_name = served
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        bytes,
    )
        .into_response()
}
