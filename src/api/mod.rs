pub mod results;
pub mod state;
pub mod upload;


use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use state::AppState;
use std::net::SocketAddr;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload-data/", post(upload::upload_video_and_sensor))
        .route("/status/:task_id", get(results::get_status))
        .route("/video-info/:task_id", get(results::get_video_info))
        .route("/video-json/:task_id", get(results::get_video_json))
        .route("/health", get(health_check))
        // videos are streamed to disk; no request size cap
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

pub async fn serve(state: AppState, bind_addr: SocketAddr) -> std::io::Result<()> {
    let logger = state.logger.clone();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let _ = logger.info(&format!("Listening on http://{}", bind_addr));

    axum::serve(listener, router(state)).await
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}
