//! API Routes

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::error::{Error, Result};
use crate::mjpeg_stream::MjpegStream;
use crate::models::{PasswordRequest, StreamControlResponse};
use crate::state::AppState;

/// Shared secret header on uploads
pub const CAMERA_AUTH_HEADER: &str = "x-camera-auth";
/// Spill flag header on uploads
pub const SPILL_DETECTED_HEADER: &str = "x-oil-spill-detected";

/// Create API router
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(super::index))
        // Viewers
        .route("/stream", get(video_stream))
        .route("/api/frame", get(latest_frame))
        .route("/api/status", get(super::status))
        // Oil spill events
        .route("/api/oil_spill_events", get(list_spill_events))
        .route("/api/detection_summary", get(detection_summary))
        // Camera client
        .route(
            "/api/upload_frame",
            post(upload_frame).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/start_stream", post(start_stream))
        .route("/api/stop_stream", post(stop_stream))
        .with_state(state)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn require_secret(state: &AppState, candidate: Option<&str>, action: &str) -> Result<()> {
    if state.config.camera_password.verify(candidate) {
        Ok(())
    } else {
        Err(Error::Unauthorized(format!("Invalid credentials for {}", action)))
    }
}

// ========================================
// Viewer Handlers
// ========================================

async fn video_stream(State(state): State<AppState>) -> Result<Response> {
    let stream = MjpegStream::open(state.frames.clone(), state.config.stream_interval).await?;
    Ok(stream.into_response())
}

async fn latest_frame(State(state): State<AppState>) -> Result<Response> {
    let jpeg = state
        .frames
        .snapshot()
        .await?
        .ok_or_else(|| Error::NotActive("No frame available".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        jpeg,
    )
        .into_response())
}

async fn list_spill_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.alerts.events().await)
}

async fn detection_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.alerts.summary().await)
}

// ========================================
// Camera Client Handlers
// ========================================

async fn upload_frame(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str> {
    require_secret(&state, header_str(&headers, CAMERA_AUTH_HEADER), "frame upload")?;

    let spill_detected = header_str(&headers, SPILL_DETECTED_HEADER)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    state.uploads.ingest(body, spill_detected).await?;
    Ok("Frame received")
}

async fn start_stream(
    State(state): State<AppState>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<StreamControlResponse>> {
    require_secret(&state, req.password.as_deref(), "stream start")?;
    state.frames.set_active(true).await;
    Ok(Json(StreamControlResponse::started()))
}

async fn stop_stream(
    State(state): State<AppState>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<StreamControlResponse>> {
    require_secret(&state, req.password.as_deref(), "stream stop")?;
    state.frames.set_active(false).await;
    Ok(Json(StreamControlResponse::stopped()))
}
