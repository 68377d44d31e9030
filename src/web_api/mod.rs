//! WebAPI - HTTP Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP routes for viewers and the camera client
//! - Credential checks
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};

use crate::models::StatusResponse;
use crate::state::AppState;

/// Liveness text
pub async fn index() -> &'static str {
    "Video Streaming Server is running"
}

fn unix_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Stream and detection status
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let frame = state.frames.status().await;
    let (spill, event_count) = state.alerts.state().await;

    Json(StatusResponse {
        stream_active: frame.active,
        last_frame_time: frame.last_update.map(unix_seconds).unwrap_or(0.0),
        frame_age_seconds: frame.age_seconds,
        server_time: unix_seconds(Utc::now()),
        oil_spill_detected: spill.is_alerting(),
        oil_spill_events: event_count,
    })
}
