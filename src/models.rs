//! Shared request/response models

use serde::{Deserialize, Serialize};

/// `/api/status` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub stream_active: bool,
    /// Unix seconds of the last accepted frame, 0 before the first one
    pub last_frame_time: f64,
    pub frame_age_seconds: Option<f64>,
    /// Unix seconds
    pub server_time: f64,
    pub oil_spill_detected: bool,
    pub oil_spill_events: usize,
}

/// Start/stop request body
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Start/stop response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamControlResponse {
    pub status: String,
}

impl StreamControlResponse {
    pub fn started() -> Self {
        Self {
            status: "Stream started".to_string(),
        }
    }

    pub fn stopped() -> Self {
        Self {
            status: "Stream stopped".to_string(),
        }
    }
}
