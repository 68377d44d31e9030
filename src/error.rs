//! Error handling for the SpillCam relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Shared secret mismatch
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Upload body is not a decodable image
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// Stream stopped or no frame received yet
    #[error("No active stream: {0}")]
    NotActive(String),

    /// IO error (spill frame persistence)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Internal(format!("codec task failed: {}", e))
    }
}

impl Error {
    /// Status code, machine-readable code and caller-facing message
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            Error::InvalidImage(msg) => (StatusCode::BAD_REQUEST, "INVALID_IMAGE", msg.clone()),
            Error::NotActive(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NO_ACTIVE_STREAM",
                msg.clone(),
            ),
            Error::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", e.to_string()),
            Error::Image(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IMAGE_ERROR",
                e.to_string(),
            ),
            Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        match &self {
            Error::Unauthorized(_) => tracing::warn!(
                status = %status,
                error_code = %error_code,
                message = %message,
                "Rejected request"
            ),
            // Expected while the camera is offline
            Error::NotActive(_) => {}
            _ => tracing::error!(
                status = %status,
                error_code = %error_code,
                message = %message,
                "Request error"
            ),
        }

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (Error::InvalidImage("x".into()), StatusCode::BAD_REQUEST),
            (Error::NotActive("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_message_surfaces() {
        let (_, code, message) = Error::Internal("disk full".into()).parts();
        assert_eq!(code, "INTERNAL_ERROR");
        assert_eq!(message, "disk full");
    }
}
