//! Application state
//!
//! Holds all shared components and state

use crate::camera_auth::{SharedSecret, DEFAULT_SECRET};
use crate::error::Result;
use crate::frame_codec::DEFAULT_JPEG_QUALITY;
use crate::frame_store::FrameStore;
use crate::mjpeg_stream::DEFAULT_INTERVAL;
use crate::spill_alert::{FrameArchive, SpillAlertService};
use crate::upload_service::UploadService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shared secret for camera uploads and stream control
    pub camera_password: SharedSecret,
    /// Server port
    pub port: u16,
    /// Server host
    pub host: String,
    /// Directory for frames that raised a spill alert
    pub spill_frame_dir: PathBuf,
    /// JPEG quality for snapshots, stream parts and saved frames
    pub jpeg_quality: u8,
    /// Minimum delay between MJPEG parts
    pub stream_interval: Duration,
    /// Upload body limit in bytes
    pub max_upload_bytes: usize,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera_password: SharedSecret::new(
                std::env::var("CAMERA_PASSWORD").unwrap_or_else(|_| DEFAULT_SECRET.to_string()),
            ),
            port: env_parse("PORT").unwrap_or(5000),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            spill_frame_dir: std::env::var("SPILL_FRAME_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("oil_spill_frames")),
            jpeg_quality: env_parse::<u8>("JPEG_QUALITY")
                .unwrap_or(DEFAULT_JPEG_QUALITY)
                .clamp(1, 100),
            stream_interval: env_parse::<u64>("STREAM_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_INTERVAL),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES").unwrap_or(16 * 1024 * 1024),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// FrameStore (latest frame)
    pub frames: Arc<FrameStore>,
    /// SpillAlertService (edge detection + event history)
    pub alerts: Arc<SpillAlertService>,
    /// UploadService (decode -> alert -> publish)
    pub uploads: Arc<UploadService>,
}

impl AppState {
    /// Build all components, creating the spill frame directory
    pub async fn new(config: AppConfig) -> Result<Self> {
        let frames = Arc::new(FrameStore::new(config.jpeg_quality));
        let archive = FrameArchive::new(config.spill_frame_dir.clone(), config.jpeg_quality).await?;
        let alerts = Arc::new(SpillAlertService::new(archive));
        let uploads = Arc::new(UploadService::new(frames.clone(), alerts.clone()));

        Ok(Self {
            config,
            frames,
            alerts,
            uploads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_creates_spill_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("spills");
        let config = AppConfig {
            spill_frame_dir: dir.clone(),
            ..AppConfig::default()
        };

        let state = AppState::new(config).await.unwrap();
        assert!(dir.is_dir());
        assert!(!state.frames.is_active().await);
        assert_eq!(state.alerts.archive().dir(), dir.as_path());
    }
}
