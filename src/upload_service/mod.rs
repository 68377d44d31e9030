//! UploadService - Camera Frame Ingestion
//!
//! ## Responsibilities
//!
//! - Decode the uploaded body
//! - Feed the spill flag into the alert state machine
//! - Publish the frame to the FrameStore
//!
//! Steps run in that order so any failure leaves both the store and the
//! alert state exactly as they were before the upload.

use crate::error::Result;
use crate::frame_codec;
use crate::frame_store::FrameStore;
use crate::spill_alert::{SpillAlertService, SpillEvent};
use bytes::Bytes;
use std::sync::Arc;

/// Outcome of an accepted upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub width: u32,
    pub height: u32,
    /// Set when this upload raised a spill alert
    pub spill_event: Option<SpillEvent>,
}

/// UploadService instance
pub struct UploadService {
    frames: Arc<FrameStore>,
    alerts: Arc<SpillAlertService>,
}

impl UploadService {
    pub fn new(frames: Arc<FrameStore>, alerts: Arc<SpillAlertService>) -> Self {
        Self { frames, alerts }
    }

    /// Ingest one uploaded frame
    pub async fn ingest(&self, body: Bytes, spill_detected: bool) -> Result<UploadOutcome> {
        let size = body.len();
        let frame = frame_codec::decode_required(body).await?;
        let spill_event = self.alerts.evaluate(spill_detected, &frame).await?;

        let outcome = UploadOutcome {
            width: frame.width(),
            height: frame.height(),
            spill_event,
        };
        self.frames.write(frame).await;

        tracing::trace!(
            size = size,
            width = outcome.width,
            height = outcome.height,
            spill_detected = spill_detected,
            "Frame ingested"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frame_codec::test_support::solid_jpeg;
    use crate::spill_alert::{FrameArchive, SpillState};

    async fn setup(dir: &std::path::Path) -> (UploadService, Arc<FrameStore>, Arc<SpillAlertService>) {
        let frames = Arc::new(FrameStore::default());
        let archive = FrameArchive::new(dir.to_path_buf(), 80).await.unwrap();
        let alerts = Arc::new(SpillAlertService::new(archive));
        (UploadService::new(frames.clone(), alerts.clone()), frames, alerts)
    }

    #[tokio::test]
    async fn test_ingest_publishes_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let (uploads, frames, alerts) = setup(tmp.path()).await;

        let outcome = uploads
            .ingest(Bytes::from(solid_jpeg(24, 16, [50, 60, 70])), false)
            .await
            .unwrap();

        assert_eq!((outcome.width, outcome.height), (24, 16));
        assert!(outcome.spill_event.is_none());
        assert!(frames.is_active().await);
        assert!(frames.snapshot().await.unwrap().is_some());
        assert_eq!(alerts.state().await, (SpillState::Idle, 0));
    }

    #[tokio::test]
    async fn test_malformed_body_changes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let (uploads, frames, alerts) = setup(tmp.path()).await;

        let err = uploads
            .ingest(Bytes::from_static(b"not a jpeg"), true)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidImage(_)));
        let status = frames.status().await;
        assert!(!status.active);
        assert!(status.last_update.is_none());
        assert_eq!(frames.frames_received().await, 0);
        assert_eq!(alerts.state().await, (SpillState::Idle, 0));
    }

    #[tokio::test]
    async fn test_failed_spill_save_keeps_previous_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("spills");
        let (uploads, frames, alerts) = setup(&dir).await;

        uploads
            .ingest(Bytes::from(solid_jpeg(8, 8, [0, 0, 0])), false)
            .await
            .unwrap();
        let before = frames.status().await.last_update;

        std::fs::remove_dir_all(&dir).unwrap();
        assert!(uploads
            .ingest(Bytes::from(solid_jpeg(8, 8, [255, 255, 255])), true)
            .await
            .is_err());

        assert_eq!(frames.status().await.last_update, before);
        assert_eq!(frames.frames_received().await, 1);
        assert_eq!(alerts.state().await, (SpillState::Idle, 0));
    }

    #[tokio::test]
    async fn test_spill_flag_raises_event_once() {
        let tmp = tempfile::tempdir().unwrap();
        let (uploads, _frames, alerts) = setup(tmp.path()).await;
        let jpeg = Bytes::from(solid_jpeg(8, 8, [10, 10, 10]));

        let first = uploads.ingest(jpeg.clone(), true).await.unwrap();
        let second = uploads.ingest(jpeg, true).await.unwrap();

        assert!(first.spill_event.is_some());
        assert!(second.spill_event.is_none());
        assert_eq!(alerts.state().await, (SpillState::Alerting, 1));
    }
}
