//! FrameStore - Latest Frame Holder
//!
//! ## Responsibilities
//!
//! - Hold the single most recent decoded camera frame
//! - Track the stream liveness flag and last update time
//! - Hand out consistent samples to snapshot, stream and status readers
//!
//! Only the upload path and start/stop control write; every reader takes
//! the read lock, clones the `Arc`-backed frame and encodes after release.

use crate::error::Result;
use crate::frame_codec::{self, Frame};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// What a reader observed under the lock
#[derive(Debug, Clone)]
pub enum FrameSample {
    /// Stream is stopped
    Inactive,
    /// Stream is active but no frame was received yet
    Empty,
    /// Current frame
    Ready(Frame),
}

/// Read-only status view
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStatus {
    pub active: bool,
    pub last_update: Option<DateTime<Utc>>,
    /// Seconds since the last accepted frame, `None` before the first one
    pub age_seconds: Option<f64>,
}

#[derive(Default)]
struct FrameSlot {
    current: Option<Frame>,
    active: bool,
    last_update: Option<DateTime<Utc>>,
    frames_received: u64,
}

/// FrameStore instance
pub struct FrameStore {
    slot: RwLock<FrameSlot>,
    jpeg_quality: u8,
}

impl FrameStore {
    /// Create an empty, inactive store
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            slot: RwLock::new(FrameSlot::default()),
            jpeg_quality,
        }
    }

    /// Replace the current frame and mark the stream active
    pub async fn write(&self, frame: Frame) {
        let mut slot = self.slot.write().await;
        slot.current = Some(frame);
        slot.active = true;
        slot.last_update = Some(Utc::now());
        slot.frames_received += 1;

        tracing::trace!(frames_received = slot.frames_received, "Frame stored");
    }

    /// Sample the store without encoding
    pub async fn sample(&self) -> FrameSample {
        let slot = self.slot.read().await;
        if !slot.active {
            return FrameSample::Inactive;
        }
        match &slot.current {
            Some(frame) => FrameSample::Ready(frame.clone()),
            None => FrameSample::Empty,
        }
    }

    /// JPEG bytes of the current frame, `None` if inactive or empty
    pub async fn snapshot(&self) -> Result<Option<Bytes>> {
        match self.sample().await {
            FrameSample::Ready(frame) => {
                let jpeg = frame_codec::encode_blocking(frame, self.jpeg_quality).await?;
                Ok(Some(jpeg))
            }
            FrameSample::Inactive | FrameSample::Empty => Ok(None),
        }
    }

    /// Liveness and frame age
    pub async fn status(&self) -> FrameStatus {
        let slot = self.slot.read().await;
        let age_seconds = slot.last_update.map(|t| {
            let elapsed = Utc::now().signed_duration_since(t);
            let micros = elapsed.num_microseconds().unwrap_or(i64::MAX);
            (micros as f64 / 1_000_000.0).max(0.0)
        });

        FrameStatus {
            active: slot.active,
            last_update: slot.last_update,
            age_seconds,
        }
    }

    /// Explicit start/stop, independent of frame presence
    pub async fn set_active(&self, active: bool) {
        let mut slot = self.slot.write().await;
        if slot.active != active {
            tracing::info!(active = active, "Stream state changed");
        }
        slot.active = active;
    }

    pub async fn is_active(&self) -> bool {
        self.slot.read().await.active
    }

    /// Number of frames accepted since startup
    pub async fn frames_received(&self) -> u64 {
        self.slot.read().await.frames_received
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(frame_codec::DEFAULT_JPEG_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_codec::test_support::solid_frame;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fresh_store_is_inactive() {
        let store = FrameStore::default();
        assert!(!store.is_active().await);
        assert!(matches!(store.sample().await, FrameSample::Inactive));
        assert!(store.snapshot().await.unwrap().is_none());

        let status = store.status().await;
        assert!(!status.active);
        assert!(status.last_update.is_none());
        assert!(status.age_seconds.is_none());
    }

    #[tokio::test]
    async fn test_write_activates_and_snapshot_encodes() {
        let store = FrameStore::default();
        store.write(solid_frame(20, 10, [0, 128, 255])).await;

        assert!(store.is_active().await);
        let jpeg = store.snapshot().await.unwrap().expect("frame available");
        let decoded = frame_codec::decode(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
        assert_eq!(store.frames_received().await, 1);
    }

    #[tokio::test]
    async fn test_stop_hides_frame_until_restarted() {
        let store = FrameStore::default();
        store.write(solid_frame(4, 4, [1, 1, 1])).await;

        store.set_active(false).await;
        assert!(matches!(store.sample().await, FrameSample::Inactive));
        assert!(store.snapshot().await.unwrap().is_none());

        store.set_active(true).await;
        assert!(matches!(store.sample().await, FrameSample::Ready(_)));
    }

    #[tokio::test]
    async fn test_start_without_frame_is_empty() {
        let store = FrameStore::default();
        store.set_active(true).await;
        assert!(matches!(store.sample().await, FrameSample::Empty));
        assert!(store.snapshot().await.unwrap().is_none());
        assert!(store.status().await.last_update.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_never_tear() {
        let store = Arc::new(FrameStore::default());
        let frames: Vec<Frame> = (0..16u8)
            .map(|i| solid_frame(8, 8, [i * 10, 255 - i * 10, i]))
            .collect();

        let mut handles = Vec::new();
        for frame in frames.iter().cloned() {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.write(frame).await }));
        }
        for _ in 0..16 {
            let store = store.clone();
            let frames = frames.clone();
            handles.push(tokio::spawn(async move {
                if let FrameSample::Ready(seen) = store.sample().await {
                    assert!(frames.iter().any(|f| f.same_buffer(&seen)));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        match store.sample().await {
            FrameSample::Ready(last) => assert!(frames.iter().any(|f| f.same_buffer(&last))),
            other => panic!("expected a frame, got {:?}", other),
        }
        assert_eq!(store.frames_received().await, 16);
    }

    #[tokio::test]
    async fn test_frame_age_grows_without_uploads() {
        let store = FrameStore::default();
        store.write(solid_frame(2, 2, [0, 0, 0])).await;

        let first = store.status().await.age_seconds.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = store.status().await.age_seconds.unwrap();

        assert!(first >= 0.0);
        assert!(second > first);
    }
}
