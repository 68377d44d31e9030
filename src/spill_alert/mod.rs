//! SpillAlertService - Oil Spill Detection Event Log
//!
//! ## Responsibilities
//!
//! - Track the spill flag reported by the camera with every upload
//! - Detect the rising edge (Idle -> Alerting) and persist the triggering frame
//! - Keep an append-only, in-memory event history
//!
//! Detection itself happens on the camera; this module only records the signal.

mod archive;

pub use archive::FrameArchive;

use crate::error::Result;
use crate::frame_codec::Frame;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Label shown while a spill is being reported
pub const LABEL_ALERTING: &str = "OIL SPILL DETECTED";
/// Label shown otherwise
pub const LABEL_NORMAL: &str = "Normal";

/// Alert state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpillState {
    /// No spill reported by the last upload
    #[default]
    Idle,
    /// Last upload reported a spill
    Alerting,
}

/// Result of feeding one signal into the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpillTransition {
    /// Idle -> Alerting, the only transition that records an event
    Raised,
    /// Alerting -> Alerting
    Held,
    /// Alerting -> Idle
    Cleared,
    /// Idle -> Idle
    Quiet,
}

impl SpillState {
    /// Next state and transition for a detection signal
    pub fn on_signal(self, detected: bool) -> (SpillState, SpillTransition) {
        match (self, detected) {
            (SpillState::Idle, true) => (SpillState::Alerting, SpillTransition::Raised),
            (SpillState::Alerting, true) => (SpillState::Alerting, SpillTransition::Held),
            (SpillState::Alerting, false) => (SpillState::Idle, SpillTransition::Cleared),
            (SpillState::Idle, false) => (SpillState::Idle, SpillTransition::Quiet),
        }
    }

    pub fn is_alerting(self) -> bool {
        self == SpillState::Alerting
    }

    pub fn label(self) -> &'static str {
        match self {
            SpillState::Idle => LABEL_NORMAL,
            SpillState::Alerting => LABEL_ALERTING,
        }
    }
}

/// Recorded spill detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpillEvent {
    /// Compact, filesystem-safe UTC timestamp
    pub timestamp: String,
    /// RFC 3339 timestamp
    pub iso_timestamp: String,
    /// Saved frame location
    pub frame_path: String,
}

/// Compact timestamp used in event records and file names
pub fn compact_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// Detection summary view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub current_status: String,
    pub total_events: usize,
    pub last_detection: Option<String>,
}

#[derive(Default)]
struct AlertLog {
    state: SpillState,
    history: Vec<SpillEvent>,
}

/// SpillAlertService instance
pub struct SpillAlertService {
    log: Mutex<AlertLog>,
    archive: FrameArchive,
}

impl SpillAlertService {
    pub fn new(archive: FrameArchive) -> Self {
        Self {
            log: Mutex::new(AlertLog::default()),
            archive,
        }
    }

    /// Feed the camera's spill flag for a frame
    ///
    /// Returns the new event on a rising edge. The transition, the frame
    /// write and the history append happen under one lock; if the frame
    /// cannot be saved the state is left as it was.
    pub async fn evaluate(&self, detected: bool, frame: &Frame) -> Result<Option<SpillEvent>> {
        let mut log = self.log.lock().await;
        let (next, transition) = log.state.on_signal(detected);

        let event = match transition {
            SpillTransition::Raised => {
                let now = Utc::now();
                let stamp = compact_timestamp(now);
                let path = self.archive.save(frame, &stamp).await?;

                let event = SpillEvent {
                    timestamp: stamp,
                    iso_timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
                    frame_path: path.display().to_string(),
                };
                log.history.push(event.clone());

                tracing::warn!(
                    timestamp = %event.timestamp,
                    frame_path = %event.frame_path,
                    total_events = log.history.len(),
                    "Oil spill detected"
                );
                Some(event)
            }
            SpillTransition::Cleared => {
                tracing::info!("Oil spill no longer reported");
                None
            }
            SpillTransition::Held | SpillTransition::Quiet => None,
        };

        log.state = next;
        Ok(event)
    }

    /// All events in chronological order
    pub async fn events(&self) -> Vec<SpillEvent> {
        self.log.lock().await.history.clone()
    }

    /// Current state and event count, read together
    pub async fn state(&self) -> (SpillState, usize) {
        let log = self.log.lock().await;
        (log.state, log.history.len())
    }

    pub async fn is_active(&self) -> bool {
        self.log.lock().await.state.is_alerting()
    }

    pub async fn summary(&self) -> DetectionSummary {
        let log = self.log.lock().await;
        DetectionSummary {
            current_status: log.state.label().to_string(),
            total_events: log.history.len(),
            last_detection: log.history.last().map(|e| e.iso_timestamp.clone()),
        }
    }

    pub fn archive(&self) -> &FrameArchive {
        &self.archive
    }
}
