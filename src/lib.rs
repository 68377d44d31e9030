//! SpillCam Relay Library
//!
//! Relays JPEG frames pushed by a remote camera to browser viewers and keeps
//! an oil spill event log driven by the camera's own detection flag.
//!
//! ## Architecture
//!
//! 1. FrameCodec - JPEG decode/encode
//! 2. FrameStore - Latest frame, liveness flag, last update time
//! 3. SpillAlertService - Rising-edge spill alerts + event history
//! 4. MjpegStream - Paced multipart stream per viewer
//! 5. UploadService - Decode -> alert -> publish
//! 6. WebAPI - HTTP routes
//!
//! ## Data Flow
//!
//! camera -> auth -> decode -> alert + FrameStore -> snapshot / stream -> encode -> viewer

pub mod camera_auth;
pub mod error;
pub mod frame_codec;
pub mod frame_store;
pub mod mjpeg_stream;
pub mod models;
pub mod spill_alert;
pub mod state;
pub mod upload_service;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
