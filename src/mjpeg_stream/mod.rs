//! MjpegStream - Multipart JPEG Stream Generator
//!
//! ## Responsibilities
//!
//! - Sample the FrameStore at a fixed cadence for one viewer
//! - Wrap each encoded frame in `multipart/x-mixed-replace` framing
//! - End the body once the stream is stopped
//!
//! Every viewer owns its own ticker and reads the store fresh on each tick,
//! so a slow viewer never holds up uploads or other viewers.

use crate::error::{Error, Result};
use crate::frame_codec;
use crate::frame_store::{FrameSample, FrameStore};
use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::{BufMut, Bytes, BytesMut};
use futures::{stream, Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Multipart boundary
pub const BOUNDARY: &str = "frame";

/// Response content type
pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// Default minimum delay between parts (~30 fps)
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(33);

/// Frame one JPEG as a multipart part
pub fn frame_part(jpeg: &[u8]) -> Bytes {
    let preamble = format!("--{}\r\nContent-Type: image/jpeg\r\n\r\n", BOUNDARY);
    let mut part = BytesMut::with_capacity(preamble.len() + jpeg.len() + 2);
    part.put_slice(preamble.as_bytes());
    part.put_slice(jpeg);
    part.put_slice(b"\r\n");
    part.freeze()
}

/// Per-viewer stream over the FrameStore
pub struct MjpegStream {
    store: Arc<FrameStore>,
    ticker: Interval,
}

impl MjpegStream {
    /// Open a stream for one viewer
    ///
    /// Fails with [`Error::NotActive`] if the stream is stopped right now.
    pub async fn open(store: Arc<FrameStore>, period: Duration) -> Result<Self> {
        if !store.is_active().await {
            return Err(Error::NotActive("No active stream".to_string()));
        }

        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(period_ms = period.as_millis() as u64, "MJPEG stream opened");
        Ok(Self { store, ticker })
    }

    /// Multipart parts until the store becomes inactive
    ///
    /// The first part is emitted immediately; later parts wait for the next tick.
    /// Ticks where no frame is available (or it fails to encode) emit nothing.
    pub fn into_stream(self) -> impl Stream<Item = Bytes> + Send + 'static {
        stream::unfold(self, |mut this| async move {
            loop {
                this.ticker.tick().await;

                let frame = match this.store.sample().await {
                    FrameSample::Inactive => {
                        tracing::debug!("MJPEG stream closed (stream inactive)");
                        return None;
                    }
                    FrameSample::Empty => continue,
                    FrameSample::Ready(frame) => frame,
                };

                match frame_codec::encode_blocking(frame, this.store.jpeg_quality()).await {
                    Ok(jpeg) => return Some((frame_part(&jpeg), this)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping frame that failed to encode");
                    }
                }
            }
        })
    }

    /// Streaming HTTP response
    pub fn into_response(self) -> Response {
        let body = Body::from_stream(self.into_stream().map(Ok::<_, Infallible>));

        (
            [
                (header::CONTENT_TYPE, CONTENT_TYPE),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
                (header::PRAGMA, "no-cache"),
                (header::EXPIRES, "0"),
            ],
            body,
        )
            .into_response()
    }
}
