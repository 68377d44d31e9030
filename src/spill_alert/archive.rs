//! Spill frame archive
//!
//! Writes the frame that raised a spill alert as a JPEG file.

use crate::error::Result;
use crate::frame_codec::{self, Frame};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory of persisted spill frames
#[derive(Debug, Clone)]
pub struct FrameArchive {
    dir: PathBuf,
    jpeg_quality: u8,
}

impl FrameArchive {
    /// Create archive, creating the directory if it doesn't exist
    pub async fn new(dir: PathBuf, jpeg_quality: u8) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir, jpeg_quality })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target file for a compact timestamp
    pub fn path_for(&self, stamp: &str) -> PathBuf {
        self.dir.join(format!("oil_spill_{}.jpg", stamp))
    }

    /// Encode and write the frame, returning the file path
    pub async fn save(&self, frame: &Frame, stamp: &str) -> Result<PathBuf> {
        let path = self.path_for(stamp);
        let jpeg = frame_codec::encode_blocking(frame.clone(), self.jpeg_quality).await?;
        fs::write(&path, &jpeg).await?;

        tracing::debug!(
            path = %path.display(),
            size = jpeg.len(),
            "Spill frame saved"
        );

        Ok(path)
    }
}
