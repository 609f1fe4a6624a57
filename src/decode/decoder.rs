//! Frame-extraction seam.
//! `FrameSource` opens a video, `FrameDecoder` pulls one scaled RGBA8 frame out of it.
//! The FFmpeg backend lives in `decode::ffmpeg`; tests plug in synthetic sources.

use std::path::PathBuf;

use crate::core::time::Time;
use crate::decode::scale::FitMode;
use crate::decode::source::VideoSource;
use crate::decode::stream_info::VideoStreamInfo;

/// Error type for decoding operations
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("FFmpeg error: {0}")]
    FFmpeg(String),
    #[error("Invalid video source: {0}")]
    InvalidSource(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to open {location}: {reason}")]
    OpenFailed { location: String, reason: String },
    #[error("No video stream found")]
    NoVideoStream,
    #[error("Failed to open codec: {0}")]
    CodecOpenFailed(String),
    #[error("Seek failed: {0}")]
    SeekFailed(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Scaling failed: {0}")]
    Scale(String),
    #[error("No frame decoded at {0}ns")]
    NoFrame(Time),
    #[error("Decoding cancelled")]
    Cancelled,
}

impl DecodeError {
    /// Whether the error means the source itself could not be reached or read,
    /// as opposed to a failure while decoding its content.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidSource(_)
                | DecodeError::FileNotFound(_)
                | DecodeError::OpenFailed { .. }
                | DecodeError::NoVideoStream
        )
    }
}

/// Decoded video frame (RGBA8, tightly packed)
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub data: Vec<u8>,      // width * height * 4 bytes
    pub width: u32,
    pub height: u32,
    pub timestamp: Time,    // Presentation timestamp in nanoseconds
}

/// Opens video sources. Shared by every worker thread.
pub trait FrameSource: Send + Sync {
    fn open(&self, source: &VideoSource) -> Result<Box<dyn FrameDecoder>, DecodeError>;
}

/// An open video, owned by a single extraction job.
pub trait FrameDecoder: Send {
    /// Metadata of the selected video stream
    fn info(&self) -> &VideoStreamInfo;

    /// Decode the first frame presented at or after `at` (or the last frame of
    /// the stream when `at` is past the final frame's pts) and fit it into
    /// `width`×`height`.
    ///
    /// `cancelled` is polled while packets are read; once it returns true the
    /// call gives up with `DecodeError::Cancelled`.
    fn decode_frame_at(
        &mut self,
        at: Time,
        width: u32,
        height: u32,
        fit: FitMode,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<VideoFrame, DecodeError>;
}
