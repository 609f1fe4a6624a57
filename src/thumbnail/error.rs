//! Failure taxonomy reported through the thumbnail completion event.

use crate::decode::DecodeError;

/// Why a thumbnail request produced no image
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Video source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Seek time {requested}s is outside the video (duration {})", fmt_duration(.duration))]
    SeekOutOfRange {
        requested: f64,         // seconds
        duration: Option<f64>,  // seconds, when known
    },
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    #[error("Invalid thumbnail request: {0}")]
    InvalidRequest(String),
    #[error("Thumbnail request cancelled")]
    Cancelled,
    #[error("Thumbnail request superseded by a newer request")]
    Superseded,
}

fn fmt_duration(duration: &Option<f64>) -> String {
    match duration {
        Some(seconds) => format!("{}s", seconds),
        None => "unknown".to_string(),
    }
}

impl ThumbnailError {
    /// Cancelled and superseded requests were abandoned, not failed
    pub fn is_abandoned(&self) -> bool {
        matches!(self, ThumbnailError::Cancelled | ThumbnailError::Superseded)
    }
}

impl From<DecodeError> for ThumbnailError {
    fn from(err: DecodeError) -> Self {
        if matches!(err, DecodeError::Cancelled) {
            ThumbnailError::Cancelled
        } else if err.is_source_error() {
            ThumbnailError::SourceUnavailable(err.to_string())
        } else {
            ThumbnailError::DecodeFailed(err.to_string())
        }
    }
}
