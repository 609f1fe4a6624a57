//! Stream metadata extracted from a media file when it is opened.

use crate::core::time::Time;

/// Video stream information
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInfo {
    pub index: usize,
    pub codec_name: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Duration in nanoseconds; `None` for live or unseekable inputs
    pub duration: Option<Time>,
}

impl VideoStreamInfo {
    /// Whether `at` lies inside the stream. Unknown durations accept any
    /// non-negative time; the end point itself is inclusive.
    pub fn contains(&self, at: Time) -> bool {
        if at < 0 {
            return false;
        }
        match self.duration {
            Some(duration) => at <= duration,
            None => true,
        }
    }
}
