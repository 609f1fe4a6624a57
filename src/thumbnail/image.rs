//! Thumbnail image payload.

use crate::core::time::{self, Time};
use crate::decode::scale::RGBA_BYTES;
use crate::decode::VideoFrame;

/// Decoded RGBA8 bitmap of one video frame
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    timestamp: Time,  // pts of the decoded frame (nanoseconds)
    requested: Time,  // seek time that was asked for (nanoseconds)
}

impl ThumbnailImage {
    pub fn from_frame(frame: VideoFrame, requested: Time) -> Self {
        debug_assert_eq!(
            frame.data.len(),
            frame.width as usize * frame.height as usize * RGBA_BYTES
        );
        Self {
            data: frame.data,
            width: frame.width,
            height: frame.height,
            timestamp: frame.timestamp,
            requested,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA8 rows, top to bottom
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn timestamp(&self) -> Time {
        self.timestamp
    }

    pub fn requested(&self) -> Time {
        self.requested
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// RGBA value at (x, y), or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * RGBA_BYTES;
        let px = &self.data[i..i + RGBA_BYTES];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Clock label for the requested position, e.g. `0:02` or `1:01:01`
    pub fn label(&self) -> String {
        time::format_clock(self.requested)
    }
}
