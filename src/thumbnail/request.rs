//! Immutable thumbnail request.
//! Everything a job needs is captured when the request is built, so later
//! changes to a view's properties never race with work already in flight.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::time::{self, Time};
use crate::decode::{FitMode, VideoSource};
use crate::thumbnail::error::ThumbnailError;

/// Largest accepted thumbnail edge, in pixels
pub const MAX_DIMENSION: u32 = 8192;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn next() -> Self {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One (source, seek time) pair plus output settings
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailRequest {
    id: RequestId,
    source: VideoSource,
    seek_time_seconds: f64,
    width: u32,
    height: u32,
    show_thumbnail: bool,
    fit: FitMode,
}

impl ThumbnailRequest {
    pub fn builder(source: impl Into<String>, seek_time_seconds: f64) -> ThumbnailRequestBuilder {
        ThumbnailRequestBuilder {
            id: None,
            source: source.into(),
            seek_time_seconds,
            width: 160.0,
            height: 90.0,
            show_thumbnail: true,
            fit: FitMode::default(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    pub fn seek_time_seconds(&self) -> f64 {
        self.seek_time_seconds
    }

    /// Seek time in nanoseconds
    pub fn seek_time(&self) -> Time {
        time::from_seconds(self.seek_time_seconds)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn show_thumbnail(&self) -> bool {
        self.show_thumbnail
    }

    pub fn fit(&self) -> FitMode {
        self.fit
    }
}

/// Collects raw property values and validates them in `build`
#[derive(Debug, Clone)]
pub struct ThumbnailRequestBuilder {
    id: Option<RequestId>,
    source: String,
    seek_time_seconds: f64,
    width: f32,
    height: f32,
    show_thumbnail: bool,
    fit: FitMode,
}

impl ThumbnailRequestBuilder {
    /// Use a pre-allocated id instead of drawing a fresh one
    pub fn id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn show_thumbnail(mut self, show: bool) -> Self {
        self.show_thumbnail = show;
        self
    }

    pub fn fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    pub fn build(self) -> Result<ThumbnailRequest, ThumbnailError> {
        let source = VideoSource::parse(&self.source)?;

        let seek = self.seek_time_seconds;
        if !seek.is_finite() || seek < 0.0 {
            return Err(ThumbnailError::SeekOutOfRange { requested: seek, duration: None });
        }

        let width = pixel_dimension("width", self.width)?;
        let height = pixel_dimension("height", self.height)?;

        Ok(ThumbnailRequest {
            id: self.id.unwrap_or_else(RequestId::next),
            source,
            seek_time_seconds: seek,
            width,
            height,
            show_thumbnail: self.show_thumbnail,
            fit: self.fit,
        })
    }
}

/// Round a float dimension to whole pixels, rejecting values that round to nothing
fn pixel_dimension(name: &str, value: f32) -> Result<u32, ThumbnailError> {
    if !value.is_finite() {
        return Err(ThumbnailError::InvalidRequest(format!("thumbnail {name} is not a number")));
    }
    let pixels = value.round();
    if pixels < 1.0 {
        return Err(ThumbnailError::InvalidRequest(format!(
            "thumbnail {name} must be at least 1px, got {value}"
        )));
    }
    if pixels > MAX_DIMENSION as f32 {
        return Err(ThumbnailError::InvalidRequest(format!(
            "thumbnail {name} {value} exceeds {MAX_DIMENSION}px"
        )));
    }
    Ok(pixels as u32)
}
