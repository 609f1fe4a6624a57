//! Video thumbnail view.
//!
//! Give a [`ThumbnailView`] a video source and a seek time, call
//! [`ThumbnailView::generate_thumbnail`], and receive exactly one
//! [`ThumbnailEvent`] carrying an RGBA8 [`ThumbnailImage`] or a
//! [`ThumbnailError`]. Frames are extracted with FFmpeg on a worker pool.

pub mod config;
pub mod core;
pub mod decode;
pub mod logging;
pub mod thumbnail;

pub use config::{Config, ConfigError, GeneratorConfig, ViewConfig};
pub use decode::{FfmpegSource, FitMode, FrameDecoder, FrameSource, VideoSource};
pub use thumbnail::{
    CancellationToken, PendingThumbnail, RequestId, ThumbnailError, ThumbnailEvent,
    ThumbnailGenerator, ThumbnailImage, ThumbnailRequest, ThumbnailView,
};
