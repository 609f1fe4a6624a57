//! Thumbnail generation: request, worker pool and the view that owns them.

pub mod cancel;
pub mod error;
pub mod generator;
pub mod image;
pub mod request;
pub mod view;

pub use cancel::CancellationToken;
pub use error::ThumbnailError;
pub use generator::{PendingThumbnail, ThumbnailEvent, ThumbnailGenerator, ThumbnailResult};
pub use image::ThumbnailImage;
pub use request::{RequestId, ThumbnailRequest, ThumbnailRequestBuilder, MAX_DIMENSION};
pub use view::{ReadyCallback, ThumbnailView};
