pub mod decoder;
pub mod ffmpeg;
pub mod scale;
pub mod source;
pub mod stream_info;

pub use decoder::{DecodeError, FrameDecoder, FrameSource, VideoFrame};
pub use ffmpeg::{FfmpegDecoder, FfmpegSource};
pub use scale::{FitMode, ScalePlan};
pub use source::VideoSource;
pub use stream_info::VideoStreamInfo;
