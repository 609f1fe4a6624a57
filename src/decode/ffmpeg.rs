//! FFmpeg-backed frame extraction.
//! Opens a local file or URL, seeks to the nearest keyframe at or before the
//! target, decodes forward to the requested pts and scales to RGBA8.

use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling;
use ffmpeg::{codec, format, frame, media};
use tracing::{debug, trace};

use crate::core::time::{self, Time};
use crate::decode::decoder::{DecodeError, FrameDecoder, FrameSource, VideoFrame};
use crate::decode::scale::{crop_rgba, fit_dimensions, FitMode};
use crate::decode::source::VideoSource;
use crate::decode::stream_info::VideoStreamInfo;

/// FFmpeg's internal time base (microseconds), used by container-level durations and seeks
const AV_TIME_BASE: i32 = 1_000_000;

/// AV_NOPTS_VALUE
const NO_PTS: i64 = i64::MIN;

/// `FrameSource` that opens videos through libavformat
#[derive(Debug, Clone, Copy)]
pub struct FfmpegSource;

impl FfmpegSource {
    /// Initialize FFmpeg. Safe to call more than once.
    pub fn new() -> Result<Self, DecodeError> {
        ffmpeg::init().map_err(|e| DecodeError::FFmpeg(format!("FFmpeg init failed: {}", e)))?;
        ffmpeg::log::set_level(ffmpeg::log::Level::Error);
        Ok(Self)
    }
}

impl FrameSource for FfmpegSource {
    fn open(&self, source: &VideoSource) -> Result<Box<dyn FrameDecoder>, DecodeError> {
        Ok(Box::new(FfmpegDecoder::open(source)?))
    }
}

/// Maps between stream timestamps and time measured from the first frame.
/// MPEG-TS, HLS and some MP4s start well after pts 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StreamClock {
    start_pts: i64,  // stream time-base units
    num: i32,
    den: i32,
}

impl StreamClock {
    fn new(start_time: i64, num: i32, den: i32) -> Self {
        let start_pts = if start_time == NO_PTS { 0 } else { start_time };
        Self { start_pts, num, den }
    }

    /// Stream pts of the frame presented `at` into the video
    fn to_pts(&self, at: Time) -> i64 {
        self.start_pts + nanos_to_pts(at, self.num, self.den)
    }

    /// Offset of a decoded pts from the start of the video
    fn to_nanos(&self, pts: i64) -> Time {
        pts_to_nanos(pts - self.start_pts, self.num, self.den)
    }

    /// Container-level seek target (AV_TIME_BASE units) for `at`
    fn seek_micros(&self, at: Time) -> i64 {
        time::to_micros(at) + time::to_micros(pts_to_nanos(self.start_pts, self.num, self.den))
    }
}

/// One open input plus a decoder for its best video stream
pub struct FfmpegDecoder {
    input: format::context::Input,
    decoder: ffmpeg::decoder::Video,
    info: VideoStreamInfo,
    clock: StreamClock,
}

impl FfmpegDecoder {
    pub fn open(source: &VideoSource) -> Result<Self, DecodeError> {
        let location = match source {
            VideoSource::Local(path) => {
                if !path.exists() {
                    return Err(DecodeError::FileNotFound(path.clone()));
                }
                path.to_string_lossy().into_owned()
            }
            VideoSource::Remote(url) => url.clone(),
        };

        let input = format::input(&location).map_err(|e| DecodeError::OpenFailed {
            location: location.clone(),
            reason: e.to_string(),
        })?;

        let (info, clock, decoder) = {
            let stream = input
                .streams()
                .best(media::Type::Video)
                .ok_or(DecodeError::NoVideoStream)?;

            let time_base = stream.time_base();
            let clock = StreamClock::new(
                stream.start_time(),
                time_base.numerator(),
                time_base.denominator(),
            );

            let context = codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| DecodeError::CodecOpenFailed(e.to_string()))?;
            let decoder = context
                .decoder()
                .video()
                .map_err(|e| DecodeError::CodecOpenFailed(e.to_string()))?;

            let fps = {
                let rate = stream.avg_frame_rate();
                if rate.denominator() != 0 && rate.numerator() > 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                }
            };

            let stream_duration = stream.duration();
            let duration = if stream_duration > 0 {
                Some(pts_to_nanos(stream_duration, clock.num, clock.den))
            } else if input.duration() > 0 {
                Some(pts_to_nanos(input.duration(), 1, AV_TIME_BASE))
            } else {
                None
            };

            let info = VideoStreamInfo {
                index: stream.index(),
                codec_name: decoder.id().name().to_string(),
                width: decoder.width(),
                height: decoder.height(),
                fps,
                duration,
            };
            (info, clock, decoder)
        };

        debug!(
            source = %source,
            codec = %info.codec_name,
            width = info.width,
            height = info.height,
            start_pts = clock.start_pts,
            duration = ?info.duration.map(time::format_time),
            "opened video"
        );

        Ok(Self { input, decoder, info, clock })
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn info(&self) -> &VideoStreamInfo {
        &self.info
    }

    fn decode_frame_at(
        &mut self,
        at: Time,
        width: u32,
        height: u32,
        fit: FitMode,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<VideoFrame, DecodeError> {
        let clock = self.clock;
        let stream_index = self.info.index;
        let target_pts = clock.to_pts(at);

        // Container-level seek lands on the keyframe at or before the target
        let seek_ts = clock.seek_micros(at);
        self.input
            .seek(seek_ts, ..seek_ts)
            .map_err(|e| DecodeError::SeekFailed(e.to_string()))?;
        self.decoder.flush();

        let mut decoded = frame::Video::empty();
        let mut last = frame::Video::empty();
        let mut last_pts: Option<i64> = None;

        for (stream, packet) in self.input.packets() {
            if cancelled() {
                return Err(DecodeError::Cancelled);
            }
            if stream.index() != stream_index {
                continue;
            }
            if let Err(e) = self.decoder.send_packet(&packet) {
                trace!(error = %e, "skipping undecodable packet");
                continue;
            }

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.timestamp().or(decoded.pts()).unwrap_or(clock.start_pts);
                if pts >= target_pts {
                    return scale_frame(&decoded, clock.to_nanos(pts), width, height, fit);
                }
                std::mem::swap(&mut decoded, &mut last);
                last_pts = Some(pts);
            }
        }

        // Drain frames still buffered in the decoder
        self.decoder
            .send_eof()
            .map_err(|e| DecodeError::Decode(e.to_string()))?;
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let pts = decoded.timestamp().or(decoded.pts()).unwrap_or(clock.start_pts);
            if pts >= target_pts {
                return scale_frame(&decoded, clock.to_nanos(pts), width, height, fit);
            }
            std::mem::swap(&mut decoded, &mut last);
            last_pts = Some(pts);
        }

        // Target lies after the final frame (e.g. seek == duration): use the last one
        match last_pts {
            Some(pts) => scale_frame(&last, clock.to_nanos(pts), width, height, fit),
            None => Err(DecodeError::NoFrame(at)),
        }
    }
}

/// Convert a decoded frame to tightly packed RGBA8 at exactly `width`×`height`
fn scale_frame(
    source: &frame::Video,
    timestamp: Time,
    width: u32,
    height: u32,
    fit: FitMode,
) -> Result<VideoFrame, DecodeError> {
    if source.width() == 0 || source.height() == 0 {
        return Err(DecodeError::Decode("decoded frame has zero size".to_string()));
    }

    let plan = fit_dimensions(source.width(), source.height(), width, height, fit);
    let mut scaler = scaling::Context::get(
        source.format(),
        source.width(),
        source.height(),
        Pixel::RGBA,
        plan.scale_width,
        plan.scale_height,
        scaling::Flags::BILINEAR,
    )
    .map_err(|e| DecodeError::Scale(e.to_string()))?;

    let mut rgba = frame::Video::empty();
    scaler
        .run(source, &mut rgba)
        .map_err(|e| DecodeError::Scale(e.to_string()))?;

    let data = crop_rgba(rgba.data(0), rgba.stride(0), &plan, width, height);

    Ok(VideoFrame { data, width, height, timestamp })
}

/// Convert a stream timestamp to nanoseconds.
/// FFmpeg uses rational timebases: timestamp * (num/den) = seconds
pub fn pts_to_nanos(pts: i64, num: i32, den: i32) -> Time {
    if den == 0 {
        return 0;
    }
    // i128 avoids overflow for long streams with fine time bases
    let result = (pts as i128 * num as i128 * time::constants::NANOS_PER_SECOND as i128) / den as i128;
    result as Time
}

/// Convert nanoseconds to a stream timestamp, rounding down
pub fn nanos_to_pts(nanos: Time, num: i32, den: i32) -> i64 {
    if num == 0 {
        return 0;
    }
    let result = (nanos as i128 * den as i128) / (num as i128 * time::constants::NANOS_PER_SECOND as i128);
    result as i64
}
