//! End-to-end behaviour of `ThumbnailView` over a synthetic frame source.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vthumb::core::time::{self, Time};
use vthumb::decode::{DecodeError, VideoFrame, VideoStreamInfo};
use vthumb::{
    FitMode, FrameDecoder, FrameSource, GeneratorConfig, RequestId, ThumbnailError,
    ThumbnailEvent, ThumbnailGenerator, ThumbnailRequest, ThumbnailView, VideoSource, ViewConfig,
};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct SyntheticVideo {
    duration_seconds: Option<f64>,
    corrupt: bool,
}

/// Serves registered local paths; every frame is a solid colour whose red
/// channel is the frame time in tenths of a second.
struct SyntheticSource {
    videos: HashMap<PathBuf, SyntheticVideo>,
}

impl SyntheticSource {
    fn new() -> Self {
        let mut videos = HashMap::new();
        videos.insert(
            PathBuf::from("sample.mp4"),
            SyntheticVideo { duration_seconds: Some(10.0), corrupt: false },
        );
        videos.insert(
            PathBuf::from("corrupt.mp4"),
            SyntheticVideo { duration_seconds: Some(10.0), corrupt: true },
        );
        videos.insert(
            PathBuf::from("live.ts"),
            SyntheticVideo { duration_seconds: None, corrupt: false },
        );
        Self { videos }
    }
}

struct SyntheticDecoder {
    info: VideoStreamInfo,
    corrupt: bool,
}

impl FrameSource for SyntheticSource {
    fn open(&self, source: &VideoSource) -> Result<Box<dyn FrameDecoder>, DecodeError> {
        let path = match source {
            VideoSource::Local(path) => path,
            VideoSource::Remote(url) => {
                return Err(DecodeError::OpenFailed {
                    location: url.clone(),
                    reason: "Connection refused".into(),
                })
            }
        };
        let video = self
            .videos
            .get(path)
            .ok_or_else(|| DecodeError::FileNotFound(path.clone()))?;

        Ok(Box::new(SyntheticDecoder {
            info: VideoStreamInfo {
                index: 0,
                codec_name: "h264".into(),
                width: 1920,
                height: 1080,
                fps: 25.0,
                duration: video.duration_seconds.map(time::from_seconds),
            },
            corrupt: video.corrupt,
        }))
    }
}

impl FrameDecoder for SyntheticDecoder {
    fn info(&self) -> &VideoStreamInfo {
        &self.info
    }

    fn decode_frame_at(
        &mut self,
        at: Time,
        width: u32,
        height: u32,
        _fit: FitMode,
        _cancelled: &dyn Fn() -> bool,
    ) -> Result<VideoFrame, DecodeError> {
        if self.corrupt {
            return Err(DecodeError::Decode("invalid NAL unit".into()));
        }
        let red = (time::to_seconds(at) * 10.0).round() as u8;
        let data = [red, 0, 0, 255].repeat((width * height) as usize);
        Ok(VideoFrame { data, width, height, timestamp: at })
    }
}

fn generator() -> Arc<ThumbnailGenerator> {
    let generator = ThumbnailGenerator::new(
        Arc::new(SyntheticSource::new()),
        &GeneratorConfig { worker_threads: 2 },
    )
    .unwrap();
    Arc::new(generator)
}

/// View plus a log of every callback invocation
fn recording_view() -> (ThumbnailView, Arc<Mutex<Vec<ThumbnailEvent>>>) {
    let mut view = ThumbnailView::new(generator());
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    view.set_on_thumbnail_ready(move |event| sink.lock().unwrap().push(event.clone()));
    (view, log)
}

fn collect(view: &mut ThumbnailView, count: usize) -> Vec<ThumbnailEvent> {
    let mut events = Vec::new();
    while events.len() < count {
        match view.wait(WAIT) {
            Some(event) => events.push(event),
            None => panic!("expected {} events, got {}", count, events.len()),
        }
    }
    events
}

#[test]
fn test_sample_scenario() {
    let (mut view, log) = recording_view();
    view.set_video_source("sample.mp4");
    view.set_thumbnail_width(120.0);
    view.set_thumbnail_height(80.0);

    let id = view.generate_thumbnail(2.5);
    let events = collect(&mut view, 1);

    let image = events[0].image().expect("thumbnail image");
    assert_eq!(events[0].request_id, id);
    assert_eq!((image.width(), image.height()), (120, 80));
    assert_eq!(image.len(), 120 * 80 * 4);
    assert_eq!(image.timestamp(), time::from_seconds(2.5));
    assert_eq!(image.pixel(60, 40), Some([25, 0, 0, 255]));
    assert_eq!(image.label(), "0:02");

    assert_eq!(view.rendered(), Some(image));
    assert_eq!(log.lock().unwrap().len(), 1);
    assert!(view.wait(Duration::from_millis(50)).is_none());
}

#[test]
fn test_empty_source_fails_once() {
    let (mut view, log) = recording_view();
    let id = view.generate_thumbnail(1.0);

    let events = view.pump();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].request_id, id);
    assert!(matches!(events[0].error(), Some(ThumbnailError::SourceUnavailable(_))));
    assert!(events[0].image().is_none());
    assert!(view.rendered().is_none());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_malformed_and_missing_sources() {
    let (mut view, _) = recording_view();

    for source in ["://nowhere", "missing.mp4", "https://cdn.example.com/hls/master.m3u8"] {
        view.set_video_source(source);
        view.generate_thumbnail(1.0);
        let events = collect(&mut view, 1);
        assert!(
            matches!(events[0].error(), Some(ThumbnailError::SourceUnavailable(_))),
            "{source}: {:?}",
            events[0].result
        );
    }
    assert!(view.rendered().is_none());
}

#[test]
fn test_seek_past_duration_fails() {
    let (mut view, _) = recording_view();
    view.set_video_source("sample.mp4");
    view.generate_thumbnail(12.0);

    let events = collect(&mut view, 1);
    assert_eq!(
        events[0].error(),
        Some(&ThumbnailError::SeekOutOfRange { requested: 12.0, duration: Some(10.0) })
    );
}

#[test]
fn test_seek_at_duration_succeeds() {
    let (mut view, _) = recording_view();
    view.set_video_source("sample.mp4");
    view.generate_thumbnail(10.0);

    let events = collect(&mut view, 1);
    assert!(events[0].image().is_some());
}

#[test]
fn test_negative_seek_fails() {
    let (mut view, _) = recording_view();
    view.set_video_source("sample.mp4");
    view.generate_thumbnail(-1.0);

    let events = view.pump();
    assert!(matches!(events[0].error(), Some(ThumbnailError::SeekOutOfRange { .. })));
}

#[test]
fn test_unknown_duration_accepts_any_time() {
    let (mut view, _) = recording_view();
    view.set_video_source("live.ts");
    view.generate_thumbnail(3600.0);

    let events = collect(&mut view, 1);
    assert!(events[0].image().is_some());
}

#[test]
fn test_decode_failure() {
    let (mut view, _) = recording_view();
    view.set_video_source("corrupt.mp4");
    view.generate_thumbnail(1.0);

    let events = collect(&mut view, 1);
    assert!(matches!(events[0].error(), Some(ThumbnailError::DecodeFailed(_))));
    assert!(view.rendered().is_none());
}

#[test]
fn test_second_request_supersedes_first() {
    let (mut view, log) = recording_view();
    view.set_video_source("sample.mp4");

    let first = view.generate_thumbnail(1.0);
    let second = view.generate_thumbnail(2.0);
    let events = collect(&mut view, 2);

    assert_eq!(events[0].request_id, first);
    assert_eq!(events[0].error(), Some(&ThumbnailError::Superseded));
    assert_eq!(events[1].request_id, second);
    assert_eq!(events[1].image().map(|i| i.timestamp()), Some(time::from_seconds(2.0)));

    // The first job's late completion must not surface
    std::thread::sleep(Duration::from_millis(100));
    assert!(view.pump().is_empty());

    let seen: Vec<RequestId> = log.lock().unwrap().iter().map(|e| e.request_id).collect();
    assert_eq!(seen, vec![first, second]);
}

#[test]
fn test_hidden_thumbnail_still_delivered() {
    let (mut view, log) = recording_view();
    view.set_video_source("sample.mp4");
    view.set_show_thumbnail(false);
    view.generate_thumbnail(4.0);

    let events = collect(&mut view, 1);
    assert!(events[0].image().is_some());
    assert!(view.rendered().is_none());
    assert!(log.lock().unwrap()[0].image().is_some());
}

#[test]
fn test_seek_time_property_triggers_generation() {
    let (mut view, _) = recording_view();
    assert_eq!(view.set_seek_time_seconds(1.0), None);
    assert_eq!(view.seek_time_seconds(), 1.0);
    assert!(view.pump().is_empty());

    view.set_video_source("sample.mp4");
    let id = view.set_seek_time_seconds(3.0).expect("request started");

    let events = collect(&mut view, 1);
    assert_eq!(events[0].request_id, id);
    assert_eq!(events[0].image().map(|i| i.requested()), Some(time::from_seconds(3.0)));
}

#[test]
fn test_cancel_in_flight() {
    let (mut view, log) = recording_view();
    view.set_video_source("sample.mp4");
    let id = view.generate_thumbnail(5.0);

    assert!(view.cancel());
    let events = view.pump();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].request_id, id);
    assert_eq!(events[0].error(), Some(&ThumbnailError::Cancelled));

    std::thread::sleep(Duration::from_millis(100));
    assert!(view.pump().is_empty());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_view_is_reusable() {
    let (mut view, _) = recording_view();
    view.set_video_source("sample.mp4");
    view.generate_thumbnail(1.0);
    collect(&mut view, 1);

    view.set_video_source("live.ts");
    view.set_thumbnail_width(64.0);
    view.set_thumbnail_height(64.0);
    view.generate_thumbnail(2.0);

    let events = collect(&mut view, 1);
    let image = events[0].image().unwrap();
    assert_eq!((image.width(), image.height()), (64, 64));
    assert_eq!(view.rendered().map(|i| i.requested()), Some(time::from_seconds(2.0)));
}

#[test]
fn test_views_share_generator() {
    let generator = generator();
    let mut left = ThumbnailView::with_config(Arc::clone(&generator), &ViewConfig::default());
    let mut right = ThumbnailView::with_config(
        Arc::clone(&generator),
        &ViewConfig { thumbnail_width: 32.0, thumbnail_height: 18.0, ..ViewConfig::default() },
    );
    left.set_video_source("sample.mp4");
    right.set_video_source("sample.mp4");

    left.generate_thumbnail(1.0);
    right.generate_thumbnail(1.0);

    let left_image = collect(&mut left, 1).remove(0).result.unwrap();
    let right_image = collect(&mut right, 1).remove(0).result.unwrap();
    assert_eq!((left_image.width(), left_image.height()), (160, 90));
    assert_eq!((right_image.width(), right_image.height()), (32, 18));
}

#[tokio::test]
async fn test_generate_without_view() {
    let generator = generator();
    let request = ThumbnailRequest::builder("sample.mp4", 2.5)
        .size(120.0, 80.0)
        .build()
        .unwrap();

    let image = generator.generate(request).await.unwrap();
    assert_eq!((image.width(), image.height()), (120, 80));
}
