//! Worker pool that turns thumbnail requests into images off the caller's thread.
//!
//! Jobs travel to the workers over a crossbeam queue. Each job reports exactly
//! once, either through a oneshot (`PendingThumbnail`, awaitable) or through a
//! view's event channel. A dropped receiver is not an error.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::Instant;

use crossbeam::channel;
use tokio::sync::oneshot;
use tracing::{debug, debug_span, warn};

use crate::config::GeneratorConfig;
use crate::core::time;
use crate::decode::FrameSource;
use crate::thumbnail::cancel::CancellationToken;
use crate::thumbnail::error::ThumbnailError;
use crate::thumbnail::image::ThumbnailImage;
use crate::thumbnail::request::{RequestId, ThumbnailRequest};

pub type ThumbnailResult = Result<ThumbnailImage, ThumbnailError>;

/// Completion of one request: the image or the reason there is none
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailEvent {
    pub request_id: RequestId,
    pub result: ThumbnailResult,
}

impl ThumbnailEvent {
    pub fn image(&self) -> Option<&ThumbnailImage> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ThumbnailError> {
        self.result.as_ref().err()
    }
}

enum Reply {
    Oneshot(oneshot::Sender<ThumbnailResult>),
    Channel(channel::Sender<ThumbnailEvent>),
}

struct Job {
    request: ThumbnailRequest,
    cancel: CancellationToken,
    reply: Reply,
}

impl Job {
    fn complete(self, result: ThumbnailResult) {
        // Receivers that went away no longer care about the outcome
        match self.reply {
            Reply::Oneshot(tx) => {
                let _ = tx.send(result);
            }
            Reply::Channel(tx) => {
                let _ = tx.send(ThumbnailEvent { request_id: self.request.id(), result });
            }
        }
    }
}

/// Pool of decode threads shared by any number of views
pub struct ThumbnailGenerator {
    jobs: Option<channel::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl ThumbnailGenerator {
    /// Spawn `config.worker_threads` workers extracting frames from `source`
    pub fn new(source: Arc<dyn FrameSource>, config: &GeneratorConfig) -> std::io::Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        let shutdown = CancellationToken::new();
        let count = config.worker_threads.max(1);

        let mut workers = Vec::with_capacity(count);
        for i in 0..count {
            let rx = rx.clone();
            let source = Arc::clone(&source);
            let shutdown = shutdown.clone();
            let handle = thread::Builder::new()
                .name(format!("thumbnail-worker-{}", i))
                .spawn(move || worker_loop(source.as_ref(), rx, shutdown))?;
            workers.push(handle);
        }

        debug!(workers = count, "thumbnail generator started");

        Ok(Self {
            jobs: Some(tx),
            workers,
            shutdown,
        })
    }

    /// Queue a request; the result is delivered through the returned future
    pub fn submit(&self, request: ThumbnailRequest, cancel: CancellationToken) -> PendingThumbnail {
        let (tx, rx) = oneshot::channel();
        let request_id = request.id();
        self.dispatch(Job { request, cancel, reply: Reply::Oneshot(tx) });
        PendingThumbnail { request_id, rx }
    }

    /// Queue a request whose completion is posted to `events`
    pub fn submit_to(
        &self,
        request: ThumbnailRequest,
        cancel: CancellationToken,
        events: channel::Sender<ThumbnailEvent>,
    ) {
        self.dispatch(Job { request, cancel, reply: Reply::Channel(events) });
    }

    /// Generate one thumbnail without a view
    pub async fn generate(&self, request: ThumbnailRequest) -> ThumbnailResult {
        self.submit(request, CancellationToken::new()).await
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn dispatch(&self, job: Job) {
        let Some(jobs) = &self.jobs else {
            job.complete(Err(ThumbnailError::Cancelled));
            return;
        };
        if let Err(channel::SendError(job)) = jobs.send(job) {
            warn!(id = %job.request.id(), "no thumbnail workers running");
            job.complete(Err(ThumbnailError::Cancelled));
        }
    }
}

impl Drop for ThumbnailGenerator {
    fn drop(&mut self) {
        // Queued jobs still drain, but report Cancelled without decoding
        self.shutdown.cancel();
        drop(self.jobs.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Result of `ThumbnailGenerator::submit`.
/// Resolves to `Err(Cancelled)` if the generator shut down before replying.
pub struct PendingThumbnail {
    request_id: RequestId,
    rx: oneshot::Receiver<ThumbnailResult>,
}

impl PendingThumbnail {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Non-blocking poll for UI loops. Returns `Some` once; do not call again after that.
    pub fn try_take(&mut self) -> Option<ThumbnailResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(ThumbnailError::Cancelled)),
        }
    }

    /// Block the current thread until the result arrives.
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> ThumbnailResult {
        self.rx.blocking_recv().unwrap_or(Err(ThumbnailError::Cancelled))
    }
}

impl Future for PendingThumbnail {
    type Output = ThumbnailResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ThumbnailError::Cancelled)))
    }
}

fn worker_loop(source: &dyn FrameSource, jobs: channel::Receiver<Job>, shutdown: CancellationToken) {
    for job in jobs.iter() {
        let span = debug_span!(
            "thumbnail",
            id = %job.request.id(),
            source = %job.request.source(),
            seek = job.request.seek_time_seconds()
        );
        let _enter = span.enter();
        let started = Instant::now();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            extract(source, &job.request, &job.cancel, &shutdown)
        }))
        .unwrap_or_else(|_| Err(ThumbnailError::DecodeFailed("decoder panicked".to_string())));

        match &result {
            Ok(image) => debug!(
                width = image.width(),
                height = image.height(),
                pts = %time::format_time(image.timestamp()),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "thumbnail ready"
            ),
            Err(e) if e.is_abandoned() => debug!("thumbnail abandoned"),
            Err(e) => warn!(error = %e, "thumbnail failed"),
        }

        job.complete(result);
    }
}

fn check(cancel: &CancellationToken, shutdown: &CancellationToken) -> Result<(), ThumbnailError> {
    cancel.check()?;
    shutdown.check()
}

/// Cancellation is honoured between stages and inside the decoder's packet loop.
fn extract(
    source: &dyn FrameSource,
    request: &ThumbnailRequest,
    cancel: &CancellationToken,
    shutdown: &CancellationToken,
) -> ThumbnailResult {
    check(cancel, shutdown)?;
    let mut decoder = source.open(request.source())?;

    check(cancel, shutdown)?;
    let at = request.seek_time();
    let info = decoder.info();
    if !info.contains(at) {
        return Err(ThumbnailError::SeekOutOfRange {
            requested: request.seek_time_seconds(),
            duration: info.duration.map(time::to_seconds),
        });
    }

    let abandoned = || cancel.is_cancelled() || shutdown.is_cancelled();
    let frame = decoder.decode_frame_at(at, request.width(), request.height(), request.fit(), &abandoned)?;
    check(cancel, shutdown)?;

    if frame.width != request.width() || frame.height != request.height() {
        return Err(ThumbnailError::DecodeFailed(format!(
            "decoder produced {}x{}, expected {}x{}",
            frame.width,
            frame.height,
            request.width(),
            request.height()
        )));
    }

    Ok(ThumbnailImage::from_frame(frame, at))
}
