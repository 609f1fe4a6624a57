//! `ThumbnailView`: the UI-facing component.
//!
//! The owner sets properties, calls `generate_thumbnail`, and drives `pump`
//! (or `wait`) from its own thread. The `on_thumbnail_ready` callback and
//! inline rendering only ever run inside those calls, never on a worker thread.
//!
//! A view keeps at most one request in flight. Starting a new one cancels the
//! previous request, which completes immediately with `Superseded`. Every
//! `generate_thumbnail` call yields exactly one event.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel;
use tracing::{debug, trace};

use crate::config::ViewConfig;
use crate::decode::FitMode;
use crate::thumbnail::cancel::CancellationToken;
use crate::thumbnail::error::ThumbnailError;
use crate::thumbnail::generator::{ThumbnailEvent, ThumbnailGenerator};
use crate::thumbnail::image::ThumbnailImage;
use crate::thumbnail::request::{RequestId, ThumbnailRequest};

/// Owner callback, invoked once per request on the owner's thread
pub type ReadyCallback = Box<dyn FnMut(&ThumbnailEvent) + Send>;

struct InFlight {
    id: RequestId,
    show_thumbnail: bool,
    cancel: CancellationToken,
}

pub struct ThumbnailView {
    generator: Arc<ThumbnailGenerator>,

    // Properties
    video_source: String,
    seek_time_seconds: f64,
    show_thumbnail: bool,
    thumbnail_width: f32,
    thumbnail_height: f32,
    fit: FitMode,
    on_thumbnail_ready: Option<ReadyCallback>,

    lifetime: CancellationToken,
    in_flight: Option<InFlight>,
    events_tx: channel::Sender<ThumbnailEvent>,
    events_rx: channel::Receiver<ThumbnailEvent>,
    ready: VecDeque<ThumbnailEvent>,  // completed, not yet handed to the owner
    rendered: Option<ThumbnailImage>,
}

impl ThumbnailView {
    pub fn new(generator: Arc<ThumbnailGenerator>) -> Self {
        Self::with_config(generator, &ViewConfig::default())
    }

    pub fn with_config(generator: Arc<ThumbnailGenerator>, config: &ViewConfig) -> Self {
        let (events_tx, events_rx) = channel::unbounded();
        Self {
            generator,
            video_source: String::new(),
            seek_time_seconds: 0.0,
            show_thumbnail: config.show_thumbnail,
            thumbnail_width: config.thumbnail_width,
            thumbnail_height: config.thumbnail_height,
            fit: config.fit,
            on_thumbnail_ready: None,
            lifetime: CancellationToken::new(),
            in_flight: None,
            events_tx,
            events_rx,
            ready: VecDeque::new(),
            rendered: None,
        }
    }

    pub fn video_source(&self) -> &str {
        &self.video_source
    }

    pub fn set_video_source(&mut self, source: impl Into<String>) {
        self.video_source = source.into();
    }

    pub fn seek_time_seconds(&self) -> f64 {
        self.seek_time_seconds
    }

    /// Store the seek time and, when a source is configured, request its thumbnail
    pub fn set_seek_time_seconds(&mut self, seconds: f64) -> Option<RequestId> {
        self.seek_time_seconds = seconds;
        if self.video_source.trim().is_empty() {
            return None;
        }
        Some(self.generate_thumbnail(seconds))
    }

    pub fn show_thumbnail(&self) -> bool {
        self.show_thumbnail
    }

    /// Hiding the thumbnail also drops the currently rendered image
    pub fn set_show_thumbnail(&mut self, show: bool) {
        self.show_thumbnail = show;
        if !show {
            self.rendered = None;
        }
    }

    pub fn thumbnail_width(&self) -> f32 {
        self.thumbnail_width
    }

    pub fn set_thumbnail_width(&mut self, width: f32) {
        self.thumbnail_width = width;
    }

    pub fn thumbnail_height(&self) -> f32 {
        self.thumbnail_height
    }

    pub fn set_thumbnail_height(&mut self, height: f32) {
        self.thumbnail_height = height;
    }

    pub fn fit(&self) -> FitMode {
        self.fit
    }

    pub fn set_fit(&mut self, fit: FitMode) {
        self.fit = fit;
    }

    pub fn set_on_thumbnail_ready<F>(&mut self, callback: F)
    where
        F: FnMut(&ThumbnailEvent) + Send + 'static,
    {
        self.on_thumbnail_ready = Some(Box::new(callback));
    }

    pub fn clear_on_thumbnail_ready(&mut self) {
        self.on_thumbnail_ready = None;
    }

    /// Image currently rendered inline, if any
    pub fn rendered(&self) -> Option<&ThumbnailImage> {
        self.rendered.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Request a thumbnail at `time_in_seconds` using the current properties.
    /// Returns at once; the outcome arrives through `pump`/`wait`.
    pub fn generate_thumbnail(&mut self, time_in_seconds: f64) -> RequestId {
        let id = RequestId::next();
        self.abandon_in_flight(ThumbnailError::Superseded);

        let built = ThumbnailRequest::builder(self.video_source.clone(), time_in_seconds)
            .id(id)
            .size(self.thumbnail_width, self.thumbnail_height)
            .show_thumbnail(self.show_thumbnail)
            .fit(self.fit)
            .build();

        match built {
            Ok(request) => {
                debug!(
                    id = %id,
                    source = %request.source(),
                    seek = time_in_seconds,
                    width = request.width(),
                    height = request.height(),
                    "requesting thumbnail"
                );
                let cancel = self.lifetime.child();
                self.in_flight = Some(InFlight {
                    id,
                    show_thumbnail: request.show_thumbnail(),
                    cancel: cancel.clone(),
                });
                self.generator.submit_to(request, cancel, self.events_tx.clone());
            }
            Err(error) => {
                debug!(id = %id, error = %error, "rejected thumbnail request");
                self.ready.push_back(ThumbnailEvent { request_id: id, result: Err(error) });
            }
        }

        id
    }

    /// Cancel the in-flight request; it completes with `Cancelled`
    pub fn cancel(&mut self) -> bool {
        self.abandon_in_flight(ThumbnailError::Cancelled)
    }

    /// Deliver every completed request without blocking, oldest first
    pub fn pump(&mut self) -> Vec<ThumbnailEvent> {
        while let Ok(event) = self.events_rx.try_recv() {
            self.accept(event);
        }

        let mut delivered = Vec::with_capacity(self.ready.len());
        while let Some(event) = self.ready.pop_front() {
            self.notify(&event);
            delivered.push(event);
        }
        delivered
    }

    /// Block until the next event or until `timeout` elapses.
    /// Returns `None` at once when nothing is pending.
    pub fn wait(&mut self, timeout: Duration) -> Option<ThumbnailEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.ready.pop_front() {
                self.notify(&event);
                return Some(event);
            }
            if self.in_flight.is_none() {
                return None;
            }
            match self.events_rx.recv_deadline(deadline) {
                Ok(event) => self.accept(event),
                Err(_) => return None,
            }
        }
    }

    fn abandon_in_flight(&mut self, reason: ThumbnailError) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        debug!(id = %in_flight.id, reason = %reason, "abandoning thumbnail request");
        in_flight.cancel.cancel();
        self.ready.push_back(ThumbnailEvent { request_id: in_flight.id, result: Err(reason) });
        true
    }

    /// Match a worker completion against the in-flight request; stale ones are dropped
    fn accept(&mut self, event: ThumbnailEvent) {
        let current = self.in_flight.as_ref().map(|f| f.id);
        if current != Some(event.request_id) {
            trace!(id = %event.request_id, "dropping stale thumbnail event");
            return;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        if in_flight.show_thumbnail {
            if let Ok(image) = &event.result {
                self.rendered = Some(image.clone());
            }
        }
        self.ready.push_back(event);
    }

    fn notify(&mut self, event: &ThumbnailEvent) {
        if let Some(callback) = self.on_thumbnail_ready.as_mut() {
            callback(event);
        }
    }
}

impl Drop for ThumbnailView {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
