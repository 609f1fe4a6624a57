//! Cooperative cancellation shared between a view and its in-flight jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::thumbnail::error::ThumbnailError;

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    parent: Option<Arc<TokenState>>,
}

impl TokenState {
    fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.is_cancelled(),
            None => false,
        }
    }
}

/// Clonable cancellation flag. Cancelling a token cancels all of its children;
/// cancelling a child leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that is also cancelled when `self` is
    pub fn child(&self) -> Self {
        Self {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                parent: Some(Arc::clone(&self.state)),
            }),
        }
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// `Err(Cancelled)` once cancelled, for use with `?` between job stages
    pub fn check(&self) -> Result<(), ThumbnailError> {
        if self.is_cancelled() {
            Err(ThumbnailError::Cancelled)
        } else {
            Ok(())
        }
    }
}
