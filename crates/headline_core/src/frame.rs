//! Next-paint scheduling
//!
//! Measurement has to wait until the host has committed layout. Work is
//! deferred to the next paint checkpoint through a [`FrameScheduler`];
//! a pending request can be cancelled when a newer build pass supersedes it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

/// Identifier of a pending frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(u64);

/// Work to run at the next paint checkpoint
pub type FrameCallback = Box<dyn FnOnce() + Send>;

/// Host primitive for deferring work to the next paint
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Drop a pending request; returns false if it already ran or was cancelled
    fn cancel_frame(&self, id: FrameRequestId) -> bool;
}

#[derive(Default)]
struct FrameQueueInner {
    next_id: u64,
    pending: IndexMap<FrameRequestId, FrameCallback>,
}

/// Frame scheduler driven by the host's render loop
///
/// Callbacks run in request order. Callbacks requested while a frame is
/// running are deferred to the following frame.
#[derive(Default)]
pub struct FrameQueue {
    inner: Mutex<FrameQueueInner>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrameQueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run every callback pending at the start of this frame
    ///
    /// Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let pending = std::mem::take(&mut self.lock().pending);
        let count = pending.len();
        for (_, callback) in pending {
            callback();
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let mut inner = self.lock();
        let id = FrameRequestId(inner.next_id);
        inner.next_id += 1;
        inner.pending.insert(id, callback);
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) -> bool {
        self.lock().pending.shift_remove(&id).is_some()
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending_count())
            .finish()
    }
}
