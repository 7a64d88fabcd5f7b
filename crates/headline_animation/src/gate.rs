//! Single-shot release gate between timelines
//!
//! A gate holds a timeline that was registered paused and plays it the
//! first time [`Gate::release`] is called. Releasing before anything is
//! held plays the timeline as soon as it is handed over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::scheduler::TimelineHandle;

#[derive(Default)]
struct GateInner {
    released: AtomicBool,
    held: Mutex<Option<TimelineHandle>>,
}

/// Barrier that starts a paused timeline on a single signal
///
/// Clones share the same gate.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<GateInner>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over a paused timeline to be played on release
    pub fn hold(&self, timeline: TimelineHandle) {
        let mut held = self
            .inner
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.released.load(Ordering::Acquire) {
            drop(held);
            timeline.play();
        } else {
            *held = Some(timeline);
        }
    }

    /// Open the gate; only the first call has any effect
    pub fn release(&self) {
        if self.inner.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let held = self
            .inner
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timeline) = held {
            tracing::debug!("gate released timeline {:?}", timeline.id());
            timeline.play();
        }
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("released", &self.is_released())
            .finish()
    }
}
