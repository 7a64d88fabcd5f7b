//! Engine readiness
//!
//! The animation engine becomes available asynchronously and exactly once
//! per process. [`EngineCell`] is the single-assignment slot that holds it:
//!
//! - the first [`EngineCell::request`] starts the bootstrap
//! - every request made before completion queues a waiter
//! - [`EngineCell::complete`] stores the scheduler and notifies all waiters once
//!
//! Later requests are answered synchronously.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::scheduler::AnimationScheduler;

/// Callback invoked once the engine is ready
pub type ReadyCallback = Box<dyn FnOnce(AnimationScheduler) + Send>;

/// Loads the animation engine and reports back through [`EngineCell::complete`]
///
/// `load` is called at most once per cell. It may complete synchronously.
pub trait EngineBootstrap: Send + Sync {
    fn load(&self, engine: Arc<EngineCell>);
}

enum EngineState {
    Unloaded,
    Loading(Vec<ReadyCallback>),
    Ready(AnimationScheduler),
}

/// Process-wide, init-once holder of the animation engine
pub struct EngineCell {
    state: Mutex<EngineState>,
}

impl EngineCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::Unloaded),
        }
    }

    /// The shared cell used by every widget in the process
    pub fn global() -> Arc<EngineCell> {
        static GLOBAL_ENGINE: OnceLock<Arc<EngineCell>> = OnceLock::new();
        GLOBAL_ENGINE
            .get_or_init(|| Arc::new(EngineCell::new()))
            .clone()
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), EngineState::Ready(_))
    }

    /// Whether a bootstrap is in flight
    pub fn is_loading(&self) -> bool {
        matches!(*self.lock(), EngineState::Loading(_))
    }

    /// The engine's scheduler, once ready
    pub fn scheduler(&self) -> Option<AnimationScheduler> {
        match &*self.lock() {
            EngineState::Ready(scheduler) => Some(scheduler.clone()),
            _ => None,
        }
    }

    /// Run `waiter` once the engine is ready
    ///
    /// Runs it immediately if already ready. Otherwise queues it, starting
    /// `bootstrap` if no load has been attempted yet.
    pub fn request(self: &Arc<Self>, bootstrap: &dyn EngineBootstrap, waiter: ReadyCallback) {
        let mut state = self.lock();
        if let EngineState::Ready(scheduler) = &*state {
            let scheduler = scheduler.clone();
            drop(state);
            waiter(scheduler);
            return;
        }
        if let EngineState::Loading(waiters) = &mut *state {
            waiters.push(waiter);
            return;
        }
        *state = EngineState::Loading(vec![waiter]);
        drop(state);
        tracing::info!("bootstrapping animation engine");
        bootstrap.load(Arc::clone(self));
    }

    /// Install the engine and notify every waiter
    ///
    /// The first completion wins; later ones are ignored.
    pub fn complete(&self, scheduler: AnimationScheduler) {
        let waiters = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, EngineState::Ready(scheduler.clone())) {
                EngineState::Ready(existing) => {
                    *state = EngineState::Ready(existing);
                    tracing::warn!("animation engine already ready; ignoring second completion");
                    return;
                }
                EngineState::Loading(waiters) => waiters,
                EngineState::Unloaded => Vec::new(),
            }
        };
        tracing::info!("animation engine ready, notifying {} waiter(s)", waiters.len());
        for waiter in waiters {
            waiter(scheduler.clone());
        }
    }
}

impl Default for EngineCell {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.lock() {
            EngineState::Unloaded => "unloaded",
            EngineState::Loading(_) => "loading",
            EngineState::Ready(_) => "ready",
        };
        f.debug_struct("EngineCell").field("state", &state).finish()
    }
}

/// Bootstrap that creates the engine in place
#[derive(Debug, Default)]
pub struct ImmediateBootstrap;

impl EngineBootstrap for ImmediateBootstrap {
    fn load(&self, engine: Arc<EngineCell>) {
        engine.complete(AnimationScheduler::new());
    }
}

/// Bootstrap whose load finishes when the host says so
///
/// Models an engine fetched asynchronously: `load` only records the
/// request and [`DeferredBootstrap::finish`] completes it later.
#[derive(Default)]
pub struct DeferredBootstrap {
    pending: Mutex<Option<Arc<EngineCell>>>,
    loads: AtomicUsize,
}

impl DeferredBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a load was started
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Complete the outstanding load, returning false if none was started
    pub fn finish(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(engine) => {
                engine.complete(AnimationScheduler::new());
                true
            }
            None => false,
        }
    }
}

impl EngineBootstrap for DeferredBootstrap {
    fn load(&self, engine: Arc<EngineCell>) {
        self.loads.fetch_add(1, Ordering::SeqCst);
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(engine);
    }
}

impl std::fmt::Debug for DeferredBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredBootstrap")
            .field("loads", &self.load_count())
            .field("pending", &self.is_pending())
            .finish()
    }
}
