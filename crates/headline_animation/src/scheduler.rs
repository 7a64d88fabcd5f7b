//! Animation scheduler
//!
//! Owns every live timeline and advances them each frame. Timelines are
//! registered through a [`SchedulerHandle`] and controlled through the
//! returned [`TimelineHandle`]:
//! - `play()` / `pause()` toggle playback
//! - `kill()` removes the timeline; it never renders or fires callbacks again
//!
//! Callbacks collected while rendering run after the scheduler lock is
//! released, so they may freely start, pause or kill other timelines.

use crate::timeline::{PlaybackState, Timeline};
use crate::tween::Callback;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

new_key_type! {
    /// Handle to a registered timeline
    pub struct TimelineId;
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    timelines: SlotMap<TimelineId, Timeline>,
    last_frame: Instant,
}

fn lock(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The animation scheduler that ticks all live timelines
///
/// Cloning shares the same set of timelines.
#[derive(Clone)]
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                timelines: SlotMap::with_key(),
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Advance by the wall-clock time since the previous tick
    ///
    /// Returns true if any timeline is still playing.
    pub fn tick(&self) -> bool {
        let dt_ms = {
            let mut inner = lock(&self.inner);
            let now = Instant::now();
            let dt = (now - inner.last_frame).as_secs_f32() * 1000.0;
            inner.last_frame = now;
            dt
        };
        self.advance(dt_ms)
    }

    /// Advance every playing timeline by `dt_ms`
    ///
    /// Returns true if any timeline is still playing.
    pub fn advance(&self, dt_ms: f32) -> bool {
        let mut fired: SmallVec<[(TimelineId, Callback); 4]> = SmallVec::new();
        let active = {
            let mut inner = lock(&self.inner);
            let mut batch = Vec::new();
            for (id, timeline) in inner.timelines.iter_mut() {
                timeline.advance(dt_ms, &mut batch);
                fired.extend(batch.drain(..).map(|callback| (id, callback)));
            }
            // NOTE: completed timelines stay registered until killed so their
            // handles keep reporting a meaningful state.
            inner.timelines.iter().any(|(_, t)| t.is_playing())
        };

        for (id, callback) in fired {
            // An earlier callback in this batch may have killed the owner
            if lock(&self.inner).timelines.contains_key(id) {
                callback();
            }
        }
        active
    }

    /// Check if any timelines are still playing
    pub fn has_active_animations(&self) -> bool {
        lock(&self.inner)
            .timelines
            .iter()
            .any(|(_, t)| t.is_playing())
    }

    /// Get the number of registered timelines (playing, paused or completed)
    pub fn timeline_count(&self) -> usize {
        lock(&self.inner).timelines.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("timelines", &self.timeline_count())
            .finish()
    }
}

/// A weak handle to the animation scheduler
///
/// This is passed to components that need to register timelines.
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a timeline and return a handle to it
    ///
    /// Entries that render before they start (`from` tweens) are applied
    /// immediately. Returns `None` if the scheduler has been dropped.
    pub fn register(&self, mut timeline: Timeline) -> Option<TimelineHandle> {
        let inner = self.inner.upgrade()?;
        timeline.prime();
        let id = {
            let mut guard = lock(&inner);
            // Reset last_frame so the first tick doesn't see a huge dt
            guard.last_frame = Instant::now();
            guard.timelines.insert(timeline)
        };
        tracing::trace!("registered timeline {:?}", id);
        Some(TimelineHandle {
            id,
            scheduler: self.clone(),
        })
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn with_timeline<F, R>(&self, id: TimelineId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        let inner = self.inner.upgrade()?;
        let mut guard = lock(&inner);
        guard.timelines.get_mut(id).map(f)
    }

    fn remove(&self, id: TimelineId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).timelines.remove(id).is_some())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A killable reference to one registered timeline
///
/// Handles are cheap to clone. Every operation is a no-op once the
/// timeline has been killed or the scheduler dropped.
#[derive(Clone, Debug)]
pub struct TimelineHandle {
    id: TimelineId,
    scheduler: SchedulerHandle,
}

impl TimelineHandle {
    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Start or resume playback
    pub fn play(&self) {
        self.scheduler.with_timeline(self.id, Timeline::play);
    }

    pub fn pause(&self) {
        self.scheduler.with_timeline(self.id, Timeline::pause);
    }

    /// Stop the timeline for good
    ///
    /// Synchronous and idempotent: killing an already-killed or completed
    /// timeline is a no-op. Returns true if this call removed it.
    pub fn kill(&self) -> bool {
        let removed = self.scheduler.remove(self.id);
        if removed {
            tracing::trace!("killed timeline {:?}", self.id);
        }
        removed
    }

    /// Whether the timeline is still registered
    pub fn is_alive(&self) -> bool {
        self.scheduler.with_timeline(self.id, |_| ()).is_some()
    }

    pub fn state(&self) -> Option<PlaybackState> {
        self.scheduler.with_timeline(self.id, |t| t.state())
    }

    pub fn is_playing(&self) -> bool {
        self.state() == Some(PlaybackState::Playing)
    }

    pub fn is_paused(&self) -> bool {
        self.state() == Some(PlaybackState::Paused)
    }

    /// Elapsed playback time in milliseconds
    pub fn elapsed(&self) -> Option<f32> {
        self.scheduler.with_timeline(self.id, |t| t.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::{AnimationTarget, Property, PropertyValue, Tween, Unit};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Sink;

    impl AnimationTarget for Sink {
        fn read(&self, _property: Property, _unit: Unit) -> Option<PropertyValue> {
            None
        }

        fn write(&self, _property: Property, _value: &PropertyValue) {}
    }

    fn fade(duration_ms: f32) -> Timeline {
        let mut timeline = Timeline::new();
        timeline.then(
            Tween::to(Arc::new(Sink), Property::Opacity, PropertyValue::number(0.0))
                .duration_ms(duration_ms),
        );
        timeline
    }

    #[test]
    fn test_scheduler_advance() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle().register(fade(100.0)).unwrap();

        assert!(scheduler.advance(50.0));
        assert_eq!(handle.elapsed(), Some(50.0));
        assert!(!scheduler.advance(60.0));
        assert_eq!(handle.state(), Some(PlaybackState::Completed));
        // Completed timelines stay registered until killed
        assert_eq!(scheduler.timeline_count(), 1);
    }

    #[test]
    fn test_kill_is_idempotent() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle().register(fade(100.0)).unwrap();

        assert!(handle.kill());
        assert!(!handle.kill());
        assert!(!handle.is_alive());
        assert_eq!(scheduler.timeline_count(), 0);

        // Operations on a dead handle are no-ops
        handle.play();
        handle.pause();
        assert_eq!(handle.state(), None);
    }

    #[test]
    fn test_stale_handle_does_not_touch_new_timeline() {
        let scheduler = AnimationScheduler::new();
        let old = scheduler.handle().register(fade(100.0)).unwrap();
        old.kill();
        let new = scheduler.handle().register(fade(100.0)).unwrap();

        assert!(!old.kill());
        assert!(new.is_alive());
    }

    #[test]
    fn test_paused_timeline_resumes() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle().register(fade(100.0).paused()).unwrap();

        assert!(!scheduler.advance(50.0));
        assert_eq!(handle.elapsed(), Some(0.0));

        handle.play();
        assert!(scheduler.advance(50.0));
        assert_eq!(handle.elapsed(), Some(50.0));
    }

    #[test]
    fn test_callbacks_run_outside_lock() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let follower = handle.register(fade(100.0).paused()).unwrap();

        let release = follower.clone();
        let mut leader = Timeline::new();
        leader.then(
            Tween::to(Arc::new(Sink), Property::Opacity, PropertyValue::number(0.0))
                .duration_ms(10.0)
                .on_complete(move || release.play()),
        );
        handle.register(leader).unwrap();

        scheduler.advance(20.0);
        assert!(follower.is_playing());
    }

    #[test]
    fn test_killed_timeline_callbacks_are_skipped() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let count = Arc::new(AtomicUsize::new(0));

        let make = |count: Arc<AtomicUsize>| {
            let mut timeline = Timeline::new();
            timeline.then(
                Tween::to(Arc::new(Sink), Property::Opacity, PropertyValue::number(0.0))
                    .duration_ms(10.0)
                    .on_complete(move || {
                        count.fetch_add(1, Ordering::SeqCst);
                    }),
            );
            timeline
        };

        let first = handle.register(make(count.clone())).unwrap();
        first.kill();
        handle.register(make(count.clone())).unwrap();

        scheduler.advance(20.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        // Scheduler is dropped, handle should not be alive
        assert!(!handle.is_alive());
        assert!(handle.register(fade(10.0)).is_none());
    }
}
