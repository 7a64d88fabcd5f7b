//! Animation orchestrator
//!
//! One orchestrator per widget. It owns the widget's live timelines and
//! sequences their construction around two asynchronous dependencies:
//!
//! 1. the animation engine, loaded at most once per process
//! 2. the next paint checkpoint, after which the lead text can be measured
//!
//! ```text
//! Uninitialized ──configure──▶ AwaitingEngine ──ready──▶ Building ──frame──▶ Live
//!                                                          ▲  │               │
//!                                                          │  └─zero geometry │
//!                                                          └──configure/resize┘
//! any state ──teardown──▶ TornDown (terminal)
//! ```
//!
//! Every build pass kills all live timelines and cancels any pending frame
//! request before starting, so the last configure or resize wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use headline_animation::{
    AnimationScheduler, EngineBootstrap, EngineCell, Gate, TimelineHandle,
};

use crate::config::Configuration;
use crate::factory::{LiveTimelines, TimelineFactory, TimelineRole};
use crate::frame::{FrameRequestId, FrameScheduler};
use crate::measure::MeasurementProvider;
use crate::nodes::{HeadingNodes, NodeRole};

/// Orchestrator lifecycle phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    /// Configured, waiting for the animation engine
    AwaitingEngine,
    /// Cursor running, waiting for a measurable paint
    Building,
    /// All three timelines built
    Live,
    /// Detached; every call is a no-op
    TornDown,
}

/// Host collaborators the orchestrator depends on
///
/// `frames` must defer callbacks; running them inside `request_frame`
/// would re-enter the orchestrator while it is locked.
#[derive(Clone)]
pub struct HostServices {
    pub measurement: Arc<dyn MeasurementProvider>,
    pub frames: Arc<dyn FrameScheduler>,
    pub engine: Arc<EngineCell>,
    pub bootstrap: Arc<dyn EngineBootstrap>,
}

#[derive(Default)]
struct State {
    phase: Phase,
    /// Configuration of the current build pass
    config: Option<Configuration>,
    /// Latest configuration received before the engine was ready
    pending: Option<Configuration>,
    /// Present once the engine is ready; never reset
    factory: Option<TimelineFactory>,
    live: LiveTimelines,
    /// Bumped on every build pass and on teardown
    generation: u64,
    frame_request: Option<FrameRequestId>,
    waiting_for_engine: bool,
}

struct Shared {
    nodes: HeadingNodes,
    services: HostServices,
    state: Mutex<State>,
}

/// Per-widget animation state machine
///
/// Cloning shares the same orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(nodes: HeadingNodes, services: HostServices) -> Self {
        Self {
            shared: Arc::new(Shared {
                nodes,
                services,
                state: Mutex::new(State::default()),
            }),
        }
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a build pass for `config`
    ///
    /// Before the engine is ready only the latest configuration is kept;
    /// it is built once readiness arrives.
    pub fn configure(&self, config: Configuration) {
        let mut guard = self.lock();
        let state = &mut *guard;
        match state.phase {
            Phase::TornDown => {
                tracing::debug!("configure after teardown ignored");
                return;
            }
            _ if state.factory.is_some() => {
                state.config = Some(config);
                self.begin_build(state);
                return;
            }
            _ => {}
        }

        if state.pending.replace(config).is_some() {
            tracing::debug!("superseding queued configuration");
        }
        state.phase = Phase::AwaitingEngine;
        if state.waiting_for_engine {
            return;
        }
        state.waiting_for_engine = true;
        drop(guard);

        let weak = Arc::downgrade(&self.shared);
        let services = &self.shared.services;
        services.engine.request(
            services.bootstrap.as_ref(),
            Box::new(move |scheduler| {
                if let Some(orchestrator) = Orchestrator::from_weak(&weak) {
                    orchestrator.on_engine_ready(scheduler);
                }
            }),
        );
    }

    /// Rebuild against fresh geometry with the current configuration
    pub fn on_resize(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.phase == Phase::TornDown {
            return;
        }
        if state.factory.is_none() || state.config.is_none() {
            // The queued configuration measures once the engine is ready
            return;
        }
        self.begin_build(state);
    }

    /// Kill every timeline and stop responding to further calls
    pub fn teardown(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.phase == Phase::TornDown {
            return;
        }
        let killed = state.live.kill_all();
        if let Some(id) = state.frame_request.take() {
            self.shared.services.frames.cancel_frame(id);
        }
        state.pending = None;
        state.generation += 1;
        state.phase = Phase::TornDown;
        tracing::debug!("torn down, killed {} timeline(s)", killed);
    }

    fn on_engine_ready(&self, scheduler: AnimationScheduler) {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.waiting_for_engine = false;
        if state.factory.is_none() {
            state.factory = Some(TimelineFactory::new(scheduler.handle()));
        }
        if state.phase == Phase::TornDown {
            return;
        }
        if let Some(config) = state.pending.take() {
            state.config = Some(config);
            self.begin_build(state);
        }
    }

    // =========================================================================
    // Build pass
    // =========================================================================

    fn begin_build(&self, state: &mut State) {
        let killed = state.live.kill_all();
        if let Some(id) = state.frame_request.take() {
            if self.shared.services.frames.cancel_frame(id) {
                tracing::debug!("superseded pending measurement");
            }
        }
        state.generation += 1;
        state.phase = Phase::Building;
        tracing::debug!(
            "build pass {} started, killed {} timeline(s)",
            state.generation,
            killed
        );

        let Some(factory) = state.factory.as_ref() else {
            return;
        };
        factory.build_cursor(&mut state.live, self.shared.nodes.target(NodeRole::Cursor));

        let generation = state.generation;
        let weak = Arc::downgrade(&self.shared);
        let id = self.shared.services.frames.request_frame(Box::new(move || {
            if let Some(orchestrator) = Orchestrator::from_weak(&weak) {
                orchestrator.on_frame(generation);
            }
        }));
        state.frame_request = Some(id);
    }

    fn on_frame(&self, generation: u64) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.generation != generation || state.phase != Phase::Building {
            return;
        }
        state.frame_request = None;

        let nodes = &self.shared.nodes;
        let geometry = self
            .shared
            .services
            .measurement
            .measure(nodes.get(NodeRole::Lead).as_ref());
        if !geometry.is_ready() {
            tracing::debug!("lead text has no layout yet; waiting for resize or reconfigure");
            return;
        }

        let (Some(factory), Some(config)) = (state.factory.as_ref(), state.config.as_ref())
        else {
            return;
        };
        let duration = config.animation_duration_secs();
        let gate = Gate::new();
        let reveal = factory.build_reveal(
            &mut state.live,
            nodes.target(NodeRole::RevealBox),
            nodes.target(NodeRole::Lead),
            geometry,
            duration,
            gate.clone(),
        );
        let cycle = factory.build_cycle(
            &mut state.live,
            nodes.target(NodeRole::CyclingText),
            config.cycling_words(),
            duration,
            &gate,
        );
        if reveal && cycle {
            state.phase = Phase::Live;
            tracing::debug!(
                "live: {:.2}vw x {:.2}vh over {}s",
                geometry.lead_width_vw,
                geometry.lead_height_vh,
                duration
            );
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Whether the engine has been delivered to this orchestrator
    pub fn is_engine_ready(&self) -> bool {
        self.lock().factory.is_some()
    }

    pub fn handle(&self, role: TimelineRole) -> Option<TimelineHandle> {
        self.lock().live.get(role).cloned()
    }

    /// Roles with a live handle
    pub fn live_roles(&self) -> Vec<TimelineRole> {
        self.lock().live.roles().collect()
    }

    /// Configuration of the current build pass
    pub fn configuration(&self) -> Option<Configuration> {
        self.lock().config.clone()
    }

    /// Configuration queued while the engine loads
    pub fn pending_configuration(&self) -> Option<Configuration> {
        self.lock().pending.clone()
    }

    pub fn nodes(&self) -> &HeadingNodes {
        &self.shared.nodes
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Orchestrator")
            .field("phase", &state.phase)
            .field("live", &state.live.len())
            .field("generation", &state.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameQueue;
    use crate::geometry::{PixelSize, Viewport};
    use crate::measure::FixedViewport;
    use crate::nodes::testing::MockNodes;
    use headline_animation::{DeferredBootstrap, ImmediateBootstrap};

    struct Fixture {
        mocks: MockNodes,
        frames: Arc<FrameQueue>,
        engine: Arc<EngineCell>,
        orchestrator: Orchestrator,
    }

    impl Fixture {
        fn new(bootstrap: Arc<dyn EngineBootstrap>) -> Self {
            Self::with_engine(Arc::new(EngineCell::new()), bootstrap)
        }

        fn with_engine(engine: Arc<EngineCell>, bootstrap: Arc<dyn EngineBootstrap>) -> Self {
            let mocks = MockNodes::new();
            mocks.lead.set_size(Some(PixelSize::new(400.0, 80.0)));
            let frames = Arc::new(FrameQueue::new());
            let orchestrator = Orchestrator::new(
                mocks.nodes(),
                HostServices {
                    measurement: Arc::new(FixedViewport(Viewport::new(1600.0, 900.0))),
                    frames: frames.clone(),
                    engine: engine.clone(),
                    bootstrap,
                },
            );
            Self {
                mocks,
                frames,
                engine,
                orchestrator,
            }
        }

        fn scheduler(&self) -> AnimationScheduler {
            self.engine.scheduler().unwrap()
        }
    }

    fn config(duration: f32) -> Configuration {
        Configuration::default().with_animation_duration_secs(duration)
    }

    #[test]
    fn test_configure_builds_cursor_then_measures() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.orchestrator.configure(config(1.0));

        assert_eq!(fx.orchestrator.phase(), Phase::Building);
        assert_eq!(fx.orchestrator.live_roles(), vec![TimelineRole::Cursor]);
        assert_eq!(fx.frames.pending_count(), 1);

        fx.frames.run_frame();
        assert_eq!(fx.orchestrator.phase(), Phase::Live);
        assert_eq!(fx.orchestrator.live_roles(), TimelineRole::ALL.to_vec());
        assert!(fx.orchestrator.handle(TimelineRole::Cycle).unwrap().is_paused());
        assert_eq!(fx.scheduler().timeline_count(), 3);
    }

    #[test]
    fn test_latest_configuration_wins_while_loading() {
        let bootstrap = Arc::new(DeferredBootstrap::new());
        let fx = Fixture::new(bootstrap.clone());

        fx.orchestrator.configure(config(1.0));
        fx.orchestrator.configure(config(0.3));
        fx.orchestrator.on_resize();
        assert_eq!(fx.orchestrator.phase(), Phase::AwaitingEngine);
        assert!(fx.orchestrator.live_roles().is_empty());
        assert_eq!(bootstrap.load_count(), 1);

        bootstrap.finish();
        assert!(fx.orchestrator.is_engine_ready());
        assert!(fx.orchestrator.pending_configuration().is_none());
        assert_eq!(
            fx.orchestrator.configuration().unwrap().animation_duration_secs(),
            0.3
        );
        assert_eq!(fx.frames.pending_count(), 1);
    }

    #[test]
    fn test_reconfigure_kills_previous_reveal() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.orchestrator.configure(config(1.0));
        fx.frames.run_frame();
        let first = fx.orchestrator.handle(TimelineRole::Reveal).unwrap();

        fx.orchestrator.configure(config(0.3));
        assert!(!first.is_alive());
        fx.frames.run_frame();

        let second = fx.orchestrator.handle(TimelineRole::Reveal).unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(fx.scheduler().timeline_count(), 3);
    }

    #[test]
    fn test_zero_geometry_waits_for_resize() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.mocks.lead.set_size(None);
        fx.orchestrator.configure(config(1.0));
        fx.frames.run_frame();

        assert_eq!(fx.orchestrator.phase(), Phase::Building);
        assert_eq!(fx.orchestrator.live_roles(), vec![TimelineRole::Cursor]);
        assert_eq!(fx.frames.pending_count(), 0);

        fx.mocks.lead.set_size(Some(PixelSize::new(400.0, 80.0)));
        fx.orchestrator.on_resize();
        fx.frames.run_frame();
        assert_eq!(fx.orchestrator.phase(), Phase::Live);
        assert_eq!(fx.orchestrator.live_roles().len(), 3);
    }

    #[test]
    fn test_resize_storm_leaves_one_pass() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.orchestrator.configure(config(1.0));
        for _ in 0..5 {
            fx.orchestrator.on_resize();
        }
        assert_eq!(fx.frames.pending_count(), 1);

        assert_eq!(fx.frames.run_frame(), 1);
        assert_eq!(fx.orchestrator.live_roles().len(), 3);
        assert_eq!(fx.scheduler().timeline_count(), 3);
    }

    #[test]
    fn test_teardown_is_terminal() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.orchestrator.configure(config(1.0));
        fx.frames.run_frame();
        fx.orchestrator.teardown();

        assert_eq!(fx.orchestrator.phase(), Phase::TornDown);
        assert!(fx.orchestrator.live_roles().is_empty());
        assert_eq!(fx.scheduler().timeline_count(), 0);

        fx.orchestrator.configure(config(0.5));
        fx.orchestrator.on_resize();
        fx.orchestrator.teardown();
        fx.frames.run_frame();
        assert!(fx.orchestrator.live_roles().is_empty());
        assert_eq!(fx.scheduler().timeline_count(), 0);
    }

    #[test]
    fn test_teardown_cancels_pending_measurement() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.orchestrator.configure(config(1.0));
        fx.orchestrator.teardown();
        assert_eq!(fx.frames.pending_count(), 0);
        assert_eq!(fx.scheduler().timeline_count(), 0);
    }

    #[test]
    fn test_teardown_while_loading_builds_nothing() {
        let bootstrap = Arc::new(DeferredBootstrap::new());
        let fx = Fixture::new(bootstrap.clone());
        fx.orchestrator.configure(config(1.0));
        fx.orchestrator.teardown();

        bootstrap.finish();
        assert_eq!(fx.orchestrator.phase(), Phase::TornDown);
        assert_eq!(fx.frames.pending_count(), 0);
        assert_eq!(fx.scheduler().timeline_count(), 0);
    }

    #[test]
    fn test_widgets_share_one_bootstrap() {
        let engine = Arc::new(EngineCell::new());
        let bootstrap = Arc::new(DeferredBootstrap::new());
        let a = Fixture::with_engine(engine.clone(), bootstrap.clone());
        let b = Fixture::with_engine(engine.clone(), bootstrap.clone());

        a.orchestrator.configure(config(1.0));
        b.orchestrator.configure(config(1.0));
        assert_eq!(bootstrap.load_count(), 1);

        bootstrap.finish();
        assert_eq!(a.orchestrator.phase(), Phase::Building);
        assert_eq!(b.orchestrator.phase(), Phase::Building);
    }

    #[test]
    fn test_cycle_starts_after_lead_rises() {
        let fx = Fixture::new(Arc::new(ImmediateBootstrap));
        fx.orchestrator.configure(config(1.0).with_cycling_words("A, B ,C"));
        fx.frames.run_frame();
        let scheduler = fx.scheduler();
        let cycle = fx.orchestrator.handle(TimelineRole::Cycle).unwrap();

        // Delay, widen, then most of the rise
        scheduler.advance(500.0);
        scheduler.advance(1000.0);
        scheduler.advance(990.0);
        assert!(cycle.is_paused());
        assert_eq!(fx.mocks.cycling_text.text(), "");

        scheduler.advance(10.0);
        assert!(cycle.is_playing());
        scheduler.advance(1000.0);
        assert_eq!(fx.mocks.cycling_text.text(), "A");
    }
}
