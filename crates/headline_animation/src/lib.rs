//! Headline Animation Engine
//!
//! Tweens, sequenced timelines and a scheduler with killable handles.
//!
//! # Features
//!
//! - **Easing**: power and elastic curves matching common tweening libraries
//! - **Tweens**: `to`/`from` animations of opacity, size, offset and typed text
//! - **Timelines**: Sequencing, repeat, yoyo and repeat delays, nested timelines
//! - **Scheduler**: Slotmap-backed registry; `kill()` is synchronous and idempotent
//! - **Gate**: Start a paused timeline from another timeline's completion
//! - **Engine**: Init-once readiness cell shared by every widget in the process

pub mod easing;
pub mod engine;
pub mod gate;
pub mod scheduler;
pub mod timeline;
pub mod tween;

pub use easing::Easing;
pub use engine::{DeferredBootstrap, EngineBootstrap, EngineCell, ImmediateBootstrap, ReadyCallback};
pub use gate::Gate;
pub use scheduler::{AnimationScheduler, SchedulerHandle, TimelineHandle, TimelineId};
pub use timeline::{PlaybackState, Repeat, Step, Timeline};
pub use tween::{
    interpolate, AnimationTarget, Callback, Property, PropertyValue, TargetRef, Tween, Unit,
};
