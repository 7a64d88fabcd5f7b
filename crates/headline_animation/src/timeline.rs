//! Timeline orchestration
//!
//! A timeline sequences tweens and nested timelines. Entries are appended
//! with [`Timeline::then`], each starting where the previous one ends plus
//! its own delay. Timelines can repeat (finitely or forever), play back and
//! forth (yoyo) and pause between repeats.
//!
//! Rendering is stateless with respect to direction: the timeline maps its
//! elapsed time onto an iteration and a local time, then renders every
//! entry that has started at its clamped local offset, in sequence order.
//!
//! ```ignore
//! let mut timeline = Timeline::new().repeat(Repeat::Infinite);
//! timeline
//!     .then(Tween::to(node.clone(), Property::Opacity, PropertyValue::number(0.0)))
//!     .then(Tween::to(node, Property::Opacity, PropertyValue::number(1.0)));
//! ```

use std::fmt;

use crate::tween::{Callback, Tween};

/// How many times a timeline plays after its first iteration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    /// Play exactly once
    #[default]
    Once,
    /// Play once plus `n` repeats
    Count(u32),
    Infinite,
}

/// Playback state of a top-level timeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Playing,
    Paused,
    Completed,
}

/// Something that can sit in a timeline's sequence
pub enum Step {
    Tween(Tween),
    Timeline(Timeline),
}

impl Step {
    fn duration(&self) -> f32 {
        match self {
            Step::Tween(tween) => tween.duration(),
            Step::Timeline(timeline) => timeline.total_duration(),
        }
    }

    fn delay(&self) -> f32 {
        match self {
            Step::Tween(tween) => tween.delay(),
            Step::Timeline(timeline) => timeline.delay_ms,
        }
    }

    fn take_on_complete(&mut self) -> Option<Callback> {
        match self {
            Step::Tween(tween) => tween.take_on_complete(),
            Step::Timeline(timeline) => timeline.on_complete.take(),
        }
    }

    fn renders_immediately(&self) -> bool {
        match self {
            Step::Tween(tween) => tween.renders_immediately(),
            Step::Timeline(timeline) => timeline
                .entries
                .iter()
                .any(|entry| entry.step.renders_immediately()),
        }
    }

    fn render(&mut self, time_ms: f32, fired: &mut Vec<Callback>) {
        match self {
            Step::Tween(tween) => tween.render(time_ms),
            Step::Timeline(timeline) => timeline.render(time_ms, fired),
        }
    }

    fn prime(&mut self) {
        match self {
            Step::Tween(tween) => {
                if tween.renders_immediately() {
                    tween.render(0.0);
                }
            }
            Step::Timeline(timeline) => timeline.prime(),
        }
    }
}

impl From<Tween> for Step {
    fn from(tween: Tween) -> Self {
        Step::Tween(tween)
    }
}

impl From<Timeline> for Step {
    fn from(timeline: Timeline) -> Self {
        Step::Timeline(timeline)
    }
}

struct Entry {
    start_ms: f32,
    step: Step,
    on_complete: Option<Callback>,
    /// Set once the end has been passed in the current forward sweep
    completed: bool,
}

impl Entry {
    fn end_ms(&self) -> f32 {
        self.start_ms + self.step.duration()
    }
}

/// A sequence of tweens and nested timelines
#[derive(Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    /// End of the last entry, where the next `then` is placed
    sequence_end_ms: f32,
    repeat: Repeat,
    yoyo: bool,
    repeat_delay_ms: f32,
    delay_ms: f32,
    on_complete: Option<Callback>,
    // Top-level playback
    state: PlaybackState,
    elapsed_ms: f32,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Reverse direction on every other iteration
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Hold between iterations
    pub fn repeat_delay_ms(mut self, delay_ms: f32) -> Self {
        self.repeat_delay_ms = delay_ms.max(0.0);
        self
    }

    /// Gap before this timeline when nested, or before playback when top-level
    pub fn delay_ms(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    /// Create in the paused state; playback starts on [`Timeline::play`]
    pub fn paused(mut self) -> Self {
        self.state = PlaybackState::Paused;
        self
    }

    /// Fire `callback` when this timeline completes as a nested entry
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(std::sync::Arc::new(callback));
        self
    }

    /// Append a tween or timeline after the current end of the sequence
    pub fn then(&mut self, step: impl Into<Step>) -> &mut Self {
        let mut step = step.into();
        let start_ms = self.sequence_end_ms + step.delay();
        let on_complete = step.take_on_complete();
        let entry = Entry {
            start_ms,
            step,
            on_complete,
            completed: false,
        };
        self.sequence_end_ms = entry.end_ms();
        self.entries.push(entry);
        self
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Length of one iteration
    pub fn iteration_duration(&self) -> f32 {
        self.sequence_end_ms
    }

    /// Length of all iterations including repeat delays (infinite when repeating forever)
    pub fn total_duration(&self) -> f32 {
        let iteration = self.iteration_duration();
        match self.repeat {
            Repeat::Once => iteration,
            Repeat::Count(n) => iteration * (n as f32 + 1.0) + self.repeat_delay_ms * n as f32,
            Repeat::Infinite => f32::INFINITY,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Time since playback started, including the top-level delay
    ///
    /// Timelines that repeat forever report time within the current period.
    pub fn elapsed(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Apply start values of entries that render before they begin
    pub(crate) fn prime(&mut self) {
        for entry in &mut self.entries {
            entry.step.prime();
        }
    }

    /// Advance a top-level timeline by `dt_ms`, collecting fired callbacks
    pub(crate) fn advance(&mut self, dt_ms: f32, fired: &mut Vec<Callback>) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        let mut time = self.elapsed_ms - self.delay_ms;
        if time < 0.0 {
            return;
        }
        if self.repeat == Repeat::Infinite {
            time = self.wrap_clock(time);
        }
        let total = self.total_duration();
        self.render(time.min(total), fired);
        if time >= total {
            self.state = PlaybackState::Completed;
        }
    }

    /// Fold an endlessly repeating clock back into its first period
    ///
    /// Yoyo timelines fold over two iterations so the direction is kept.
    /// Returns the folded time.
    fn wrap_clock(&mut self, time: f32) -> f32 {
        let mut period = self.iteration_duration() + self.repeat_delay_ms;
        if self.yoyo {
            period *= 2.0;
        }
        if period <= 0.0 || time < period {
            return time;
        }
        let folded = (time - (time / period).floor() * period).clamp(0.0, period);
        self.elapsed_ms = self.delay_ms + folded;
        folded
    }

    /// Render at `time_ms` measured from the start of the first iteration
    pub(crate) fn render(&mut self, time_ms: f32, fired: &mut Vec<Callback>) {
        let (local, backwards) = self.local_time(time_ms);
        for entry in &mut self.entries {
            let end = entry.end_ms();
            if local < entry.start_ms {
                if entry.step.renders_immediately() {
                    entry.step.render(0.0, fired);
                }
                entry.completed = false;
                continue;
            }
            let offset = (local - entry.start_ms).min(entry.step.duration());
            entry.step.render(offset, fired);
            if local < end {
                entry.completed = false;
            } else if !backwards && !entry.completed {
                entry.completed = true;
                if let Some(callback) = &entry.on_complete {
                    fired.push(callback.clone());
                }
            }
        }
    }

    /// Map overall time onto (local time within an iteration, reversed?)
    fn local_time(&self, time_ms: f32) -> (f32, bool) {
        let iteration_len = self.iteration_duration();
        if iteration_len <= 0.0 {
            return (0.0, false);
        }
        let cycle = iteration_len + self.repeat_delay_ms;
        let mut iteration = (time_ms.max(0.0) / cycle).floor();
        let mut within = time_ms - iteration * cycle;
        if let Repeat::Count(_) | Repeat::Once = self.repeat {
            let last = match self.repeat {
                Repeat::Count(n) => n as f32,
                _ => 0.0,
            };
            if iteration > last {
                iteration = last;
                within = iteration_len;
            }
        }
        let within = within.clamp(0.0, iteration_len);
        let backwards = self.yoyo && (iteration as u64) % 2 == 1;
        if backwards {
            (iteration_len - within, true)
        } else {
            (within, false)
        }
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("entries", &self.entries.len())
            .field("repeat", &self.repeat)
            .field("yoyo", &self.yoyo)
            .field("repeat_delay_ms", &self.repeat_delay_ms)
            .field("state", &self.state)
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}
