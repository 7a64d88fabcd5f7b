//! Timeline factory
//!
//! Builds the heading's three timelines and installs them in the
//! [`LiveTimelines`] registry. Every build first kills the live timeline
//! of the same role, so a role never has more than one handle.

use std::fmt;

use headline_animation::{
    Easing, Gate, Property, PropertyValue, Repeat, SchedulerHandle, TargetRef, Timeline,
    TimelineHandle, Tween, Unit,
};

use crate::geometry::Geometry;

/// Delay before the box starts widening
pub const REVEAL_DELAY_MS: f32 = 500.0;
/// Offset the lead text rises from, in `vw`
pub const LEAD_RISE_VW: f32 = 7.0;
/// Pause between typing a word and erasing it
pub const WORD_HOLD_MS: f32 = 1000.0;
/// One cursor fade
pub const CURSOR_BLINK_MS: f32 = 500.0;

/// Role of a live timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimelineRole {
    Cursor,
    Reveal,
    Cycle,
}

impl TimelineRole {
    pub const ALL: [TimelineRole; 3] = [
        TimelineRole::Cursor,
        TimelineRole::Reveal,
        TimelineRole::Cycle,
    ];

    fn index(self) -> usize {
        match self {
            TimelineRole::Cursor => 0,
            TimelineRole::Reveal => 1,
            TimelineRole::Cycle => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimelineRole::Cursor => "cursor",
            TimelineRole::Reveal => "reveal",
            TimelineRole::Cycle => "cycle",
        }
    }
}

impl fmt::Display for TimelineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// LIVE HANDLES
// =============================================================================

/// At most one timeline handle per role
#[derive(Debug, Default)]
pub struct LiveTimelines {
    slots: [Option<TimelineHandle>; 3],
}

impl LiveTimelines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: TimelineRole) -> Option<&TimelineHandle> {
        self.slots[role.index()].as_ref()
    }

    /// Install `handle`, killing the previous handle of the same role
    pub fn insert(&mut self, role: TimelineRole, handle: TimelineHandle) {
        if let Some(previous) = self.slots[role.index()].replace(handle) {
            previous.kill();
        }
    }

    /// Kill and forget the handle for `role`
    ///
    /// Returns true if a handle was present. Absent or already-dead
    /// handles are skipped.
    pub fn kill(&mut self, role: TimelineRole) -> bool {
        match self.slots[role.index()].take() {
            Some(handle) => {
                handle.kill();
                true
            }
            None => false,
        }
    }

    /// Kill every live handle, returning how many were present
    pub fn kill_all(&mut self) -> usize {
        TimelineRole::ALL
            .into_iter()
            .filter(|role| self.kill(*role))
            .count()
    }

    /// Roles that currently hold a handle
    pub fn roles(&self) -> impl Iterator<Item = TimelineRole> + '_ {
        TimelineRole::ALL
            .into_iter()
            .filter(|role| self.slots[role.index()].is_some())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TIMELINE CONSTRUCTION
// =============================================================================

/// Infinite fade of the cursor from its current opacity to zero
pub fn cursor_timeline(cursor: TargetRef) -> Timeline {
    let mut timeline = Timeline::new().repeat(Repeat::Infinite);
    timeline.then(
        Tween::to(cursor, Property::Opacity, PropertyValue::number(0.0))
            .duration_ms(CURSOR_BLINK_MS)
            .easing(Easing::Power2InOut),
    );
    timeline
}

/// Box widen, lead rise, box grow; releases `gate` when the lead has risen
pub fn reveal_timeline(
    reveal_box: TargetRef,
    lead: TargetRef,
    geometry: Geometry,
    duration_secs: f32,
    gate: Gate,
) -> Timeline {
    let mut timeline = Timeline::new();
    timeline
        .then(
            Tween::to(
                reveal_box.clone(),
                Property::Width,
                PropertyValue::length(geometry.lead_width_vw, Unit::Vw),
            )
            .delay_ms(REVEAL_DELAY_MS)
            .duration_secs(duration_secs)
            .easing(Easing::Power4InOut),
        )
        .then(
            Tween::from(
                lead,
                Property::TranslateY,
                PropertyValue::length(LEAD_RISE_VW, Unit::Vw),
            )
            .duration_secs(duration_secs)
            .easing(Easing::Power3Out)
            .on_complete(move || gate.release()),
        )
        .then(
            Tween::to(
                reveal_box,
                Property::Height,
                PropertyValue::length(geometry.lead_height_vh, Unit::Vh),
            )
            .duration_secs(duration_secs)
            .easing(Easing::elastic_out()),
        );
    timeline
}

/// Paused, infinitely repeating type/hold/erase over `words`
pub fn cycle_timeline(text: TargetRef, words: &[String], duration_secs: f32) -> Timeline {
    let mut timeline = Timeline::new().repeat(Repeat::Infinite).paused();
    for word in words {
        let mut step = Timeline::new()
            .repeat(Repeat::Count(1))
            .yoyo(true)
            .repeat_delay_ms(WORD_HOLD_MS);
        step.then(
            Tween::to(text.clone(), Property::Text, PropertyValue::text(word.as_str()))
                .duration_secs(duration_secs)
                .easing(Easing::Power1Out),
        );
        timeline.then(step);
    }
    timeline
}

/// Registers the heading's timelines on the engine's scheduler
#[derive(Clone, Debug)]
pub struct TimelineFactory {
    scheduler: SchedulerHandle,
}

impl TimelineFactory {
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self { scheduler }
    }

    /// Kill the live handle for `role`, then register `timeline` in its place
    ///
    /// Returns false if the scheduler is gone, leaving the role empty.
    fn install(&self, live: &mut LiveTimelines, role: TimelineRole, timeline: Timeline) -> bool {
        live.kill(role);
        match self.scheduler.register(timeline) {
            Some(handle) => {
                tracing::debug!("built {} timeline {:?}", role, handle.id());
                live.insert(role, handle);
                true
            }
            None => {
                tracing::warn!("animation scheduler dropped; {} timeline not built", role);
                false
            }
        }
    }

    pub fn build_cursor(&self, live: &mut LiveTimelines, cursor: TargetRef) -> bool {
        self.install(live, TimelineRole::Cursor, cursor_timeline(cursor))
    }

    pub fn build_reveal(
        &self,
        live: &mut LiveTimelines,
        reveal_box: TargetRef,
        lead: TargetRef,
        geometry: Geometry,
        duration_secs: f32,
        gate: Gate,
    ) -> bool {
        let timeline = reveal_timeline(reveal_box, lead, geometry, duration_secs, gate);
        self.install(live, TimelineRole::Reveal, timeline)
    }

    /// Build the cycle timeline paused; it plays when `gate` is released
    pub fn build_cycle(
        &self,
        live: &mut LiveTimelines,
        text: TargetRef,
        words: &[String],
        duration_secs: f32,
        gate: &Gate,
    ) -> bool {
        let timeline = cycle_timeline(text, words, duration_secs);
        if !self.install(live, TimelineRole::Cycle, timeline) {
            return false;
        }
        if let Some(handle) = live.get(TimelineRole::Cycle) {
            gate.hold(handle.clone());
        }
        true
    }
}
