//! End-to-end tests against the headless host

use std::sync::Arc;

use headline_animation::{
    DeferredBootstrap, EngineCell, ImmediateBootstrap, PlaybackState, Unit,
};
use headline_core::{AttributeName, Attributes, NodeRole, Phase, TimelineRole, Viewport};

use crate::host::{ElementId, HeadlessHost};

const FRAME_MS: f32 = 16.0;

fn host() -> HeadlessHost {
    HeadlessHost::new(Viewport::new(1280.0, 720.0))
        .with_engine(Arc::new(EngineCell::new()), Arc::new(ImmediateBootstrap))
}

fn mount(host: &mut HeadlessHost, attributes: Attributes) -> ElementId {
    let id = host.create_element(attributes);
    host.connect(id).unwrap();
    id
}

fn run(host: &mut HeadlessHost, duration_ms: f32) {
    let mut elapsed = 0.0;
    while elapsed < duration_ms {
        host.frame(FRAME_MS);
        elapsed += FRAME_MS;
    }
}

fn timeline_count(host: &HeadlessHost) -> usize {
    host.engine()
        .scheduler()
        .map(|scheduler| scheduler.timeline_count())
        .unwrap_or(0)
}

fn cycling_text(host: &HeadlessHost, id: ElementId) -> String {
    host.element(id).unwrap().tree().snapshot().cycling
}

/// Milliseconds until the cycling text first shows anything
fn first_text_ms(host: &mut HeadlessHost, id: ElementId, limit_ms: f32) -> Option<f32> {
    let mut elapsed = 0.0;
    while elapsed < limit_ms {
        host.frame(FRAME_MS);
        elapsed += FRAME_MS;
        if !cycling_text(host, id).is_empty() {
            return Some(elapsed);
        }
    }
    None
}

#[test]
fn test_words_are_trimmed_and_cycled_in_order() {
    let mut host = host();
    let attrs = Attributes::new()
        .with(AttributeName::StaticText, "Hi")
        .with(AttributeName::RepeatingText, "A, B ,C")
        .with(AttributeName::AnimationDuration, "0.3");
    let id = mount(&mut host, attrs);
    assert_eq!(
        host.element(id).unwrap().configuration().cycling_words(),
        ["A", "B", "C"]
    );

    let mut shown: Vec<String> = Vec::new();
    let mut elapsed = 0.0;
    while elapsed < 7000.0 {
        host.frame(FRAME_MS);
        elapsed += FRAME_MS;
        let text = cycling_text(&host, id);
        if !text.is_empty() && shown.last() != Some(&text) {
            shown.push(text);
        }
    }
    assert_eq!(shown[..4], ["A", "B", "C", "A"]);
}

#[test]
fn test_blank_word_list_still_builds_cycle() {
    let mut host = host();
    let attrs = Attributes::new().with(AttributeName::RepeatingText, " , ,");
    let id = mount(&mut host, attrs);
    run(&mut host, 100.0);

    let element = host.element(id).unwrap();
    assert_eq!(element.configuration().cycling_words().len(), 1);
    assert_eq!(element.live_roles(), TimelineRole::ALL.to_vec());
}

#[test]
fn test_reconfigure_keeps_one_reveal() {
    let mut host = host();
    let attrs = Attributes::new().with(AttributeName::AnimationDuration, "1.0");
    let id = mount(&mut host, attrs);
    host.frame(FRAME_MS);
    let first = host
        .element(id)
        .and_then(|e| e.orchestrator())
        .and_then(|o| o.handle(TimelineRole::Reveal))
        .unwrap();
    assert_eq!(first.state(), Some(PlaybackState::Playing));

    host.set_attribute(id, "animation-duration", "0.3").unwrap();
    assert!(!first.is_alive());

    // 0.5s delay, 0.3s widen, 0.3s rise before the first word appears
    let shown_at = first_text_ms(&mut host, id, 5000.0).unwrap();
    assert!(shown_at >= 1100.0, "{shown_at}");
    assert!(shown_at < 1200.0, "{shown_at}");

    let element = host.element(id).unwrap();
    assert_eq!(element.live_roles().len(), 3);
    assert_eq!(timeline_count(&host), 3);
    let second = element.orchestrator().unwrap().handle(TimelineRole::Reveal).unwrap();
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_configure_twice_before_paint() {
    let mut host = host();
    let id = host.create_element(Attributes::new());
    host.connect(id).unwrap();
    host.set_attribute(id, "animation-duration", "1.0").unwrap();
    host.set_attribute(id, "animation-duration", "0.3").unwrap();
    assert_eq!(host.frames().pending_count(), 1);

    host.frame(FRAME_MS);
    assert_eq!(timeline_count(&host), 3);
    assert_eq!(
        host.element(id)
            .and_then(|e| e.orchestrator())
            .and_then(|o| o.configuration())
            .map(|c| c.animation_duration_secs()),
        Some(0.3)
    );
}

#[test]
fn test_zero_geometry_then_resize() {
    let mut host = HeadlessHost::new(Viewport::default())
        .with_engine(Arc::new(EngineCell::new()), Arc::new(ImmediateBootstrap));
    let id = mount(&mut host, Attributes::new());
    run(&mut host, 100.0);

    let element = host.element(id).unwrap();
    assert_eq!(element.phase(), Phase::Building);
    assert_eq!(element.live_roles(), vec![TimelineRole::Cursor]);

    host.resize(1280, 720);
    host.frame(FRAME_MS);
    let element = host.element(id).unwrap();
    assert_eq!(element.phase(), Phase::Live);
    assert_eq!(element.live_roles(), TimelineRole::ALL.to_vec());
}

#[test]
fn test_resize_storm_leaves_one_pair() {
    let mut host = host();
    let id = mount(&mut host, Attributes::new());
    run(&mut host, 200.0);
    let stale = host
        .element(id)
        .and_then(|e| e.orchestrator())
        .and_then(|o| o.handle(TimelineRole::Cycle))
        .unwrap();

    for width in [800, 900, 1000, 1100, 1200] {
        host.resize(width, 700);
    }
    assert!(!stale.is_alive());
    assert_eq!(host.frames().pending_count(), 1);

    host.frame(FRAME_MS);
    assert_eq!(host.element(id).unwrap().live_roles().len(), 3);
    assert_eq!(timeline_count(&host), 3);
}

#[test]
fn test_resize_remeasures_in_viewport_units() {
    let mut host = host();
    let id = mount(&mut host, Attributes::new());
    run(&mut host, 3000.0);
    let wide = host.element(id).unwrap().tree().snapshot().box_width_vw;
    assert!(wide > 0.0);

    // Font size is in vw, so the lead keeps its relative width
    host.resize(640, 720);
    run(&mut host, 3000.0);
    let snapshot = host.element(id).unwrap().tree().snapshot();
    assert!((snapshot.box_width_vw - wide).abs() < 0.01);
    assert!(snapshot.box_height_vh > 0.0);
}

#[test]
fn test_cycle_waits_for_lead_to_rise() {
    for duration in [0.1_f32, 0.3, 1.0, 2.5] {
        let mut host = host();
        let attrs =
            Attributes::new().with(AttributeName::AnimationDuration, duration.to_string());
        let id = mount(&mut host, attrs);

        let rise_end_ms = 500.0 + 2.0 * duration * 1000.0;
        let shown_at = first_text_ms(&mut host, id, rise_end_ms + 1000.0).unwrap();
        assert!(shown_at >= rise_end_ms, "{duration}s: text at {shown_at}ms");

        let lead = host.element(id).unwrap().tree().node(NodeRole::Lead).clone();
        assert!(lead.translate_y(Unit::Vw).abs() < 1e-3);
    }
}

#[test]
fn test_disconnect_is_terminal_for_that_connection() {
    let mut host = host();
    let id = mount(&mut host, Attributes::new());
    run(&mut host, 100.0);
    host.disconnect(id).unwrap();
    assert!(host.element(id).unwrap().live_roles().is_empty());
    assert_eq!(timeline_count(&host), 0);

    host.set_attribute(id, "static-text", "Still here").unwrap();
    host.resize(1000, 600);
    run(&mut host, 100.0);
    assert!(host.element(id).unwrap().live_roles().is_empty());
    assert_eq!(timeline_count(&host), 0);

    host.connect(id).unwrap();
    host.frame(FRAME_MS);
    assert_eq!(host.element(id).unwrap().tree().snapshot().lead, "Still here");
    assert_eq!(timeline_count(&host), 3);
}

#[test]
fn test_bootstrap_once_for_many_elements() {
    let bootstrap = Arc::new(DeferredBootstrap::new());
    let mut host = HeadlessHost::new(Viewport::new(1280.0, 720.0))
        .with_engine(Arc::new(EngineCell::new()), bootstrap.clone());
    let ids: Vec<ElementId> = (0..3)
        .map(|_| mount(&mut host, Attributes::new()))
        .collect();
    assert_eq!(bootstrap.load_count(), 1);
    for id in &ids {
        assert_eq!(host.element(*id).unwrap().phase(), Phase::AwaitingEngine);
    }

    // Frames before readiness animate nothing
    run(&mut host, 100.0);
    assert!(host.engine().scheduler().is_none());

    assert!(bootstrap.finish());
    host.frame(FRAME_MS);
    for id in &ids {
        assert_eq!(host.element(*id).unwrap().phase(), Phase::Live);
    }
    assert_eq!(timeline_count(&host), 9);
    assert_eq!(bootstrap.load_count(), 1);
}

#[test]
fn test_interleaved_events_never_leak_timelines() {
    let mut host = host();
    let a = mount(&mut host, Attributes::new());
    let b = mount(&mut host, Attributes::new());

    for step in 0..40u32 {
        match step % 5 {
            0 => {
                let duration = format!("{}", 0.2 + step as f32 * 0.05);
                host.set_attribute(a, "animation-duration", &duration).unwrap();
            }
            1 => host.resize(900 + step * 10, 700),
            2 => {
                let words = format!("x{step},y");
                host.set_attribute(b, "repeating-text", &words).unwrap();
            }
            _ => {
                host.frame(FRAME_MS);
            }
        }
        assert!(timeline_count(&host) <= 6, "step {step}");
        for id in [a, b] {
            let roles = host.element(id).unwrap().live_roles();
            assert!(roles.len() <= 3);
        }
    }

    run(&mut host, 100.0);
    assert_eq!(timeline_count(&host), 6);
}
