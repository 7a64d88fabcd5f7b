//! Headless host
//!
//! Stands in for a document: mounts elements, forwards viewport resizes
//! to connected elements and drives frames. Each frame commits layout,
//! runs next-paint callbacks, then advances the animation engine.

use std::sync::Arc;

use headline_animation::{EngineBootstrap, EngineCell, ImmediateBootstrap};
use headline_core::{Attributes, FrameQueue, HostServices, Viewport};
use indexmap::IndexSet;
use slotmap::{new_key_type, SlotMap};

use crate::element::TextAnimator;
use crate::error::{HostError, Result};
use crate::event::{ControlFlow, Event, WindowEvent};
use crate::text_measure::{EstimatedTextMeasurer, TextMeasurer};
use crate::tree::{HeadingTree, SharedViewport};

new_key_type! {
    /// Handle to a mounted element
    pub struct ElementId;
}

/// In-process document host
pub struct HeadlessHost {
    viewport: SharedViewport,
    measurer: Arc<dyn TextMeasurer>,
    frames: Arc<FrameQueue>,
    engine: Arc<EngineCell>,
    bootstrap: Arc<dyn EngineBootstrap>,
    elements: SlotMap<ElementId, TextAnimator>,
    /// Connected elements, in connection order
    resize_listeners: IndexSet<ElementId>,
    elapsed_ms: f64,
}

impl HeadlessHost {
    /// Host using the process-wide engine
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: SharedViewport::new(viewport),
            measurer: Arc::new(EstimatedTextMeasurer::default()),
            frames: Arc::new(FrameQueue::new()),
            engine: EngineCell::global(),
            bootstrap: Arc::new(ImmediateBootstrap),
            elements: SlotMap::with_key(),
            resize_listeners: IndexSet::new(),
            elapsed_ms: 0.0,
        }
    }

    /// Use a dedicated engine cell and bootstrap
    pub fn with_engine(
        mut self,
        engine: Arc<EngineCell>,
        bootstrap: Arc<dyn EngineBootstrap>,
    ) -> Self {
        self.engine = engine;
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    fn services(&self) -> HostServices {
        HostServices {
            measurement: Arc::new(self.viewport.clone()),
            frames: self.frames.clone(),
            engine: self.engine.clone(),
            bootstrap: self.bootstrap.clone(),
        }
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, attributes: Attributes) -> ElementId {
        let tree = HeadingTree::new(self.viewport.clone(), self.measurer.clone());
        let element = TextAnimator::new(tree, self.services(), attributes);
        self.elements.insert(element)
    }

    pub fn element(&self, id: ElementId) -> Option<&TextAnimator> {
        self.elements.get(id)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut TextAnimator> {
        self.elements
            .get_mut(id)
            .ok_or(HostError::UnknownElement(id))
    }

    /// Attach an element and subscribe it to resizes
    pub fn connect(&mut self, id: ElementId) -> Result<()> {
        self.element_mut(id)?.connected();
        self.resize_listeners.insert(id);
        tracing::debug!("connected {:?}", id);
        Ok(())
    }

    /// Unsubscribe an element and detach it
    pub fn disconnect(&mut self, id: ElementId) -> Result<()> {
        self.element_mut(id)?.disconnected();
        self.resize_listeners.shift_remove(&id);
        tracing::debug!("disconnected {:?}", id);
        Ok(())
    }

    /// Detach and drop an element
    pub fn remove_element(&mut self, id: ElementId) -> Result<()> {
        self.disconnect(id)?;
        self.elements.remove(id);
        Ok(())
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<bool> {
        self.element_mut(id)?.set_attribute(name, value)
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Result<bool> {
        self.element_mut(id)?.remove_attribute(name)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn listener_count(&self) -> usize {
        self.resize_listeners.len()
    }

    // =========================================================================
    // Events and frames
    // =========================================================================

    /// Deliver a host event
    pub fn dispatch(&mut self, event: Event) -> ControlFlow {
        match &event {
            Event::Window(WindowEvent::Resized { width, height }) => {
                self.viewport.set(Viewport::new(*width as f32, *height as f32));
                tracing::debug!("viewport resized to {}x{}", width, height);
                let listeners: Vec<ElementId> = self.resize_listeners.iter().copied().collect();
                for id in listeners {
                    if let Some(element) = self.elements.get_mut(id) {
                        element.handle_event(&event);
                    }
                }
                ControlFlow::Continue
            }
            Event::Window(WindowEvent::CloseRequested) => {
                for id in std::mem::take(&mut self.resize_listeners) {
                    if let Some(element) = self.elements.get_mut(id) {
                        element.handle_event(&event);
                    }
                }
                ControlFlow::Exit
            }
            Event::Frame { dt_ms } => {
                self.frame(*dt_ms);
                ControlFlow::Continue
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.dispatch(Event::resized(width, height));
    }

    /// Run one frame; returns true if any animation is still playing
    pub fn frame(&mut self, dt_ms: f32) -> bool {
        for id in &self.resize_listeners {
            if let Some(element) = self.elements.get(*id) {
                element.tree().commit_layout();
            }
        }
        self.frames.run_frame();
        self.elapsed_ms += f64::from(dt_ms);
        self.engine
            .scheduler()
            .map(|scheduler| scheduler.advance(dt_ms))
            .unwrap_or(false)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    /// Time driven through [`HeadlessHost::frame`] so far
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.frames
    }

    pub fn engine(&self) -> &Arc<EngineCell> {
        &self.engine
    }
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("viewport", &self.viewport())
            .field("elements", &self.elements.len())
            .field("listeners", &self.resize_listeners.len())
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headline_core::Phase;

    fn host() -> HeadlessHost {
        HeadlessHost::new(Viewport::new(1280.0, 720.0))
            .with_engine(Arc::new(EngineCell::new()), Arc::new(ImmediateBootstrap))
    }

    #[test]
    fn test_connect_subscribes_to_resize() {
        let mut host = host();
        let id = host.create_element(Attributes::new());
        assert_eq!(host.listener_count(), 0);

        host.connect(id).unwrap();
        assert_eq!(host.listener_count(), 1);
        host.disconnect(id).unwrap();
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.element_count(), 1);
    }

    #[test]
    fn test_frame_builds_timelines() {
        let mut host = host();
        let id = host.create_element(Attributes::new());
        host.connect(id).unwrap();
        assert_eq!(host.element(id).unwrap().phase(), Phase::Building);

        host.frame(16.0);
        assert_eq!(host.element(id).unwrap().phase(), Phase::Live);
        assert_eq!(host.element(id).unwrap().live_roles().len(), 3);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut host = host();
        host.resize(800, 600);
        assert_eq!(host.viewport(), Viewport::new(800.0, 600.0));
    }

    #[test]
    fn test_close_requested_detaches_everything() {
        let mut host = host();
        let a = host.create_element(Attributes::new());
        let b = host.create_element(Attributes::new());
        host.connect(a).unwrap();
        host.connect(b).unwrap();
        host.frame(16.0);

        assert_eq!(
            host.dispatch(Event::Window(WindowEvent::CloseRequested)),
            ControlFlow::Exit
        );
        assert_eq!(host.listener_count(), 0);
        assert!(!host.element(a).unwrap().is_connected());
        assert_eq!(host.engine().scheduler().unwrap().timeline_count(), 0);
    }

    #[test]
    fn test_unknown_element() {
        let mut host = host();
        let id = host.create_element(Attributes::new());
        host.remove_element(id).unwrap();
        assert!(matches!(host.connect(id), Err(HostError::UnknownElement(_))));
    }

    #[test]
    fn test_frame_event_advances_clock() {
        let mut host = host();
        host.dispatch(Event::Frame { dt_ms: 16.0 });
        host.dispatch(Event::Frame { dt_ms: 16.0 });
        assert_eq!(host.elapsed_ms(), 32.0);
    }
}
