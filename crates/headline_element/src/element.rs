//! The `text-animator` element
//!
//! Thin adapter between a host document and the orchestrator:
//!
//! - connecting renders the structure and configures the orchestrator
//! - an attribute change re-renders when the value actually changed
//! - a viewport resize resets the structure and rebuilds the timelines
//! - disconnecting tears the orchestrator down exactly once
//!
//! Each connection gets a fresh orchestrator, since teardown is terminal.

use headline_core::{
    AttributeName, Attributes, Configuration, HostServices, Orchestrator, Phase, TimelineRole,
};

use crate::error::Result;
use crate::event::{Event, WindowEvent};
use crate::markup::render_markup;
use crate::tree::HeadingTree;

/// Element tag name
pub const TAG_NAME: &str = "text-animator";

/// Attributes whose changes trigger a re-render
pub const OBSERVED_ATTRIBUTES: [AttributeName; 13] = AttributeName::ALL;

/// Animated heading element
pub struct TextAnimator {
    attributes: Attributes,
    tree: HeadingTree,
    services: HostServices,
    orchestrator: Option<Orchestrator>,
}

impl TextAnimator {
    pub fn new(tree: HeadingTree, services: HostServices, attributes: Attributes) -> Self {
        Self {
            attributes,
            tree,
            services,
            orchestrator: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.orchestrator.is_some()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get_attribute(&self, name: &str) -> Result<Option<&str>> {
        let name: AttributeName = name.parse()?;
        Ok(self.attributes.get(name))
    }

    /// Set an attribute; returns true if its value changed
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<bool> {
        let name: AttributeName = name.parse()?;
        let old = self.attributes.set(name, value);
        Ok(self.attribute_changed(name, old.as_deref(), Some(value)))
    }

    /// Remove an attribute; returns true if it was present
    pub fn remove_attribute(&mut self, name: &str) -> Result<bool> {
        let name: AttributeName = name.parse()?;
        let old = self.attributes.remove(name);
        Ok(self.attribute_changed(name, old.as_deref(), None))
    }

    fn attribute_changed(
        &mut self,
        name: AttributeName,
        old: Option<&str>,
        new: Option<&str>,
    ) -> bool {
        if old == new {
            return false;
        }
        tracing::debug!("{} changed: {:?} -> {:?}", name, old, new);
        if self.is_connected() {
            self.render();
        }
        true
    }

    /// Attach to the document: render and start animating
    pub fn connected(&mut self) {
        if self.is_connected() {
            return;
        }
        self.orchestrator = Some(Orchestrator::new(
            self.tree.heading_nodes(),
            self.services.clone(),
        ));
        self.render();
    }

    /// Detach from the document, killing every timeline
    pub fn disconnected(&mut self) {
        if let Some(orchestrator) = self.orchestrator.take() {
            orchestrator.teardown();
            self.tree.detach();
        }
    }

    /// React to a host event
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Window(WindowEvent::Resized { .. }) => self.on_resize(),
            Event::Window(WindowEvent::CloseRequested) => self.disconnected(),
            Event::Frame { .. } => {}
        }
    }

    fn on_resize(&self) {
        let Some(orchestrator) = &self.orchestrator else {
            return;
        };
        let config = orchestrator
            .configuration()
            .unwrap_or_else(|| self.configuration());
        self.tree.rebuild(&config);
        orchestrator.on_resize();
    }

    fn render(&self) {
        let Some(orchestrator) = &self.orchestrator else {
            return;
        };
        let config = self.configuration();
        self.tree.rebuild(&config);
        orchestrator.configure(config);
    }

    /// Configuration resolved from the current attributes
    pub fn configuration(&self) -> Configuration {
        Configuration::from_attributes(&self.attributes)
    }

    /// Markup for the current attributes
    pub fn markup(&self) -> String {
        render_markup(&self.configuration())
    }

    pub fn tree(&self) -> &HeadingTree {
        &self.tree
    }

    pub fn phase(&self) -> Phase {
        self.orchestrator
            .as_ref()
            .map_or(Phase::Uninitialized, Orchestrator::phase)
    }

    /// Roles with a live timeline
    pub fn live_roles(&self) -> Vec<TimelineRole> {
        self.orchestrator
            .as_ref()
            .map(Orchestrator::live_roles)
            .unwrap_or_default()
    }

    pub fn orchestrator(&self) -> Option<&Orchestrator> {
        self.orchestrator.as_ref()
    }
}

impl Drop for TextAnimator {
    fn drop(&mut self) {
        self.disconnected();
    }
}

impl std::fmt::Debug for TextAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnimator")
            .field("connected", &self.is_connected())
            .field("phase", &self.phase())
            .field("attributes", &self.attributes.len())
            .finish()
    }
}
