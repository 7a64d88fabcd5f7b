//! Headline Element
//!
//! Host binding for the animated heading: the `text-animator` element,
//! an in-memory heading tree implementing the five node roles, markup
//! rendering and a headless host that drives layout, paint and animation.
//!
//! # Example
//!
//! ```ignore
//! use headline_element::prelude::*;
//!
//! let mut host = HeadlessHost::new(Viewport::new(1280.0, 720.0));
//! let id = host.create_element(Attributes::new());
//! host.connect(id)?;
//! host.frame(16.0);
//! println!("{}", host.element(id).unwrap().tree().snapshot());
//! ```

pub mod element;
pub mod error;
pub mod event;
pub mod host;
pub mod markup;
pub mod text_measure;
pub mod tree;

#[cfg(test)]
mod tests;

pub use element::{TextAnimator, OBSERVED_ATTRIBUTES, TAG_NAME};
pub use error::{HostError, Result};
pub use event::{ControlFlow, Event, WindowEvent};
pub use host::{ElementId, HeadlessHost};
pub use markup::{escape_html, render_markup};
pub use text_measure::{EstimatedTextMeasurer, TextLayoutOptions, TextMeasurer, TextMetrics};
pub use tree::{ElementNode, HeadingSnapshot, HeadingTree, SharedViewport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::element::TextAnimator;
    pub use crate::event::{ControlFlow, Event, WindowEvent};
    pub use crate::host::{ElementId, HeadlessHost};
    pub use crate::tree::HeadingSnapshot;
    pub use headline_core::{AttributeName, Attributes, Configuration, Viewport};
}
