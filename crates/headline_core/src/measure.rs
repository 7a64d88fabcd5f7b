//! Measurement provider
//!
//! Reads the lead node's committed layout and converts it into viewport
//! units. Measuring is a pure read; callers must only measure after the
//! host has committed layout for the current structure.

use crate::geometry::{Geometry, Viewport};
use crate::nodes::HeadingNode;

/// Source of viewport size and node geometry
pub trait MeasurementProvider: Send + Sync {
    /// Current viewport size in pixels
    fn viewport(&self) -> Viewport;

    /// Measure the lead node
    ///
    /// Returns [`Geometry::ZERO`] if the node has no rendered box.
    fn measure(&self, lead: &dyn HeadingNode) -> Geometry {
        match lead.layout_size() {
            Some(size) => Geometry::from_pixels(size, self.viewport()),
            None => Geometry::ZERO,
        }
    }
}

/// Provider with a fixed viewport
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedViewport(pub Viewport);

impl MeasurementProvider for FixedViewport {
    fn viewport(&self) -> Viewport {
        self.0
    }
}
