//! Headline Core
//!
//! Configuration, measurement and the orchestrator that keeps exactly one
//! cursor, reveal and cycle timeline alive per heading.
//!
//! # Example
//!
//! ```ignore
//! use headline_core::prelude::*;
//!
//! let orchestrator = Orchestrator::new(nodes, services);
//! orchestrator.configure(Configuration::from_attributes(&attributes));
//! // on viewport resize
//! orchestrator.on_resize();
//! // on detach
//! orchestrator.teardown();
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod frame;
pub mod geometry;
pub mod measure;
pub mod nodes;
pub mod orchestrator;

pub use config::{AttributeName, Attributes, Configuration, HeadingLevel, StyleParams};
pub use error::{ConfigError, Result};
pub use factory::{LiveTimelines, TimelineFactory, TimelineRole};
pub use frame::{FrameCallback, FrameQueue, FrameRequestId, FrameScheduler};
pub use geometry::{Geometry, PixelSize, Viewport};
pub use measure::{FixedViewport, MeasurementProvider};
pub use nodes::{HeadingNode, HeadingNodes, NodeRef, NodeRole};
pub use orchestrator::{HostServices, Orchestrator, Phase};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AttributeName, Attributes, Configuration};
    pub use crate::frame::{FrameQueue, FrameScheduler};
    pub use crate::geometry::{Geometry, PixelSize, Viewport};
    pub use crate::measure::MeasurementProvider;
    pub use crate::nodes::{HeadingNode, HeadingNodes, NodeRole};
    pub use crate::orchestrator::{HostServices, Orchestrator, Phase};
    pub use crate::TimelineRole;
}
