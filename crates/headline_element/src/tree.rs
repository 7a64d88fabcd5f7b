//! In-memory heading tree
//!
//! Holds the five nodes of one heading and the state tweens write into.
//! Lengths keep the unit they were written in and are converted through
//! the shared viewport when read back, so `vw`/`vh` values follow resizes.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use headline_animation::{AnimationTarget, Property, PropertyValue, Unit};
use headline_core::{
    Configuration, HeadingLevel, HeadingNode, HeadingNodes, MeasurementProvider, NodeRole,
    PixelSize, Viewport,
};
use serde::Serialize;

use crate::text_measure::{TextLayoutOptions, TextMeasurer};

/// Line height of the heading
const LINE_HEIGHT: f32 = 1.2;
/// Resting height of the reveal box, in `vw`
const BOX_REST_HEIGHT_VW: f32 = 1.0;

// =============================================================================
// VIEWPORT
// =============================================================================

/// Viewport shared by every tree mounted in one host
#[derive(Clone, Debug, Default)]
pub struct SharedViewport(Arc<RwLock<Viewport>>);

impl SharedViewport {
    pub fn new(viewport: Viewport) -> Self {
        Self(Arc::new(RwLock::new(viewport)))
    }

    pub fn get(&self) -> Viewport {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, viewport: Viewport) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = viewport;
    }
}

impl MeasurementProvider for SharedViewport {
    fn viewport(&self) -> Viewport {
        self.get()
    }
}

fn to_px(value: f32, unit: Unit, viewport: Viewport) -> f32 {
    match unit {
        Unit::None | Unit::Px => value,
        Unit::Vw => value * viewport.vw(),
        Unit::Vh => value * viewport.vh(),
    }
}

fn from_px(px: f32, unit: Unit, viewport: Viewport) -> f32 {
    let per_unit = match unit {
        Unit::None | Unit::Px => 1.0,
        Unit::Vw => viewport.vw(),
        Unit::Vh => viewport.vh(),
    };
    if per_unit > 0.0 {
        px / per_unit
    } else {
        0.0
    }
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Clone, Debug)]
struct TreeStyle {
    font_size_vw: f32,
    font_family: String,
    before_text: String,
    after_text: String,
    heading_level: HeadingLevel,
}

struct TreeContext {
    viewport: SharedViewport,
    measurer: Arc<dyn TextMeasurer>,
    style: RwLock<TreeStyle>,
}

impl TreeContext {
    fn style(&self) -> TreeStyle {
        self.style
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn font_size_px(&self) -> f32 {
        let size_vw = self
            .style
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .font_size_vw;
        size_vw * self.viewport.get().vw()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Length {
    value: f32,
    unit: Unit,
}

impl Length {
    const ZERO: Length = Length {
        value: 0.0,
        unit: Unit::Px,
    };

    fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }
}

#[derive(Debug)]
struct NodeState {
    text: String,
    opacity: f32,
    width: Length,
    height: Length,
    translate_y: Length,
    laid_out: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            text: String::new(),
            opacity: 1.0,
            width: Length::ZERO,
            height: Length::ZERO,
            translate_y: Length::ZERO,
            laid_out: false,
        }
    }
}

/// One node of the heading tree
pub struct ElementNode {
    role: NodeRole,
    context: Arc<TreeContext>,
    state: Mutex<NodeState>,
}

impl ElementNode {
    fn new(role: NodeRole, context: Arc<TreeContext>) -> Arc<Self> {
        Arc::new(Self {
            role,
            context,
            state: Mutex::new(NodeState::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn opacity(&self) -> f32 {
        self.lock().opacity
    }

    /// Width converted to `unit`
    pub fn width(&self, unit: Unit) -> f32 {
        let width = self.lock().width;
        self.convert(width, unit)
    }

    /// Height converted to `unit`
    pub fn height(&self, unit: Unit) -> f32 {
        let height = self.lock().height;
        self.convert(height, unit)
    }

    /// Vertical offset converted to `unit`
    pub fn translate_y(&self, unit: Unit) -> f32 {
        let offset = self.lock().translate_y;
        self.convert(offset, unit)
    }

    pub fn is_laid_out(&self) -> bool {
        self.lock().laid_out
    }

    fn convert(&self, length: Length, unit: Unit) -> f32 {
        if length.unit == unit {
            return length.value;
        }
        let viewport = self.context.viewport.get();
        from_px(to_px(length.value, length.unit, viewport), unit, viewport)
    }

    fn reset(&self, text: &str) {
        let mut state = self.lock();
        *state = NodeState {
            text: text.to_string(),
            ..NodeState::default()
        };
    }

    fn set_laid_out(&self, laid_out: bool) -> bool {
        std::mem::replace(&mut self.lock().laid_out, laid_out) != laid_out
    }

    fn holds_text(&self) -> bool {
        matches!(
            self.role,
            NodeRole::Lead | NodeRole::CyclingText | NodeRole::Cursor
        )
    }
}

impl AnimationTarget for ElementNode {
    fn read(&self, property: Property, unit: Unit) -> Option<PropertyValue> {
        let state = self.lock();
        let length = match property {
            Property::Opacity => return Some(PropertyValue::number(state.opacity)),
            Property::Text => return Some(PropertyValue::text(state.text.as_str())),
            Property::Width => state.width,
            Property::Height => state.height,
            Property::TranslateY => state.translate_y,
        };
        drop(state);
        Some(PropertyValue::length(self.convert(length, unit), unit))
    }

    fn write(&self, property: Property, value: &PropertyValue) {
        let mut state = self.lock();
        match (property, value) {
            (Property::Opacity, PropertyValue::Number { value, .. }) => state.opacity = *value,
            (Property::Text, PropertyValue::Text(text)) => state.text.clone_from(text),
            (Property::Width, PropertyValue::Number { value, unit }) => {
                state.width = Length::new(*value, *unit)
            }
            (Property::Height, PropertyValue::Number { value, unit }) => {
                state.height = Length::new(*value, *unit)
            }
            (Property::TranslateY, PropertyValue::Number { value, unit }) => {
                state.translate_y = Length::new(*value, *unit)
            }
            (property, value) => {
                tracing::warn!("{}: cannot write {} to {:?}", self.role, value, property);
            }
        }
    }
}

impl HeadingNode for ElementNode {
    fn layout_size(&self) -> Option<PixelSize> {
        let (laid_out, text, width, height) = {
            let state = self.lock();
            (state.laid_out, state.text.clone(), state.width, state.height)
        };
        if !laid_out {
            return None;
        }
        let viewport = self.context.viewport.get();
        let font_px = self.context.font_size_px();
        if self.holds_text() {
            let options = TextLayoutOptions::new()
                .with_line_height(LINE_HEIGHT)
                .with_font_name(self.context.style().font_family);
            let metrics = self
                .context
                .measurer
                .measure_with_options(&text, font_px, &options);
            return Some(PixelSize::new(metrics.width, metrics.height));
        }
        match self.role {
            NodeRole::RevealBox => Some(PixelSize::new(
                to_px(width.value, width.unit, viewport),
                to_px(height.value, height.unit, viewport),
            )),
            _ => Some(PixelSize::new(viewport.width, font_px * LINE_HEIGHT)),
        }
    }
}

impl fmt::Debug for ElementNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementNode")
            .field("role", &self.role)
            .field("state", &*self.lock())
            .finish()
    }
}

// =============================================================================
// TREE
// =============================================================================

/// Visible state of a heading at one instant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeadingSnapshot {
    pub tag: &'static str,
    pub before: String,
    pub lead: String,
    pub cycling: String,
    pub after: String,
    pub cursor: String,
    pub cursor_opacity: f32,
    pub lead_offset_vw: f32,
    pub box_width_vw: f32,
    pub box_height_vh: f32,
}

impl fmt::Display for HeadingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = [&self.before, &self.lead, &self.cycling, &self.after]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        f.write_str(&words.join(" "))?;
        if self.cursor_opacity >= 0.5 {
            f.write_str(&self.cursor)?;
        } else {
            write!(f, "{:width$}", "", width = self.cursor.chars().count())?;
        }
        Ok(())
    }
}

/// The five nodes of one heading
#[derive(Clone)]
pub struct HeadingTree {
    context: Arc<TreeContext>,
    lead: Arc<ElementNode>,
    reveal_box: Arc<ElementNode>,
    cycling_text: Arc<ElementNode>,
    cursor: Arc<ElementNode>,
    heading: Arc<ElementNode>,
}

impl HeadingTree {
    pub fn new(viewport: SharedViewport, measurer: Arc<dyn TextMeasurer>) -> Self {
        let defaults = Configuration::default();
        let style = defaults.style();
        let context = Arc::new(TreeContext {
            viewport,
            measurer,
            style: RwLock::new(TreeStyle {
                font_size_vw: style.font_size_vw,
                font_family: style.font_family.clone(),
                before_text: String::new(),
                after_text: String::new(),
                heading_level: style.heading_level,
            }),
        });
        Self {
            lead: ElementNode::new(NodeRole::Lead, context.clone()),
            reveal_box: ElementNode::new(NodeRole::RevealBox, context.clone()),
            cycling_text: ElementNode::new(NodeRole::CyclingText, context.clone()),
            cursor: ElementNode::new(NodeRole::Cursor, context.clone()),
            heading: ElementNode::new(NodeRole::Heading, context.clone()),
            context,
        }
    }

    pub fn node(&self, role: NodeRole) -> &Arc<ElementNode> {
        match role {
            NodeRole::Lead => &self.lead,
            NodeRole::RevealBox => &self.reveal_box,
            NodeRole::CyclingText => &self.cycling_text,
            NodeRole::Cursor => &self.cursor,
            NodeRole::Heading => &self.heading,
        }
    }

    /// Role handles for the orchestrator
    pub fn heading_nodes(&self) -> HeadingNodes {
        HeadingNodes::new(
            self.lead.clone(),
            self.reveal_box.clone(),
            self.cycling_text.clone(),
            self.cursor.clone(),
            self.heading.clone(),
        )
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.context.viewport
    }

    /// Reset the structure for `config`
    ///
    /// The box collapses to zero width and its resting height, the lead
    /// text sits at rest, the cycling text is cleared and the cursor is
    /// fully visible. Layout is invalid until [`HeadingTree::commit_layout`].
    pub fn rebuild(&self, config: &Configuration) {
        let style = config.style();
        *self
            .context
            .style
            .write()
            .unwrap_or_else(PoisonError::into_inner) = TreeStyle {
            font_size_vw: style.font_size_vw,
            font_family: style.font_family.clone(),
            before_text: style.before_text.clone(),
            after_text: style.after_text.clone(),
            heading_level: style.heading_level,
        };

        self.lead.reset(config.lead_text());
        self.reveal_box.reset("");
        self.reveal_box.write(
            Property::Height,
            &PropertyValue::length(BOX_REST_HEIGHT_VW, Unit::Vw),
        );
        self.cycling_text.reset("");
        self.cursor.reset(config.cursor_symbol());
        self.heading.reset("");
    }

    /// Commit layout for every node; returns true if anything was invalid
    pub fn commit_layout(&self) -> bool {
        self.nodes()
            .fold(false, |changed, node| node.set_laid_out(true) || changed)
    }

    /// Drop layout, as when the tree leaves the document
    pub fn detach(&self) {
        for node in self.nodes() {
            node.set_laid_out(false);
        }
    }

    pub fn is_laid_out(&self) -> bool {
        self.nodes().all(|node| node.is_laid_out())
    }

    fn nodes(&self) -> impl Iterator<Item = &Arc<ElementNode>> {
        NodeRole::ALL.into_iter().map(move |role| self.node(role))
    }

    pub fn snapshot(&self) -> HeadingSnapshot {
        let style = self.context.style();
        HeadingSnapshot {
            tag: style.heading_level.tag(),
            before: style.before_text,
            lead: self.lead.text(),
            cycling: self.cycling_text.text(),
            after: style.after_text,
            cursor: self.cursor.text(),
            cursor_opacity: self.cursor.opacity(),
            lead_offset_vw: self.lead.translate_y(Unit::Vw),
            box_width_vw: self.reveal_box.width(Unit::Vw),
            box_height_vh: self.reveal_box.height(Unit::Vh),
        }
    }
}

impl fmt::Debug for HeadingTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadingTree")
            .field("laid_out", &self.is_laid_out())
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_measure::EstimatedTextMeasurer;
    use headline_core::{AttributeName, Attributes};

    fn tree() -> HeadingTree {
        HeadingTree::new(
            SharedViewport::new(Viewport::new(1000.0, 500.0)),
            Arc::new(EstimatedTextMeasurer::default()),
        )
    }

    #[test]
    fn test_rebuild_resets_structure() {
        let tree = tree();
        tree.reveal_box
            .write(Property::Width, &PropertyValue::length(30.0, Unit::Vw));
        tree.cycling_text
            .write(Property::Text, &PropertyValue::text("Cod"));
        tree.cursor.write(Property::Opacity, &PropertyValue::number(0.2));
        tree.commit_layout();

        tree.rebuild(&Configuration::default());
        assert_eq!(tree.reveal_box.width(Unit::Px), 0.0);
        assert_eq!(tree.reveal_box.height(Unit::Vw), 1.0);
        assert_eq!(tree.cycling_text.text(), "");
        assert_eq!(tree.cursor.opacity(), 1.0);
        assert_eq!(tree.cursor.text(), "_");
        assert_eq!(tree.lead.text(), "Hello, I’m");
        assert!(!tree.is_laid_out());
    }

    #[test]
    fn test_layout_requires_commit() {
        let tree = tree();
        tree.rebuild(&Configuration::default());
        assert_eq!(tree.lead.layout_size(), None);

        assert!(tree.commit_layout());
        assert!(!tree.commit_layout());
        // 5.4vw of 1000px, 10 glyphs
        let size = tree.lead.layout_size().unwrap();
        assert!((size.width - 324.0).abs() < 1e-3);
        assert!((size.height - 64.8).abs() < 1e-3);

        tree.detach();
        assert_eq!(tree.lead.layout_size(), None);
    }

    #[test]
    fn test_text_mutation_is_measured_immediately() {
        let tree = tree();
        tree.rebuild(&Configuration::default());
        tree.commit_layout();
        assert_eq!(tree.cycling_text.layout_size().unwrap().width, 0.0);

        tree.cycling_text
            .write(Property::Text, &PropertyValue::text("Coder."));
        assert!(tree.cycling_text.layout_size().unwrap().width > 0.0);
    }

    #[test]
    fn test_lengths_follow_viewport() {
        let tree = tree();
        tree.reveal_box
            .write(Property::Width, &PropertyValue::length(10.0, Unit::Vw));
        assert_eq!(tree.reveal_box.width(Unit::Px), 100.0);

        tree.viewport().set(Viewport::new(2000.0, 500.0));
        assert_eq!(tree.reveal_box.width(Unit::Px), 200.0);
        assert_eq!(
            tree.reveal_box.read(Property::Width, Unit::Vw),
            Some(PropertyValue::length(10.0, Unit::Vw))
        );
    }

    #[test]
    fn test_snapshot_display() {
        let tree = tree();
        let attrs = Attributes::new()
            .with(AttributeName::StaticText, "Hi")
            .with(AttributeName::AfterText, "!")
            .with(AttributeName::HeadingTag, "h2");
        tree.rebuild(&Configuration::from_attributes(&attrs));
        tree.cycling_text
            .write(Property::Text, &PropertyValue::text("Cod"));

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.tag, "h2");
        assert_eq!(snapshot.to_string(), "Hi Cod !_");

        tree.cursor.write(Property::Opacity, &PropertyValue::number(0.0));
        assert_eq!(tree.snapshot().to_string(), "Hi Cod ! ");
    }

    #[test]
    fn test_mismatched_write_is_ignored() {
        let tree = tree();
        tree.lead.write(Property::Opacity, &PropertyValue::text("x"));
        assert_eq!(tree.lead.opacity(), 1.0);
    }
}
