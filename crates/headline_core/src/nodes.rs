//! Node roles the orchestrator animates
//!
//! The host owns the widget's structure. The orchestrator only sees the
//! five roles below through [`HeadingNodes`], injected at construction.

use std::fmt;
use std::sync::Arc;

use headline_animation::{AnimationTarget, Property, PropertyValue, TargetRef, Unit};

use crate::geometry::PixelSize;

/// Logical role of a node inside the heading
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Static lead-in text, measured to size the reveal box
    Lead,
    /// Ink box revealed behind the lead text
    RevealBox,
    /// Text node that types the cycling words
    CyclingText,
    /// Blinking cursor
    Cursor,
    /// Heading root
    Heading,
}

impl NodeRole {
    pub const ALL: [NodeRole; 5] = [
        NodeRole::Lead,
        NodeRole::RevealBox,
        NodeRole::CyclingText,
        NodeRole::Cursor,
        NodeRole::Heading,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Lead => "lead",
            NodeRole::RevealBox => "reveal-box",
            NodeRole::CyclingText => "cycling-text",
            NodeRole::Cursor => "cursor",
            NodeRole::Heading => "heading",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host node that can be animated and measured
pub trait HeadingNode: AnimationTarget {
    /// Committed layout box, or `None` if the node has no rendered box
    fn layout_size(&self) -> Option<PixelSize>;
}

/// Shared reference to a heading node
pub type NodeRef = Arc<dyn HeadingNode>;

/// Stable handles to the five node roles
#[derive(Clone)]
pub struct HeadingNodes {
    lead: NodeRef,
    reveal_box: NodeRef,
    cycling_text: NodeRef,
    cursor: NodeRef,
    heading: NodeRef,
}

impl HeadingNodes {
    pub fn new(
        lead: NodeRef,
        reveal_box: NodeRef,
        cycling_text: NodeRef,
        cursor: NodeRef,
        heading: NodeRef,
    ) -> Self {
        Self {
            lead,
            reveal_box,
            cycling_text,
            cursor,
            heading,
        }
    }

    pub fn get(&self, role: NodeRole) -> &NodeRef {
        match role {
            NodeRole::Lead => &self.lead,
            NodeRole::RevealBox => &self.reveal_box,
            NodeRole::CyclingText => &self.cycling_text,
            NodeRole::Cursor => &self.cursor,
            NodeRole::Heading => &self.heading,
        }
    }

    /// The node as a tween target
    pub fn target(&self, role: NodeRole) -> TargetRef {
        Arc::new(NodeTarget(Arc::clone(self.get(role))))
    }
}

/// Forwards tween reads and writes to a heading node
struct NodeTarget(NodeRef);

impl AnimationTarget for NodeTarget {
    fn read(&self, property: Property, unit: Unit) -> Option<PropertyValue> {
        self.0.read(property, unit)
    }

    fn write(&self, property: Property, value: &PropertyValue) {
        self.0.write(property, value)
    }
}

impl fmt::Debug for HeadingNodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadingNodes").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory nodes for unit tests

    use std::sync::Mutex;

    use rustc_hash::FxHashMap;

    use super::*;

    #[derive(Default)]
    pub struct MockNode {
        values: Mutex<FxHashMap<Property, PropertyValue>>,
        size: Mutex<Option<PixelSize>>,
    }

    impl MockNode {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn set_size(&self, size: Option<PixelSize>) {
            *self.size.lock().unwrap() = size;
        }

        pub fn value(&self, property: Property) -> Option<PropertyValue> {
            self.values.lock().unwrap().get(&property).cloned()
        }

        pub fn text(&self) -> String {
            self.value(Property::Text)
                .and_then(|v| v.as_text().map(str::to_string))
                .unwrap_or_default()
        }
    }

    impl AnimationTarget for MockNode {
        fn read(&self, property: Property, unit: Unit) -> Option<PropertyValue> {
            match self.value(property) {
                Some(PropertyValue::Number { value, .. }) => {
                    Some(PropertyValue::length(value, unit))
                }
                other => other,
            }
        }

        fn write(&self, property: Property, value: &PropertyValue) {
            self.values.lock().unwrap().insert(property, value.clone());
        }
    }

    impl HeadingNode for MockNode {
        fn layout_size(&self) -> Option<PixelSize> {
            *self.size.lock().unwrap()
        }
    }

    pub struct MockNodes {
        pub lead: Arc<MockNode>,
        pub reveal_box: Arc<MockNode>,
        pub cycling_text: Arc<MockNode>,
        pub cursor: Arc<MockNode>,
        pub heading: Arc<MockNode>,
    }

    impl MockNodes {
        pub fn new() -> Self {
            Self {
                lead: MockNode::new(),
                reveal_box: MockNode::new(),
                cycling_text: MockNode::new(),
                cursor: MockNode::new(),
                heading: MockNode::new(),
            }
        }

        pub fn nodes(&self) -> HeadingNodes {
            HeadingNodes::new(
                self.lead.clone(),
                self.reveal_box.clone(),
                self.cycling_text.clone(),
                self.cursor.clone(),
                self.heading.clone(),
            )
        }
    }
}
