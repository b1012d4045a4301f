//! Document abstraction consumed by the controller.
//!
//! Components never touch a browser directly. They address elements through
//! [`NodeId`] handles handed out by a [`Dom`] implementation: the in-memory
//! [`MemoryDom`] for tests and the simulator, or the `web-sys` backed
//! document in the front-end crate.

mod memory;
mod selector;

pub use memory::{ElementBuilder, MemoryDom, NodeSnapshot};
pub use selector::{AttrMatch, Compound, Selector};

use serde::{Deserialize, Serialize};

/// Handle to an element owned by a [`Dom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The slice of the DOM the controller needs.
///
/// Query results are in document order. Mutations on detached nodes are
/// accepted and simply have no visible effect.
pub trait Dom {
    /// The `<body>` element
    fn body(&self) -> NodeId;

    /// The `<head>` element
    fn head(&self) -> NodeId;

    /// All attached elements matching `selector`.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Descendants of `root` (excluding `root`) matching `selector`.
    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// Element carrying the given `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// `true` when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// `true` while `node` is reachable from the document root.
    fn is_attached(&self, node: NodeId) -> bool;

    fn create_element(&mut self, tag: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Remove `node` from its parent. Detached nodes are left alone.
    fn detach(&mut self, node: NodeId);

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Inline style property, if set.
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    fn remove_style(&mut self, node: NodeId, property: &str);

    fn set_text(&mut self, node: NodeId, text: &str);

    /// Replace the node's content with opaque decorative markup (SVG shapes).
    fn set_markup(&mut self, node: NodeId, markup: &str);

    /// Distance from the top of the document, in CSS pixels.
    fn offset_top(&self, node: NodeId) -> f64;

    /// Layout viewport width, in CSS pixels.
    fn viewport_width(&self) -> f64;

    /// Smoothly scroll the window so its top edge sits at `top`.
    fn scroll_to(&mut self, top: f64);

    /// First attached element matching `selector`.
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// First descendant of `root` matching `selector`.
    fn query_one_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.query_within(root, selector).into_iter().next()
    }

    /// Apply several inline styles in order.
    fn set_styles(&mut self, node: NodeId, styles: &[(&str, &str)]) {
        for (property, value) in styles {
            self.set_style(node, property, value);
        }
    }
}
