//! In-memory document used by tests and the headless simulator.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::warn;

use super::selector::Selector;
use super::{Dom, NodeId};
use crate::error::{StageError, StageResult};

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: Option<String>,
    markup: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    offset_top: f64,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: None,
            markup: None,
            children: Vec::new(),
            parent: None,
            offset_top: 0.0,
        }
    }
}

/// Serializable view of an element subtree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

/// Arena-backed document tree.
///
/// Node ids are indices into the arena and stay valid after detachment, so
/// a detached overlay can still be inspected by tests.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    viewport_width: f64,
    scroll_requests: Vec<f64>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new(1280.0)
    }
}

impl MemoryDom {
    /// Empty `<html><head/><body/></html>` document.
    pub fn new(viewport_width: f64) -> Self {
        let mut dom = Self {
            nodes: vec![Node::new("html")],
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            viewport_width,
            scroll_requests: Vec::new(),
        };
        let head = dom.create_element("head");
        let body = dom.create_element("body");
        dom.append_child(dom.root, head);
        dom.append_child(dom.root, body);
        dom.head = head;
        dom.body = body;
        dom
    }

    /// Start building a new element.
    pub fn element(&mut self, tag: &str) -> ElementBuilder<'_> {
        let id = self.create_element(tag);
        ElementBuilder { dom: self, id }
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|n| n.tag.as_str())
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.get(node).map(|n| n.classes.clone()).unwrap_or_default()
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(|n| n.text.as_deref())
    }

    pub fn markup(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(|n| n.markup.as_deref())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    pub fn set_offset_top(&mut self, node: NodeId, top: f64) {
        if let Some(n) = self.get_mut(node) {
            n.offset_top = top;
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Every `scroll_to` request received, oldest first.
    pub fn scroll_requests(&self) -> &[f64] {
        &self.scroll_requests
    }

    /// Snapshot of the subtree rooted at `node`.
    pub fn snapshot(&self, node: NodeId) -> StageResult<NodeSnapshot> {
        let n = self.get(node).ok_or(StageError::UnknownNode(node))?;
        let children = n
            .children
            .iter()
            .map(|c| self.snapshot(*c))
            .collect::<StageResult<Vec<_>>>()?;
        Ok(NodeSnapshot {
            id: node,
            tag: n.tag.clone(),
            classes: n.classes.clone(),
            attributes: n.attributes.clone(),
            styles: n.styles.clone(),
            text: n.text.clone(),
            children,
        })
    }

    /// Indented one-line-per-element rendering of the body.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_into(self.body, 0, &mut out);
        out
    }

    fn outline_into(&self, node: NodeId, depth: usize, out: &mut String) {
        let Some(n) = self.get(node) else { return };

        let _ = write!(out, "{}{}", "  ".repeat(depth), n.tag);
        if let Some(id) = n.attributes.get("id") {
            let _ = write!(out, "#{}", id);
        }
        for class in &n.classes {
            let _ = write!(out, ".{}", class);
        }
        let attrs: Vec<String> = n
            .attributes
            .iter()
            .filter(|(k, _)| k.as_str() != "id")
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect();
        if !attrs.is_empty() {
            let _ = write!(out, " [{}]", attrs.join(" "));
        }
        if !n.styles.is_empty() {
            let styles: Vec<String> = n
                .styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = write!(out, " {{{}}}", styles.join("; "));
        }
        if let Some(text) = &n.text {
            let _ = write!(out, " \"{}\"", text);
        }
        out.push('\n');

        for child in &n.children {
            self.outline_into(*child, depth + 1, out);
        }
    }

    fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node.0)
    }

    /// Pre-order descendants of `root`, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(n) = self.get(node) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn select(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%e, "Ignoring query");
                return Vec::new();
            }
        };
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.get(*id).is_some_and(|n| {
                    parsed.matches(
                        &n.tag,
                        |c| n.classes.iter().any(|have| have == c),
                        |name| n.attributes.get(name).map(String::as_str),
                    )
                })
            })
            .collect()
    }
}

impl Dom for MemoryDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn head(&self) -> NodeId {
        self.head
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(self.root, selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.select(root, selector)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|node| {
            self.get(*node)
                .and_then(|n| n.attributes.get("id"))
                .is_some_and(|v| v == id)
        })
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            warn!(%parent, %child, "append_child on unknown node");
            return;
        }
        if self.contains(child, parent) {
            warn!(%parent, %child, "append_child would create a cycle");
            return;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = None;
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.get_mut(node) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node).and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.get_mut(node) {
            if name == "class" {
                n.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                n.attributes.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.get(node).and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.get_mut(node) {
            n.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(n) = self.get_mut(node) {
            n.styles.remove(property);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.get_mut(node) {
            n.text = Some(text.to_string());
        }
    }

    fn set_markup(&mut self, node: NodeId, markup: &str) {
        if let Some(n) = self.get_mut(node) {
            n.markup = Some(markup.to_string());
        }
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.get(node).map(|n| n.offset_top).unwrap_or(0.0)
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_requests.push(top);
    }
}

/// Fluent element construction for fixtures.
///
/// ```ignore
/// let card = dom.element("div").class("member-card").append_to(grid);
/// ```
pub struct ElementBuilder<'a> {
    dom: &'a mut MemoryDom,
    id: NodeId,
}

impl ElementBuilder<'_> {
    pub fn id(self, id: &str) -> Self {
        self.dom.set_attribute(self.id, "id", id);
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.dom.add_class(self.id, class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.dom.set_attribute(self.id, name, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.dom.set_text(self.id, text);
        self
    }

    pub fn offset_top(self, top: f64) -> Self {
        self.dom.set_offset_top(self.id, top);
        self
    }

    /// Attach under `parent` and return the new node.
    pub fn append_to(self, parent: NodeId) -> NodeId {
        self.dom.append_child(parent, self.id);
        self.id
    }

    /// Leave the element detached and return it.
    pub fn finish(self) -> NodeId {
        self.id
    }
}
