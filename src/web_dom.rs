//! [`Dom`] over the live browser document.
//!
//! Elements the controller works with are interned in a slot arena: each gets
//! a `data-stage-node` attribute holding its slot, so mapping an event target
//! back to a [`NodeId`] is a single attribute read. Detaching an element frees
//! its slot and the slots of everything inside it.
//!
//! Event targets the controller has never seen are not interned. They share
//! one scratch handle that only lives until the next lookup.

use std::cell::RefCell;

use idolstage_core::{Dom, NodeId, StageError, StageResult};
use tracing::{trace, warn};
use wasm_bindgen::{JsCast, UnwrapThrowExt};
use web_sys::{
    Document, Element, EventTarget, HtmlElement, NodeList, ScrollBehavior, ScrollToOptions, Window,
};

use crate::slots::SlotArena;

const NODE_ATTR: &str = "data-stage-node";
const NODE_SELECTOR: &str = "[data-stage-node]";

/// Handle for the most recent uninterned event target
const SCRATCH: NodeId = NodeId(usize::MAX);

#[derive(Default)]
struct Slots {
    arena: SlotArena<Element>,
    scratch: Option<Element>,
}

impl Slots {
    fn get(&self, node: NodeId) -> Option<&Element> {
        if node == SCRATCH {
            return self.scratch.as_ref();
        }
        self.arena.get(node.0)
    }

    /// Slot already holding `element`, if any.
    fn find(&self, element: &Element) -> Option<NodeId> {
        let id = element.get_attribute(NODE_ATTR)?.parse::<usize>().ok()?;
        let known = self.arena.get(id)?;
        known.is_same_node(Some(&**element)).then_some(NodeId(id))
    }

    fn insert(&mut self, element: &Element) -> NodeId {
        let id = self.arena.insert(element.clone());
        let _ = element.set_attribute(NODE_ATTR, &id.to_string());
        NodeId(id)
    }

    fn release(&mut self, element: &Element) {
        if let Some(NodeId(id)) = self.find(element) {
            self.arena.remove(id);
            let _ = element.remove_attribute(NODE_ATTR);
        }
    }
}

pub struct WebDom {
    window: Window,
    document: Document,
    slots: RefCell<Slots>,
    body: NodeId,
    head: NodeId,
}

impl WebDom {
    /// Attach to the global window's document.
    pub fn from_window() -> StageResult<Self> {
        let window = web_sys::window().ok_or(StageError::DocumentUnavailable("window"))?;
        let document = window
            .document()
            .ok_or(StageError::DocumentUnavailable("document"))?;
        let body: Element = document
            .body()
            .ok_or(StageError::DocumentUnavailable("body"))?
            .into();
        let head: Element = document
            .head()
            .ok_or(StageError::DocumentUnavailable("head"))?
            .into();

        let mut dom = Self {
            window,
            document,
            slots: RefCell::new(Slots::default()),
            body: NodeId(0),
            head: NodeId(0),
        };
        dom.body = dom.intern(&body);
        dom.head = dom.intern(&head);
        Ok(dom)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Handle for `element`, assigning a slot if it has none yet.
    pub fn intern(&self, element: &Element) -> NodeId {
        let mut slots = self.slots.borrow_mut();
        match slots.find(element) {
            Some(id) => id,
            None => slots.insert(element),
        }
    }

    /// Map an event target to a handle without interning it.
    ///
    /// The scratch handle returned for unknown elements is distinct from every
    /// interned handle and is replaced by the next lookup.
    pub fn lookup(&self, target: &EventTarget) -> Option<NodeId> {
        let element = target.dyn_ref::<Element>()?;
        let mut slots = self.slots.borrow_mut();
        if let Some(id) = slots.find(element) {
            return Some(id);
        }
        slots.scratch = Some(element.clone());
        Some(SCRATCH)
    }

    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.slots.borrow().get(node).cloned()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn collect(&self, list: Result<NodeList, wasm_bindgen::JsValue>, selector: &str) -> Vec<NodeId> {
        let list = match list {
            Ok(list) => list,
            Err(e) => {
                warn!(selector, error = ?e, "Ignoring query");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| self.intern(&el))
            .collect()
    }

    /// Free the slots of `root` and every interned element below it.
    fn release_subtree(&self, root: &Element) {
        let mut slots = self.slots.borrow_mut();
        if let Ok(list) = root.query_selector_all(NODE_SELECTOR) {
            for node in (0..list.length()).filter_map(|i| list.get(i)) {
                if let Ok(element) = node.dyn_into::<Element>() {
                    slots.release(&element);
                }
            }
        }
        slots.release(root);
        if slots
            .scratch
            .as_ref()
            .is_some_and(|scratch| root.contains(Some(&**scratch)))
        {
            slots.scratch = None;
        }
        trace!(live = slots.arena.len(), "Released detached subtree");
    }
}

impl Dom for WebDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn head(&self) -> NodeId {
        self.head
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.collect(self.document.query_selector_all(selector), selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        match self.element(root) {
            Some(root) => self.collect(root.query_selector_all(selector), selector),
            None => Vec::new(),
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document
            .get_element_by_id(id)
            .map(|el| self.intern(&el))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => ancestor.contains(Some(&*node)),
            _ => false,
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.is_connected())
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        // Tags come from the controller itself, never from page content.
        let element = self
            .document
            .create_element(tag)
            .expect_throw("controller tag names are valid");
        self.intern(&element)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) else {
            return;
        };
        if let Err(e) = parent.append_child(&child) {
            warn!(error = ?e, "append_child rejected");
        }
    }

    fn detach(&mut self, node: NodeId) {
        if node == self.body || node == self.head {
            return;
        }
        if let Some(el) = self.element(node) {
            el.remove();
            self.release_subtree(&el);
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.html(node)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.html(node) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(el) = self.html(node) {
            let _ = el.style().remove_property(property);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element(node) {
            el.set_text_content(Some(text));
        }
    }

    fn set_markup(&mut self, node: NodeId, markup: &str) {
        if let Some(el) = self.element(node) {
            el.set_inner_html(markup);
        }
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.html(node).map_or(0.0, |el| f64::from(el.offset_top()))
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_to(&mut self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}
