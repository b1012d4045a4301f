//! Timed transitions.
//!
//! CSS transitions need the element to stay in the document until they
//! finish. Every "fade then remove/hide" in the controller goes through the
//! deferred actions defined here.

use std::time::Duration;

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::timer::TimerId;

/// Continuation stored in the timer queue
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Apply inline styles in order
    Style {
        node: NodeId,
        styles: Vec<(&'static str, String)>,
    },
    /// Add a class (loader `hidden`)
    AddClass { node: NodeId, class: &'static str },
    /// Detach the node if it is still attached
    Detach(NodeId),
    /// Mark a freshly attached lightbox overlay active
    ActivateLightbox(NodeId),
}

impl Deferred {
    /// Convenience constructor for [`Deferred::Style`].
    pub fn style(node: NodeId, styles: &[(&'static str, &str)]) -> Self {
        Deferred::Style {
            node,
            styles: styles.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        }
    }
}

/// Remove `active_class` now and detach `node` once `transition` has elapsed.
///
/// Safe to call on a node that is already detached: the class removal is
/// harmless and the deferred detach becomes a no-op.
pub fn schedule_removal<D: Dom>(
    cx: &mut StageContext<D>,
    node: NodeId,
    active_class: &str,
    transition: Duration,
) -> TimerId {
    cx.dom.remove_class(node, active_class);
    cx.after(transition, Deferred::Detach(node))
}

/// Detach `node` unless something already removed it.
pub fn detach_if_attached<D: Dom>(dom: &mut D, node: NodeId) -> bool {
    if !dom.is_attached(node) {
        return false;
    }
    dom.detach(node);
    true
}

/// Apply a non-lightbox deferred action directly to the document.
///
/// Returns the node that was detached, if any, so owners can update state.
pub fn apply<D: Dom>(dom: &mut D, action: &Deferred) -> Option<NodeId> {
    match action {
        Deferred::Style { node, styles } => {
            for (property, value) in styles {
                dom.set_style(*node, property, value);
            }
            None
        }
        Deferred::AddClass { node, class } => {
            dom.add_class(*node, class);
            None
        }
        Deferred::Detach(node) => detach_if_attached(dom, *node).then_some(*node),
        Deferred::ActivateLightbox(_) => None,
    }
}
