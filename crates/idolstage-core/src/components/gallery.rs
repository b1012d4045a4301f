//! Gallery category filter.
//!
//! Showing an item flips `display` first and animates on the next tick;
//! hiding animates first and flips `display` once the transition is over.
//! Either way the CSS transition is never asked to animate a
//! `display: none` element.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FILTER_ALL;
use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;
use crate::timer::TimerId;
use crate::transition::Deferred;

/// One media tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub node: NodeId,
    pub category: String,
    pub visible: bool,
}

impl GalleryItem {
    pub fn matches(&self, filter: &str) -> bool {
        filter == FILTER_ALL || self.category == filter
    }
}

#[derive(Debug, Default)]
pub struct GalleryFilter {
    active_filter: String,
    buttons: Vec<NodeId>,
    items: Vec<GalleryItem>,
    /// Outstanding show/hide continuation per item
    pending: HashMap<NodeId, TimerId>,
}

impl GalleryFilter {
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        self.buttons = cx.dom.query_all(".filter-btn");
        self.items = cx
            .dom
            .query_all(".gallery-item")
            .into_iter()
            .map(|node| GalleryItem {
                node,
                category: cx.dom.attribute(node, "data-category").unwrap_or_default(),
                visible: true,
            })
            .collect();

        for button in &self.buttons {
            cx.listeners
                .subscribe(SignalKind::Click, Target::Node(*button), Handler::FilterButton);
        }

        if self.items.is_empty() && self.buttons.is_empty() {
            return;
        }

        let default_filter = cx.config.default_filter.clone();
        self.mark_active(cx, &default_filter);
        self.arrange(cx, &default_filter);
    }

    /// Settle `display` for `filter` without animating.
    ///
    /// Items keep whatever opacity and transform they have, so the section
    /// reveal still animates them in from their hidden pose.
    fn arrange<D: Dom>(&mut self, cx: &mut StageContext<D>, filter: &str) {
        self.active_filter = filter.to_string();
        for item in &mut self.items {
            item.visible = item.matches(filter);
            let display = if item.visible { "block" } else { "none" };
            cx.dom.set_style(item.node, "display", display);
        }
        debug!(filter, visible = self.visible_nodes().len(), "Gallery arranged");
    }

    /// Handle a click on a filter button.
    pub fn on_button<D: Dom>(&mut self, cx: &mut StageContext<D>, button: NodeId) {
        let Some(filter) = cx.dom.attribute(button, "data-filter") else {
            warn!(%button, "Filter button without data-filter");
            return;
        };
        for other in &self.buttons {
            cx.dom.remove_class(*other, "active");
        }
        cx.dom.add_class(button, "active");
        self.apply_filter(cx, &filter);
    }

    /// Show items in `filter` (or everything for `"all"`), hide the rest.
    pub fn apply_filter<D: Dom>(&mut self, cx: &mut StageContext<D>, filter: &str) {
        self.active_filter = filter.to_string();
        let tick = cx.config.tick();
        let transition = cx.config.transition();

        for item in &mut self.items {
            if let Some(previous) = self.pending.remove(&item.node) {
                cx.timers.cancel(previous);
            }

            let timer = if item.matches(filter) {
                cx.dom.set_style(item.node, "display", "block");
                item.visible = true;
                cx.after(
                    tick,
                    Deferred::style(item.node, &[("opacity", "1"), ("transform", "scale(1)")]),
                )
            } else {
                cx.dom
                    .set_styles(item.node, &[("opacity", "0"), ("transform", "scale(0.8)")]);
                item.visible = false;
                cx.after(transition, Deferred::style(item.node, &[("display", "none")]))
            };
            self.pending.insert(item.node, timer);
        }

        debug!(filter, visible = self.visible_nodes().len(), "Gallery filter applied");
    }

    fn mark_active<D: Dom>(&self, cx: &mut StageContext<D>, filter: &str) {
        for button in &self.buttons {
            if cx.dom.attribute(*button, "data-filter").as_deref() == Some(filter) {
                cx.dom.add_class(*button, "active");
            } else {
                cx.dom.remove_class(*button, "active");
            }
        }
    }

    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn buttons(&self) -> &[NodeId] {
        &self.buttons
    }

    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.items
            .iter()
            .filter(|i| i.visible)
            .map(|i| i.node)
            .collect()
    }

    /// Items the current filter has hidden or is hiding.
    pub fn hidden_nodes(&self) -> Vec<NodeId> {
        self.items
            .iter()
            .filter(|i| !i.visible)
            .map(|i| i.node)
            .collect()
    }
}
