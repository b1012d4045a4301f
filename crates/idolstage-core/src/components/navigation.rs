//! Smooth scrolling for in-page anchors.

use tracing::debug;

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;

pub const HASH_ANCHORS: &str = r##"a[href^="#"]"##;

#[derive(Debug, Default)]
pub struct SmoothScroll {
    anchors: Vec<NodeId>,
}

impl SmoothScroll {
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        self.anchors = cx.dom.query_all(HASH_ANCHORS);
        for anchor in &self.anchors {
            cx.listeners
                .subscribe(SignalKind::Click, Target::Node(*anchor), Handler::SmoothScroll);
        }
    }

    /// Scroll to the anchor's target section.
    ///
    /// Returns the requested scroll top, or `None` when the href names no
    /// element (`#` alone, unknown id).
    pub fn on_click<D: Dom>(&self, cx: &mut StageContext<D>, anchor: NodeId) -> Option<f64> {
        let href = cx.dom.attribute(anchor, "href")?;
        let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
        let Some(target) = cx.dom.element_by_id(id) else {
            debug!(href = %href, "Anchor target not found");
            return None;
        };

        let top = cx.dom.offset_top(target) - cx.config.nav_offset;
        cx.dom.scroll_to(top);
        debug!(href = %href, top, "Smooth scroll");
        Some(top)
    }

    pub fn anchors(&self) -> &[NodeId] {
        &self.anchors
    }
}
