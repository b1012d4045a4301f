//! Visibility observer: fade-in sections with staggered card reveals.

use std::collections::BTreeSet;

use tracing::debug;

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;
use crate::transition::Deferred;

const HIDDEN_OFFSET: &str = "translateY(20px)";
const REVEALED_OFFSET: &str = "translateY(0)";

#[derive(Debug, Default)]
pub struct VisibilityObserver {
    sections: Vec<NodeId>,
    revealed: BTreeSet<NodeId>,
}

impl VisibilityObserver {
    /// Watch every `.fade-section` and park cards in their hidden pose.
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        for section in cx.dom.query_all(".fade-section") {
            cx.listeners.subscribe(
                SignalKind::Intersection,
                Target::Node(section),
                Handler::RevealSection,
            );
            self.sections.push(section);
        }

        for card in cx.dom.query_all(".member-card, .gallery-item") {
            cx.dom.set_styles(
                card,
                &[
                    ("opacity", "0"),
                    ("transform", HIDDEN_OFFSET),
                    ("transition", "all 0.5s ease"),
                ],
            );
        }
    }

    /// Handle an intersection change. Returns `true` on the first reveal.
    ///
    /// Gallery items listed in `filtered_out` keep their hidden pose; the
    /// rest are staggered in document order.
    pub fn on_intersection<D: Dom>(
        &mut self,
        cx: &mut StageContext<D>,
        section: NodeId,
        intersecting: bool,
        filtered_out: &[NodeId],
    ) -> bool {
        if !intersecting || !self.revealed.insert(section) {
            return false;
        }

        cx.dom.add_class(section, "visible");

        if cx.dom.query_one_within(section, ".members-grid").is_some() {
            let cards = cx.dom.query_within(section, ".member-card");
            stagger(cx, &cards);
        }
        if cx.dom.query_one_within(section, ".gallery").is_some() {
            let items: Vec<NodeId> = cx
                .dom
                .query_within(section, ".gallery-item")
                .into_iter()
                .filter(|item| !filtered_out.contains(item))
                .collect();
            stagger(cx, &items);
        }

        debug!(%section, "Section revealed");
        true
    }

    pub fn is_revealed(&self, section: NodeId) -> bool {
        self.revealed.contains(&section)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn sections(&self) -> &[NodeId] {
        &self.sections
    }
}

fn stagger<D: Dom>(cx: &mut StageContext<D>, nodes: &[NodeId]) {
    let step = cx.config.stagger();
    for (index, node) in nodes.iter().enumerate() {
        let delay = step * index as u32;
        cx.after(
            delay,
            Deferred::style(*node, &[("opacity", "1"), ("transform", REVEALED_OFFSET)]),
        );
    }
}
