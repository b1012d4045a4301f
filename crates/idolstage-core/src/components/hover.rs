//! Member card hover lift.

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;

pub const LIFTED: &str = "translateY(-10px) scale(1.05)";
pub const RESTING: &str = "translateY(0) scale(1)";

pub fn mount<D: Dom>(cx: &mut StageContext<D>) -> usize {
    let cards = cx.dom.query_all(".member-card");
    for card in &cards {
        cx.listeners
            .subscribe(SignalKind::PointerEnter, Target::Node(*card), Handler::HoverLift);
        cx.listeners
            .subscribe(SignalKind::PointerLeave, Target::Node(*card), Handler::HoverRest);
    }
    cards.len()
}

pub fn lift<D: Dom>(cx: &mut StageContext<D>, card: NodeId) {
    cx.dom.set_style(card, "transform", LIFTED);
}

pub fn rest<D: Dom>(cx: &mut StageContext<D>, card: NodeId) {
    cx.dom.set_style(card, "transform", RESTING);
}
