//! Donation modal.
//!
//! Unlike the lightbox the modal element is part of the markup and is only
//! toggled. The Escape listener is registered on open and removed on close,
//! so repeated cycles never stack handlers.

use tracing::info;

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, ListenerId, Target};
use crate::scroll_lock::LockOwner;
use crate::signal::SignalKind;

pub const MODAL_ID: &str = "donationModal";

#[derive(Debug, Default)]
pub struct ModalController {
    modal: Option<NodeId>,
    open: bool,
    escape: Option<ListenerId>,
    closes: usize,
}

impl ModalController {
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        let Some(modal) = cx.dom.element_by_id(MODAL_ID) else {
            return;
        };
        self.modal = Some(modal);

        cx.listeners
            .subscribe(SignalKind::Click, Target::Node(modal), Handler::DismissModal);
        for trigger in cx.dom.query_all(".donate-btn") {
            cx.listeners
                .subscribe(SignalKind::Click, Target::Node(trigger), Handler::OpenModal);
        }
    }

    /// Show the modal. Returns `false` if absent or already open.
    pub fn open<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        let Some(modal) = self.modal else {
            return false;
        };
        if self.open {
            return false;
        }

        cx.dom.add_class(modal, "active");
        cx.scroll_lock.acquire(&mut cx.dom, LockOwner::Modal);
        self.escape = Some(cx.listeners.subscribe_once(
            SignalKind::KeyDown,
            Target::Document,
            Handler::ModalEscape,
        ));
        self.open = true;
        info!("Donation modal opened");
        true
    }

    /// Hide the modal. Returns `false` if it was not open.
    pub fn close<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        let Some(modal) = self.modal else {
            return false;
        };
        if !self.open {
            return false;
        }

        cx.dom.remove_class(modal, "active");
        cx.scroll_lock.release(&mut cx.dom, LockOwner::Modal);
        if let Some(id) = self.escape.take() {
            cx.listeners.unsubscribe(id);
        }
        self.open = false;
        self.closes += 1;
        info!("Donation modal closed");
        true
    }

    /// Click inside the modal subtree: only the backdrop itself or a
    /// `.modal-close` control dismisses it.
    pub fn on_dismiss_click<D: Dom>(&mut self, cx: &mut StageContext<D>, target: NodeId) -> bool {
        let Some(modal) = self.modal else {
            return false;
        };
        let on_close_button = cx
            .dom
            .query_within(modal, ".modal-close")
            .into_iter()
            .any(|button| cx.dom.contains(button, target));

        if target == modal || on_close_button {
            return self.close(cx);
        }
        false
    }

    /// The one-shot Escape listener fired (and is already gone).
    pub fn on_escape<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        self.escape = None;
        self.close(cx)
    }

    pub fn is_present(&self) -> bool {
        self.modal.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Completed open→closed transitions since mount
    pub fn closes(&self) -> usize {
        self.closes
    }
}
