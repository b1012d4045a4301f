//! Mobile navigation toggle.

use tracing::debug;

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;

/// One boolean mirrored onto the toggle button and the nav-links panel
#[derive(Debug, Default)]
pub struct MenuToggle {
    button: Option<NodeId>,
    links: Option<NodeId>,
    open: bool,
}

impl MenuToggle {
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        self.button = cx.dom.query(".menu-toggle");
        self.links = cx.dom.query(".nav-links");

        if let Some(button) = self.button {
            cx.listeners
                .subscribe(SignalKind::Click, Target::Node(button), Handler::ToggleMenu);
        }
    }

    /// Flip the menu. Returns the new state.
    pub fn toggle<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        self.open = !self.open;
        self.sync(cx);
        debug!(open = self.open, "Menu toggled");
        self.open
    }

    /// Force the menu closed. Returns `true` if it was open.
    pub fn force_close<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        let was_open = self.open;
        self.open = false;
        self.sync(cx);
        if was_open {
            debug!("Menu closed by navigation");
        }
        was_open
    }

    fn sync<D: Dom>(&self, cx: &mut StageContext<D>) {
        for node in [self.button, self.links].into_iter().flatten() {
            if self.open {
                cx.dom.add_class(node, "active");
            } else {
                cx.dom.remove_class(node, "active");
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
