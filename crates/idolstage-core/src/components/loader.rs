//! Full-screen page loader.

use tracing::debug;

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;
use crate::styles;
use crate::transition::Deferred;

#[derive(Debug, Default)]
pub struct PageLoader {
    node: Option<NodeId>,
    created: bool,
    hiding: bool,
}

impl PageLoader {
    /// Reuse the markup's `.loader` or build one, then wait for load.
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        let node = match cx.dom.query(".loader") {
            Some(existing) => existing,
            None => {
                self.created = true;
                build(cx)
            }
        };
        self.node = Some(node);
        cx.listeners
            .subscribe(SignalKind::Load, Target::Window, Handler::HideLoader);
    }

    /// Fade the loader after the configured delay and detach it after the fade.
    pub fn on_load<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        let Some(node) = self.node else {
            return false;
        };
        if self.hiding || !cx.dom.is_attached(node) {
            return false;
        }
        self.hiding = true;

        let delay = cx.config.loader_delay();
        let fade = cx.config.loader_fade();
        cx.after(
            delay,
            Deferred::AddClass {
                node,
                class: "hidden",
            },
        );
        cx.after(delay + fade, Deferred::Detach(node));
        debug!(?delay, ?fade, "Loader scheduled for removal");
        true
    }

    /// A deferred detach ran for `node`; forget the handle.
    pub fn on_detached(&mut self, node: NodeId) {
        if self.node == Some(node) {
            self.node = None;
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Whether the loader was generated rather than found in the markup
    pub fn was_created(&self) -> bool {
        self.created
    }
}

fn build<D: Dom>(cx: &mut StageContext<D>) -> NodeId {
    let loader = cx.dom.create_element("div");
    cx.dom.add_class(loader, "loader");

    let content = cx.dom.create_element("div");
    cx.dom.add_class(content, "loader-content");
    cx.dom.set_markup(content, &styles::loader_mask_svg());

    let text = cx.dom.create_element("div");
    cx.dom.add_class(text, "loader-text");
    cx.dom.set_text(text, "LOADING");

    cx.dom.append_child(content, text);
    cx.dom.append_child(loader, content);
    let body = cx.dom.body();
    cx.dom.append_child(body, loader);
    loader
}
