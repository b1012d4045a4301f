//! Lightbox overlay for gallery items and show posters.
//!
//! The overlay is built on open and detached one transition after close.
//! Its lifecycle is an explicit state machine; the dismiss and Escape
//! listeners exist only while the overlay is opening or open.
//!
//! ```text
//! Closed --open--> Opening --tick--> Open --close--> Closing --detach--> Closed
//!                     \________________close________/
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, ListenerId, Target};
use crate::scroll_lock::LockOwner;
use crate::signal::SignalKind;
use crate::timer::TimerId;
use crate::transition::{self, Deferred};

/// Overlay lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl OverlayPhase {
    /// Opening or open: the overlay is interactive and holds the scroll lock
    pub fn is_active(&self) -> bool {
        matches!(self, OverlayPhase::Opening | OverlayPhase::Open)
    }
}

/// The live overlay element and its subscriptions
#[derive(Debug, Clone)]
pub struct LightboxInstance {
    pub node: NodeId,
    pub source_url: String,
    pub alt_text: String,
    dismiss: Option<ListenerId>,
    escape: Option<ListenerId>,
    removal: Option<TimerId>,
}

#[derive(Debug, Default)]
pub struct LightboxController {
    phase: OverlayPhase,
    current: Option<LightboxInstance>,
    sources: Vec<NodeId>,
}

impl LightboxController {
    /// Make every gallery item and show poster open the lightbox.
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        self.sources = cx.dom.query_all(".gallery-item, .poster-item");
        for source in &self.sources {
            cx.listeners
                .subscribe(SignalKind::Click, Target::Node(*source), Handler::OpenLightbox);
        }
    }

    /// Open the image nested in a clicked gallery item or poster.
    pub fn on_source_click<D: Dom>(&mut self, cx: &mut StageContext<D>, source: NodeId) -> bool {
        let Some(img) = cx.dom.query_one_within(source, "img") else {
            debug!(%source, "Lightbox source without image");
            return false;
        };
        let Some(src) = cx.dom.attribute(img, "src") else {
            debug!(%source, "Lightbox image without src");
            return false;
        };
        let alt = cx.dom.attribute(img, "alt").unwrap_or_default();
        self.open(cx, &src, &alt);
        true
    }

    /// Build and attach a new overlay for `source_url`.
    ///
    /// Any overlay still on screen (including one fading out) is removed
    /// first, so at most one `.lightbox` is ever attached.
    pub fn open<D: Dom>(&mut self, cx: &mut StageContext<D>, source_url: &str, alt_text: &str) -> NodeId {
        self.discard(cx);

        let overlay = cx.dom.create_element("div");
        cx.dom.add_class(overlay, "lightbox");
        let content = cx.dom.create_element("div");
        cx.dom.add_class(content, "lightbox-content");
        let close = cx.dom.create_element("span");
        cx.dom.add_class(close, "lightbox-close");
        cx.dom.set_text(close, "\u{00d7}");
        let img = cx.dom.create_element("img");
        cx.dom.set_attribute(img, "src", source_url);
        cx.dom.set_attribute(img, "alt", alt_text);

        cx.dom.append_child(content, close);
        cx.dom.append_child(content, img);
        cx.dom.append_child(overlay, content);
        let body = cx.dom.body();
        cx.dom.append_child(body, overlay);

        cx.scroll_lock.acquire(&mut cx.dom, LockOwner::Lightbox);
        let tick = cx.config.tick();
        cx.after(tick, Deferred::ActivateLightbox(overlay));

        let dismiss = cx
            .listeners
            .subscribe(SignalKind::Click, Target::Node(overlay), Handler::DismissLightbox);
        let escape = cx.listeners.subscribe_once(
            SignalKind::KeyDown,
            Target::Document,
            Handler::LightboxEscape,
        );

        self.current = Some(LightboxInstance {
            node: overlay,
            source_url: source_url.to_string(),
            alt_text: alt_text.to_string(),
            dismiss: Some(dismiss),
            escape: Some(escape),
            removal: None,
        });
        self.phase = OverlayPhase::Opening;
        info!(source_url, "Lightbox opened");
        overlay
    }

    /// Deferred activation one tick after attach.
    pub fn activate<D: Dom>(&mut self, cx: &mut StageContext<D>, overlay: NodeId) {
        let matches = self.current.as_ref().is_some_and(|c| c.node == overlay);
        if self.phase != OverlayPhase::Opening || !matches {
            return;
        }
        cx.dom.add_class(overlay, "active");
        self.phase = OverlayPhase::Open;
    }

    /// Click routed to the overlay: close on backdrop or close glyph only.
    pub fn on_dismiss_click<D: Dom>(&mut self, cx: &mut StageContext<D>, target: NodeId) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        if target == current.node || cx.dom.has_class(target, "lightbox-close") {
            return self.close(cx);
        }
        false
    }

    /// The one-shot Escape listener fired (and is already gone).
    pub fn on_escape<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        if let Some(current) = self.current.as_mut() {
            current.escape = None;
        }
        self.close(cx)
    }

    /// Start the fade-out. Returns `false` when nothing is open.
    pub fn close<D: Dom>(&mut self, cx: &mut StageContext<D>) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        let Some(current) = self.current.as_mut() else {
            return false;
        };

        release_listeners(cx, current);
        cx.scroll_lock.release(&mut cx.dom, LockOwner::Lightbox);
        let transition = cx.config.transition();
        current.removal = Some(transition::schedule_removal(
            cx,
            current.node,
            "active",
            transition,
        ));
        self.phase = OverlayPhase::Closing;
        debug!(overlay = %current.node, "Lightbox closing");
        true
    }

    /// A deferred detach ran for `node`.
    pub fn on_detached(&mut self, node: NodeId) {
        if self.current.as_ref().is_some_and(|c| c.node == node) {
            self.current = None;
            self.phase = OverlayPhase::Closed;
        }
    }

    /// Tear down whatever overlay exists right now, without a fade.
    fn discard<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        let Some(mut current) = self.current.take() else {
            return;
        };
        release_listeners(cx, &mut current);
        if let Some(timer) = current.removal.take() {
            cx.timers.cancel(timer);
        }
        if self.phase.is_active() {
            cx.scroll_lock.release(&mut cx.dom, LockOwner::Lightbox);
        }
        transition::detach_if_attached(&mut cx.dom, current.node);
        self.phase = OverlayPhase::Closed;
    }

    /// Elements whose click opens the lightbox
    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&LightboxInstance> {
        self.current.as_ref()
    }
}

fn release_listeners<D: Dom>(cx: &mut StageContext<D>, instance: &mut LightboxInstance) {
    if let Some(id) = instance.dismiss.take() {
        cx.listeners.unsubscribe(id);
    }
    if let Some(id) = instance.escape.take() {
        cx.listeners.unsubscribe(id);
    }
}
