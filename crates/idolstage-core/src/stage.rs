//! The page controller.
//!
//! A [`Stage`] owns the document, the simulated clock and every component.
//! Hosts feed it [`Signal`]s and advance its clock; it never reads a real
//! clock or talks to a browser on its own.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::components::{
    footer, hover, particles, GalleryFilter, LightboxController, MenuToggle, ModalController,
    NavbarState, OverlayPhase, PageLoader, ScrollReactor, SmoothScroll, VisibilityObserver,
};
use crate::config::StageConfig;
use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::error::StageResult;
use crate::listeners::{Handler, Invocation, ListenerRegistry};
use crate::scroll_lock::{LockOwner, ScrollLock};
use crate::signal::{DispatchOutcome, Signal};
use crate::styles;
use crate::transition::{self, Deferred};

/// Counts of what `mount` wired up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MountSummary {
    pub particles: usize,
    pub anchors: usize,
    pub sections: usize,
    pub gallery_items: usize,
    pub filter_buttons: usize,
    pub lightbox_sources: usize,
    pub member_cards: usize,
    pub year_slots: usize,
    pub modal: bool,
    pub loader_created: bool,
}

/// Observable state after a run, for the simulator and tests
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub now_ms: u128,
    pub navbar: NavbarState,
    pub scroll_locked: bool,
    pub lock_owners: Vec<LockOwner>,
    pub active_filter: String,
    pub visible_items: Vec<NodeId>,
    pub revealed_sections: usize,
    pub lightbox: OverlayPhase,
    pub lightbox_source: Option<String>,
    pub modal_open: bool,
    pub menu_open: bool,
    pub loader_attached: bool,
    pub pending_timers: usize,
    pub listeners: usize,
}

pub struct Stage<D: Dom> {
    cx: StageContext<D>,
    scroll: ScrollReactor,
    navigation: SmoothScroll,
    reveal: VisibilityObserver,
    gallery: GalleryFilter,
    lightbox: LightboxController,
    modal: ModalController,
    menu: MenuToggle,
    loader: PageLoader,
    mounted: Option<MountSummary>,
}

impl<D: Dom> Stage<D> {
    /// Create a stage over `dom`. Fails only on an invalid configuration.
    pub fn new(dom: D, config: StageConfig) -> StageResult<Self> {
        config.validate()?;
        Ok(Self {
            cx: StageContext::new(dom, config),
            scroll: ScrollReactor::default(),
            navigation: SmoothScroll::default(),
            reveal: VisibilityObserver::default(),
            gallery: GalleryFilter::default(),
            lightbox: LightboxController::default(),
            modal: ModalController::default(),
            menu: MenuToggle::default(),
            loader: PageLoader::default(),
            mounted: None,
        })
    }

    /// Wire every component to the document.
    ///
    /// Missing markup skips the matching component. Mounting twice returns
    /// the first summary and changes nothing.
    pub fn mount<R: Rng>(&mut self, year: i32, rng: &mut R) -> MountSummary {
        if let Some(summary) = &self.mounted {
            return summary.clone();
        }

        let cx = &mut self.cx;
        let particles = particles::spawn(cx, rng);
        self.scroll.mount(cx);
        self.navigation.mount(cx);
        self.reveal.mount(cx);
        self.gallery.mount(cx);
        self.lightbox.mount(cx);
        self.loader.mount(cx);
        self.menu.mount(cx);
        let member_cards = hover::mount(cx);
        let year_slots = footer::stamp_year(cx, year);
        styles::inject(cx);
        self.modal.mount(cx);

        let summary = MountSummary {
            particles,
            anchors: self.navigation.anchors().len(),
            sections: self.reveal.sections().len(),
            gallery_items: self.gallery.items().len(),
            filter_buttons: self.gallery.buttons().len(),
            lightbox_sources: self.lightbox.sources().len(),
            member_cards,
            year_slots,
            modal: self.modal.is_present(),
            loader_created: self.loader.was_created(),
        };
        info!(
            sections = summary.sections,
            gallery_items = summary.gallery_items,
            listeners = self.cx.listeners.len(),
            "Stage mounted"
        );
        self.mounted = Some(summary.clone());
        summary
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Deliver one host signal to its listeners in subscription order.
    pub fn dispatch(&mut self, signal: Signal) -> DispatchOutcome {
        let invocations = self.cx.listeners.route(&signal, &self.cx.dom);
        let mut outcome = DispatchOutcome::default();

        for invocation in invocations {
            if !invocation.handler.accepts(&signal) {
                continue;
            }
            if !self.cx.listeners.claim(invocation.id) {
                trace!(handler = ?invocation.handler, "Listener removed before it ran");
                continue;
            }
            outcome.handled += 1;
            self.invoke(invocation, &signal, &mut outcome);
        }

        debug!(signal = ?signal.kind(), handled = outcome.handled, "Signal dispatched");
        outcome
    }

    fn invoke(&mut self, invocation: Invocation, signal: &Signal, outcome: &mut DispatchOutcome) {
        let cx = &mut self.cx;
        let current = invocation.current;

        match (invocation.handler, signal) {
            (Handler::Scroll, Signal::Scroll { offset }) => {
                self.scroll.on_scroll(cx, *offset);
            }
            (Handler::RevealSection, Signal::Intersection { target, intersecting }) => {
                let filtered_out = self.gallery.hidden_nodes();
                self.reveal
                    .on_intersection(cx, *target, *intersecting, &filtered_out);
            }
            (Handler::SmoothScroll, Signal::Click { .. }) => {
                outcome.prevent_default = true;
                if let Some(anchor) = current {
                    if self.navigation.on_click(cx, anchor).is_some() {
                        self.menu.force_close(cx);
                    }
                }
            }
            (Handler::FilterButton, Signal::Click { .. }) => {
                if let Some(button) = current {
                    self.gallery.on_button(cx, button);
                }
            }
            (Handler::OpenLightbox, Signal::Click { .. }) => {
                if let Some(source) = current {
                    self.lightbox.on_source_click(cx, source);
                }
            }
            (Handler::DismissLightbox, Signal::Click { target }) => {
                self.lightbox.on_dismiss_click(cx, *target);
            }
            (Handler::LightboxEscape, Signal::KeyDown { .. }) => {
                self.lightbox.on_escape(cx);
            }
            (Handler::OpenModal, Signal::Click { .. }) => {
                self.modal.open(cx);
            }
            (Handler::DismissModal, Signal::Click { target }) => {
                self.modal.on_dismiss_click(cx, *target);
            }
            (Handler::ModalEscape, Signal::KeyDown { .. }) => {
                self.modal.on_escape(cx);
            }
            (Handler::ToggleMenu, Signal::Click { .. }) => {
                self.menu.toggle(cx);
            }
            (Handler::HoverLift, Signal::PointerEnter { .. }) => {
                if let Some(card) = current {
                    hover::lift(cx, card);
                }
            }
            (Handler::HoverRest, Signal::PointerLeave { .. }) => {
                if let Some(card) = current {
                    hover::rest(cx, card);
                }
            }
            (Handler::HideLoader, Signal::Load) => {
                self.loader.on_load(cx);
            }
            (handler, signal) => {
                trace!(?handler, kind = ?signal.kind(), "Handler ignores signal");
            }
        }
    }

    /// Advance the clock by `by`, running every continuation that falls due.
    pub fn advance(&mut self, by: Duration) {
        let target = self.cx.now + by;
        self.advance_to(target);
    }

    /// Run due continuations in deadline order and move the clock to `now`.
    ///
    /// A `now` in the past is ignored; the clock never runs backwards.
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.cx.now {
            return;
        }
        while let Some((due, _, action)) = self.cx.timers.pop_due(now) {
            self.cx.now = due.max(self.cx.now);
            self.run_deferred(action);
        }
        self.cx.now = now;
    }

    /// Run continuations until none are pending. Returns the final clock.
    pub fn settle(&mut self) -> Duration {
        while let Some(due) = self.cx.timers.next_due() {
            self.advance_to(due.max(self.cx.now));
        }
        self.cx.now
    }

    /// Deadline of the earliest pending continuation
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.cx.timers.next_due()
    }

    fn run_deferred(&mut self, action: Deferred) {
        match action {
            Deferred::ActivateLightbox(overlay) => self.lightbox.activate(&mut self.cx, overlay),
            other => {
                if let Some(detached) = transition::apply(&mut self.cx.dom, &other) {
                    self.lightbox.on_detached(detached);
                    self.loader.on_detached(detached);
                }
            }
        }
    }

    pub fn apply_filter(&mut self, filter: &str) {
        self.gallery.apply_filter(&mut self.cx, filter);
    }

    pub fn open_lightbox(&mut self, source_url: &str, alt_text: &str) -> NodeId {
        self.lightbox.open(&mut self.cx, source_url, alt_text)
    }

    pub fn close_lightbox(&mut self) -> bool {
        self.lightbox.close(&mut self.cx)
    }

    pub fn open_modal(&mut self) -> bool {
        self.modal.open(&mut self.cx)
    }

    pub fn close_modal(&mut self) -> bool {
        self.modal.close(&mut self.cx)
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu.toggle(&mut self.cx)
    }

    pub fn now(&self) -> Duration {
        self.cx.now
    }

    pub fn dom(&self) -> &D {
        &self.cx.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.cx.dom
    }

    pub fn config(&self) -> &StageConfig {
        &self.cx.config
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.cx.listeners
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.cx.scroll_lock
    }

    pub fn navbar(&self) -> NavbarState {
        self.scroll.state()
    }

    pub fn reveal(&self) -> &VisibilityObserver {
        &self.reveal
    }

    pub fn gallery(&self) -> &GalleryFilter {
        &self.gallery
    }

    pub fn lightbox(&self) -> &LightboxController {
        &self.lightbox
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn menu(&self) -> &MenuToggle {
        &self.menu
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    pub fn report(&self) -> StageReport {
        StageReport {
            now_ms: self.cx.now.as_millis(),
            navbar: self.scroll.state(),
            scroll_locked: self.cx.scroll_lock.is_locked(),
            lock_owners: self.cx.scroll_lock.owners(),
            active_filter: self.gallery.active_filter().to_string(),
            visible_items: self.gallery.visible_nodes(),
            revealed_sections: self.reveal.revealed_count(),
            lightbox: self.lightbox.phase(),
            lightbox_source: self.lightbox.current().map(|c| c.source_url.clone()),
            modal_open: self.modal.is_open(),
            menu_open: self.menu.is_open(),
            loader_attached: self
                .loader
                .node()
                .is_some_and(|node| self.cx.dom.is_attached(node)),
            pending_timers: self.cx.timers.len(),
            listeners: self.cx.listeners.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::signal::Key;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stage(dom: MemoryDom) -> Stage<MemoryDom> {
        let mut stage = Stage::new(dom, StageConfig::default()).unwrap();
        stage.mount(2026, &mut StdRng::seed_from_u64(0));
        stage
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StageConfig {
            reveal_threshold: 2.0,
            ..StageConfig::default()
        };
        assert!(Stage::new(MemoryDom::default(), config).is_err());
    }

    #[test]
    fn test_mount_is_idempotent() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        dom.element("span").class("current-year").append_to(body);
        let mut stage = stage(dom);
        let listeners = stage.listeners().len();

        let again = stage.mount(1999, &mut StdRng::seed_from_u64(0));
        assert_eq!(again.year_slots, 1);
        assert_eq!(stage.listeners().len(), listeners);
        let slot = stage.dom().query(".current-year").unwrap();
        assert_eq!(stage.dom().text(slot), Some("2026"));
    }

    #[test]
    fn test_empty_document_mounts() {
        let stage = stage(MemoryDom::default());
        let report = stage.report();
        assert!(!report.scroll_locked);
        assert!(report.loader_attached);
        assert_eq!(report.lightbox, OverlayPhase::Closed);
    }

    #[test]
    fn test_unrelated_key_keeps_escape_armed() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        dom.element("div").id("donationModal").class("modal").append_to(body);
        let mut stage = stage(dom);

        assert!(stage.open_modal());
        stage.dispatch(Signal::KeyDown {
            key: Key::Other("Enter".into()),
        });
        assert!(stage.modal().is_open());

        stage.dispatch(Signal::KeyDown { key: Key::Escape });
        assert!(!stage.modal().is_open());
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut stage = stage(MemoryDom::default());
        stage.advance(Duration::from_millis(50));
        stage.advance_to(Duration::from_millis(10));
        assert_eq!(stage.now(), Duration::from_millis(50));
    }
}
