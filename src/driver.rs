//! Wires the browser's events and clock to a [`Stage`].
//!
//! Bubbling signals (click, keydown) are delegated from the document so
//! overlays created later are covered. Non-bubbling signals get one native
//! listener per element the stage subscribed. Deferred continuations are
//! pumped by a single `gloo` timeout re-armed for the next deadline.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use idolstage_core::{DispatchOutcome, Key, Signal, SignalKind, Stage, StageConfig, StageResult};
use js_sys::Array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
};

use crate::web_dom::WebDom;

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

pub struct StageHost {
    stage: RefCell<Stage<WebDom>>,
    epoch_ms: f64,
    listeners: RefCell<Vec<EventListener>>,
    observer: RefCell<Option<(IntersectionObserver, ObserverCallback)>>,
    pump: RefCell<Option<Timeout>>,
    /// Timeout whose callback is running; dropped on the next fire
    retired: RefCell<Option<Timeout>>,
}

impl StageHost {
    /// Mount the controller on the current page and start listening.
    pub fn start(config: StageConfig) -> StageResult<Rc<Self>> {
        let dom = WebDom::from_window()?;
        let mut stage = Stage::new(dom, config)?;

        let now_ms = js_sys::Date::now();
        let year = js_sys::Date::new_0().get_full_year() as i32;
        let summary = stage.mount(year, &mut StdRng::seed_from_u64(now_ms as u64));
        info!(?summary, "Stage mounted in browser");

        let host = Rc::new(Self {
            stage: RefCell::new(stage),
            epoch_ms: now_ms,
            listeners: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
            pump: RefCell::new(None),
            retired: RefCell::new(None),
        });
        host.attach();
        host.observe_sections();
        host.deliver_load_if_complete();
        host.schedule_pump();
        Ok(host)
    }

    fn elapsed(&self) -> Duration {
        let ms = (js_sys::Date::now() - self.epoch_ms).max(0.0);
        Duration::from_secs_f64(ms / 1000.0)
    }

    /// Catch the stage clock up with the wall clock, then dispatch.
    fn dispatch(self: &Rc<Self>, signal: Signal) -> Option<DispatchOutcome> {
        let outcome = {
            let Ok(mut stage) = self.stage.try_borrow_mut() else {
                warn!(kind = ?signal.kind(), "Signal arrived during dispatch, dropped");
                return None;
            };
            stage.advance_to(self.elapsed());
            stage.dispatch(signal)
        };
        self.schedule_pump();
        Some(outcome)
    }

    fn attach(self: &Rc<Self>) {
        let stage = self.stage.borrow();
        let dom = stage.dom();
        let window = dom.window().clone();
        let document = dom.document().clone();
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        let scroll_window = window.clone();
        listeners.push(EventListener::new(&window, "scroll", move |_| {
            let offset = scroll_window.scroll_y().unwrap_or(0.0);
            with_host(&weak, |host| {
                host.dispatch(Signal::Scroll { offset });
            });
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&window, "load", move |_| {
            with_host(&weak, |host| {
                host.dispatch(Signal::Load);
            });
        }));

        // Anchor clicks need preventDefault, which passive listeners ignore.
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &document,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                with_host(&weak, |host| {
                    let Some(target) = event
                        .target()
                        .and_then(|t| host.stage.borrow().dom().lookup(&t))
                    else {
                        return;
                    };
                    let outcome = host.dispatch(Signal::Click { target });
                    if outcome.is_some_and(|o| o.prevent_default) {
                        event.prevent_default();
                    }
                });
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&document, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = Key::from_dom(&event.key());
            with_host(&weak, |host| {
                host.dispatch(Signal::KeyDown { key });
            });
        }));

        for (kind, native) in [
            (SignalKind::PointerEnter, "mouseenter"),
            (SignalKind::PointerLeave, "mouseleave"),
        ] {
            for node in stage.listeners().node_targets(kind) {
                let Some(element) = dom.element(node) else {
                    continue;
                };
                let weak = Rc::downgrade(self);
                listeners.push(EventListener::new(&element, native, move |_| {
                    let signal = match kind {
                        SignalKind::PointerEnter => Signal::PointerEnter { target: node },
                        _ => Signal::PointerLeave { target: node },
                    };
                    with_host(&weak, |host| {
                        host.dispatch(signal);
                    });
                }));
            }
        }

        debug!(count = listeners.len(), "Native listeners attached");
        drop(stage);
        self.listeners.borrow_mut().extend(listeners);
    }

    fn observe_sections(self: &Rc<Self>) {
        let stage = self.stage.borrow();
        let sections = stage.listeners().node_targets(SignalKind::Intersection);
        if sections.is_empty() {
            return;
        }

        let weak = Rc::downgrade(self);
        let callback: ObserverCallback = Closure::new(move |entries: Array, _: IntersectionObserver| {
            with_host(&weak, |host| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let target = host.stage.borrow().dom().lookup(&entry.target());
                    if let Some(target) = target {
                        host.dispatch(Signal::Intersection {
                            target,
                            intersecting: entry.is_intersecting(),
                        });
                    }
                }
            });
        });

        let config = stage.config();
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(config.reveal_threshold));
        init.set_root_margin(&config.reveal_root_margin());

        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
                Ok(observer) => observer,
                Err(e) => {
                    warn!(error = ?e, "IntersectionObserver unavailable, sections stay hidden");
                    return;
                }
            };
        for section in sections {
            if let Some(element) = stage.dom().element(section) {
                observer.observe(&element);
            }
        }
        drop(stage);
        *self.observer.borrow_mut() = Some((observer, callback));
    }

    /// The script may start after `load` already fired.
    fn deliver_load_if_complete(self: &Rc<Self>) {
        let complete = self.stage.borrow().dom().document().ready_state() == "complete";
        if complete {
            self.dispatch(Signal::Load);
        }
    }

    /// Re-arm the timeout for the earliest pending continuation.
    fn schedule_pump(self: &Rc<Self>) {
        let Ok(mut stage) = self.stage.try_borrow_mut() else {
            return;
        };
        let Some(due) = stage.next_deadline() else {
            self.pump.borrow_mut().take();
            return;
        };
        drop(stage);

        let delay = due.saturating_sub(self.elapsed()).as_millis() as u32;
        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(delay, move || {
            with_host(&weak, |host| {
                *host.retired.borrow_mut() = host.pump.borrow_mut().take();
                if let Ok(mut stage) = host.stage.try_borrow_mut() {
                    stage.advance_to(host.elapsed());
                }
                host.schedule_pump();
            });
        });
        // Replacing a pending timeout cancels it.
        *self.pump.borrow_mut() = Some(timeout);
    }
}

fn with_host(weak: &Weak<StageHost>, f: impl FnOnce(&Rc<StageHost>)) {
    if let Some(host) = weak.upgrade() {
        f(&host);
    }
}
