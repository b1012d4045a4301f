//! Listener registry.
//!
//! Components subscribe a [`Handler`] to a signal kind on a target instead of
//! capturing closures, so the stage can route signals, count live listeners
//! and drop one-shot subscriptions deterministically.

use serde::Serialize;

use crate::dom::{Dom, NodeId};
use crate::signal::{Key, Signal, SignalKind};

/// Opaque subscription handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerId(u64);

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    Window,
    Document,
    Node(NodeId),
}

/// Component action bound to a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Handler {
    /// Navbar flags and hero parallax
    Scroll,
    /// Staggered reveal of a fade section
    RevealSection,
    /// In-page anchor navigation
    SmoothScroll,
    /// Gallery category button
    FilterButton,
    /// Gallery item or show poster opening the lightbox
    OpenLightbox,
    /// Click on the lightbox overlay or its close glyph
    DismissLightbox,
    /// One-shot Escape while the lightbox is up
    LightboxEscape,
    /// Donation button
    OpenModal,
    /// Click on the modal backdrop or its close button
    DismissModal,
    /// One-shot Escape while the modal is open
    ModalEscape,
    /// Mobile menu button
    ToggleMenu,
    /// Member card hover start
    HoverLift,
    /// Member card hover end
    HoverRest,
    /// Fade out the page loader
    HideLoader,
}

impl Handler {
    /// Whether this handler wants `signal` at all.
    ///
    /// Escape handlers ignore other keys, so a one-shot Escape listener
    /// survives unrelated key presses.
    pub fn accepts(&self, signal: &Signal) -> bool {
        match self {
            Handler::LightboxEscape | Handler::ModalEscape => {
                matches!(signal, Signal::KeyDown { key: Key::Escape })
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Listener {
    id: ListenerId,
    kind: SignalKind,
    target: Target,
    handler: Handler,
    once: bool,
}

/// A listener selected to run for one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub id: ListenerId,
    pub handler: Handler,
    /// Element the listener is attached to (`currentTarget`)
    pub current: Option<NodeId>,
}

/// Ordered set of live subscriptions
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: SignalKind, target: Target, handler: Handler) -> ListenerId {
        self.push(kind, target, handler, false)
    }

    /// Subscribe a listener that is removed right before its first run.
    pub fn subscribe_once(
        &mut self,
        kind: SignalKind,
        target: Target,
        handler: Handler,
    ) -> ListenerId {
        self.push(kind, target, handler, true)
    }

    fn push(&mut self, kind: SignalKind, target: Target, handler: Handler, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind,
            target,
            handler,
            once,
        });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn is_active(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    /// Live listeners of a kind
    pub fn count(&self, kind: SignalKind) -> usize {
        self.listeners.iter().filter(|l| l.kind == kind).count()
    }

    /// Live listeners bound to a handler
    pub fn count_handler(&self, handler: Handler) -> usize {
        self.listeners.iter().filter(|l| l.handler == handler).count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Element targets subscribed to `kind`, deduplicated, in subscription order.
    ///
    /// Hosts use this to attach native listeners for non-bubbling signals.
    pub fn node_targets(&self, kind: SignalKind) -> Vec<NodeId> {
        let mut out = Vec::new();
        for listener in self.listeners.iter().filter(|l| l.kind == kind) {
            if let Target::Node(node) = listener.target {
                if !out.contains(&node) {
                    out.push(node);
                }
            }
        }
        out
    }

    /// Listeners that should see `signal`, in subscription order.
    ///
    /// The result is a snapshot: listeners added while it runs do not see
    /// the signal, and listeners removed meanwhile are skipped by [`claim`].
    ///
    /// [`claim`]: ListenerRegistry::claim
    pub fn route<D: Dom>(&self, signal: &Signal, dom: &D) -> Vec<Invocation> {
        let kind = signal.kind();
        let origin = signal.target();

        self.listeners
            .iter()
            .filter(|l| l.kind == kind)
            .filter(|l| match (l.target, origin) {
                (Target::Window | Target::Document, _) => signal.bubbles() || origin.is_none(),
                (Target::Node(node), Some(origin)) if signal.bubbles() => dom.contains(node, origin),
                (Target::Node(node), Some(origin)) => node == origin,
                (Target::Node(_), None) => false,
            })
            .map(|l| Invocation {
                id: l.id,
                handler: l.handler,
                current: match l.target {
                    Target::Node(node) => Some(node),
                    Target::Window | Target::Document => None,
                },
            })
            .collect()
    }

    /// Confirm a routed listener is still live, removing it if one-shot.
    pub fn claim(&mut self, id: ListenerId) -> bool {
        let Some(pos) = self.listeners.iter().position(|l| l.id == id) else {
            return false;
        };
        if self.listeners[pos].once {
            self.listeners.remove(pos);
        }
        true
    }
}
