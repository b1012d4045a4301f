//! Input signals delivered by the host.

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Keyboard key as reported by `KeyboardEvent.key`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Escape => write!(f, "Escape"),
            Key::Other(key) => write!(f, "{}", key),
        }
    }
}

/// Signal kinds listeners subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Load,
    Scroll,
    Click,
    KeyDown,
    Intersection,
    PointerEnter,
    PointerLeave,
}

/// Something that happened in the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Window finished loading every resource
    Load,
    /// Window scrolled to vertical `offset`
    Scroll { offset: f64 },
    /// Click whose innermost target is `target`
    Click { target: NodeId },
    /// Key pressed anywhere in the document
    KeyDown { key: Key },
    /// Intersection change for an observed element
    Intersection { target: NodeId, intersecting: bool },
    /// Pointer entered `target`
    PointerEnter { target: NodeId },
    /// Pointer left `target`
    PointerLeave { target: NodeId },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Load => SignalKind::Load,
            Signal::Scroll { .. } => SignalKind::Scroll,
            Signal::Click { .. } => SignalKind::Click,
            Signal::KeyDown { .. } => SignalKind::KeyDown,
            Signal::Intersection { .. } => SignalKind::Intersection,
            Signal::PointerEnter { .. } => SignalKind::PointerEnter,
            Signal::PointerLeave { .. } => SignalKind::PointerLeave,
        }
    }

    /// Element the signal originated from, if any
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Signal::Click { target }
            | Signal::Intersection { target, .. }
            | Signal::PointerEnter { target }
            | Signal::PointerLeave { target } => Some(*target),
            Signal::Load | Signal::Scroll { .. } | Signal::KeyDown { .. } => None,
        }
    }

    /// Click and key signals bubble from their target to the document.
    pub fn bubbles(&self) -> bool {
        matches!(self, Signal::Click { .. } | Signal::KeyDown { .. })
    }
}

/// What the host must do after a signal was handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Suppress the browser's default action (anchor navigation)
    pub prevent_default: bool,
    /// Number of listeners that ran
    pub handled: usize,
}
