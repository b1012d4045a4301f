//! Signal scripts replayed by `idolstage run`.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   {"step": "load"},
//!   {"step": "scroll", "offset": 200},
//!   {"step": "intersect", "selector": "#members"},
//!   {"step": "click", "selector": ".filter-btn", "index": 2},
//!   {"step": "key", "key": "Escape"},
//!   {"step": "wait", "ms": 300}
//! ]
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use idolstage_core::{DispatchOutcome, Dom, Key, NodeId, Signal, Stage};
use serde::{Deserialize, Serialize};

fn intersecting_default() -> bool {
    true
}

/// One scripted host action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Load,
    Scroll {
        offset: f64,
    },
    Click {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    Key {
        key: String,
    },
    Intersect {
        selector: String,
        #[serde(default)]
        index: usize,
        #[serde(default = "intersecting_default")]
        intersecting: bool,
    },
    Hover {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    Leave {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    Wait {
        ms: u64,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Load => write!(f, "load"),
            Step::Scroll { offset } => write!(f, "scroll {}", offset),
            Step::Click { selector, index } => write!(f, "click {}[{}]", selector, index),
            Step::Key { key } => write!(f, "key {}", key),
            Step::Intersect {
                selector,
                index,
                intersecting,
            } => write!(f, "intersect {}[{}] {}", selector, index, intersecting),
            Step::Hover { selector, index } => write!(f, "hover {}[{}]", selector, index),
            Step::Leave { selector, index } => write!(f, "leave {}[{}]", selector, index),
            Step::Wait { ms } => write!(f, "wait {}ms", ms),
        }
    }
}

/// Result of one replayed step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub at_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DispatchOutcome>,
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse(&raw).with_context(|| format!("Invalid script {}", path.display()))
}

pub fn parse(raw: &str) -> Result<Vec<Step>> {
    Ok(serde_json::from_str(raw)?)
}

/// Resolve the `index`-th element matching `selector`.
pub fn resolve<D: Dom>(stage: &Stage<D>, selector: &str, index: usize) -> Result<NodeId> {
    let matches = stage.dom().query_all(selector);
    match matches.get(index) {
        Some(node) => Ok(*node),
        None if matches.is_empty() => bail!("No element matches '{}'", selector),
        None => bail!(
            "'{}' matches {} element(s), index {} is out of range",
            selector,
            matches.len(),
            index
        ),
    }
}

/// Translate a non-wait step into the signal it delivers.
pub fn signal_for<D: Dom>(stage: &Stage<D>, step: &Step) -> Result<Option<Signal>> {
    let signal = match step {
        Step::Load => Signal::Load,
        Step::Scroll { offset } => Signal::Scroll { offset: *offset },
        Step::Click { selector, index } => Signal::Click {
            target: resolve(stage, selector, *index)?,
        },
        Step::Key { key } => Signal::KeyDown {
            key: Key::from_dom(key),
        },
        Step::Intersect {
            selector,
            index,
            intersecting,
        } => Signal::Intersection {
            target: resolve(stage, selector, *index)?,
            intersecting: *intersecting,
        },
        Step::Hover { selector, index } => Signal::PointerEnter {
            target: resolve(stage, selector, *index)?,
        },
        Step::Leave { selector, index } => Signal::PointerLeave {
            target: resolve(stage, selector, *index)?,
        },
        Step::Wait { .. } => return Ok(None),
    };
    Ok(Some(signal))
}

/// Advance `stage` by `by`, sleeping through each deadline when `realtime`.
pub async fn wait<D: Dom>(stage: &mut Stage<D>, by: Duration, realtime: bool) {
    let target = stage.now() + by;
    if !realtime {
        stage.advance_to(target);
        return;
    }

    loop {
        let now = stage.now();
        let next = match stage.next_deadline() {
            Some(due) if due <= target => due,
            _ => target,
        };
        let gap = next.saturating_sub(now);
        if gap > Duration::ZERO {
            tokio::time::sleep(gap.min(Duration::from_millis(100))).await;
        }
        let reached = (now + gap.min(Duration::from_millis(100))).min(target);
        stage.advance_to(reached);
        if reached >= target {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_steps() {
        let steps = parse(
            r##"[
                {"step": "load"},
                {"step": "scroll", "offset": 200},
                {"step": "click", "selector": ".menu-toggle"},
                {"step": "key", "key": "Escape"},
                {"step": "intersect", "selector": "#members", "index": 0},
                {"step": "hover", "selector": ".member-card", "index": 1},
                {"step": "leave", "selector": ".member-card", "index": 1},
                {"step": "wait", "ms": 300}
            ]"##,
        )
        .unwrap();

        assert_eq!(steps.len(), 8);
        assert_eq!(
            steps[2],
            Step::Click {
                selector: ".menu-toggle".to_string(),
                index: 0
            }
        );
        assert!(matches!(steps[4], Step::Intersect { intersecting: true, .. }));
        assert_eq!(steps[7].to_string(), "wait 300ms");
    }

    #[test]
    fn test_unknown_step_rejected() {
        assert!(parse(r#"[{"step": "teleport"}]"#).is_err());
    }
}
