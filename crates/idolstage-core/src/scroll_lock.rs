//! Body scroll lock shared by the overlays.
//!
//! Each overlay acquires the lock under its own owner tag. The body stays
//! locked while any owner holds it, so closing the lightbox does not unlock
//! the page under an open modal (and vice versa).

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::dom::Dom;

/// Overlays that can hold the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockOwner {
    Lightbox,
    Modal,
}

#[derive(Debug, Default)]
pub struct ScrollLock {
    owners: BTreeSet<LockOwner>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `owner`; the body is locked on the first acquisition.
    pub fn acquire<D: Dom>(&mut self, dom: &mut D, owner: LockOwner) {
        let was_locked = self.is_locked();
        if self.owners.insert(owner) && !was_locked {
            let body = dom.body();
            dom.set_style(body, "overflow", "hidden");
            debug!(?owner, "Body scroll locked");
        }
    }

    /// Drop `owner`'s hold; the body is unlocked when no owner remains.
    pub fn release<D: Dom>(&mut self, dom: &mut D, owner: LockOwner) {
        if self.owners.remove(&owner) && self.owners.is_empty() {
            let body = dom.body();
            dom.remove_style(body, "overflow");
            debug!(?owner, "Body scroll unlocked");
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.owners.is_empty()
    }

    pub fn holds(&self, owner: LockOwner) -> bool {
        self.owners.contains(&owner)
    }

    pub fn owners(&self) -> Vec<LockOwner> {
        self.owners.iter().copied().collect()
    }
}
