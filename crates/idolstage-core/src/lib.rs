//! Project Idol Stage Core Library
//!
//! View-state controller for the Project Idol promotional site.
//!
//! ## Overview
//!
//! The controller reacts to page signals (scroll, click, key, intersection,
//! pointer, load) and drives the page's interactive chrome: navbar state and
//! hero parallax, staggered section reveals, the gallery category filter,
//! the image lightbox, the donation modal, the mobile menu and the page
//! loader. It is written against the [`Dom`] trait and a simulated clock, so
//! the same code runs in the browser, in the headless simulator and in tests.
//!
//! ## Core Principles
//!
//! - **Host-driven**: the host delivers [`Signal`]s and advances time
//! - **Deterministic**: continuations run from a timer queue in deadline order
//! - **Forgiving markup**: missing optional elements skip their component
//!
//! ## Quick Start
//!
//! ```ignore
//! use idolstage_core::{PageLayout, Signal, Stage, StageConfig};
//! use rand::SeedableRng;
//! use std::time::Duration;
//!
//! let dom = PageLayout::promo().build();
//! let mut stage = Stage::new(dom, StageConfig::default())?;
//! stage.mount(2026, &mut rand::rngs::StdRng::seed_from_u64(1));
//!
//! stage.dispatch(Signal::Scroll { offset: 200.0 });
//! stage.apply_filter("backstage");
//! stage.advance(Duration::from_millis(300));
//!
//! println!("{}", serde_json::to_string_pretty(&stage.report())?);
//! ```

pub mod components;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod layout;
pub mod listeners;
pub mod logging;
pub mod scroll_lock;
pub mod signal;
pub mod stage;
pub mod styles;
pub mod timer;
pub mod transition;

// Re-exports
pub use components::{GalleryItem, NavbarState, OverlayPhase};
pub use config::{StageConfig, FILTER_ALL};
pub use context::StageContext;
pub use dom::{Dom, MemoryDom, NodeId, Selector};
pub use error::{StageError, StageResult};
pub use layout::{MediaItem, NavLink, PageLayout, SectionContent, SectionLayout};
pub use listeners::{Handler, ListenerId, ListenerRegistry, Target};
pub use scroll_lock::{LockOwner, ScrollLock};
pub use signal::{DispatchOutcome, Key, Signal, SignalKind};
pub use stage::{MountSummary, Stage, StageReport};
pub use timer::{TimerId, TimerQueue};
pub use transition::Deferred;
