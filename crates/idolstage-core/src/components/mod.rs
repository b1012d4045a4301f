//! Page components.
//!
//! Each component owns its state, subscribes in `mount` and reacts to the
//! handlers the [`Stage`](crate::Stage) routes to it. Components do not call
//! each other; the stage performs the two cross-component effects (smooth
//! scroll closing the menu, overlays sharing the scroll lock).

pub mod footer;
pub mod gallery;
pub mod hover;
pub mod lightbox;
pub mod loader;
pub mod menu;
pub mod modal;
pub mod navigation;
pub mod particles;
pub mod reveal;
pub mod scroll;

pub use gallery::{GalleryFilter, GalleryItem};
pub use lightbox::{LightboxController, LightboxInstance, OverlayPhase};
pub use loader::PageLoader;
pub use menu::MenuToggle;
pub use modal::ModalController;
pub use navigation::SmoothScroll;
pub use reveal::VisibilityObserver;
pub use scroll::{NavbarState, ScrollReactor};
