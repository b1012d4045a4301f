//! Scroll reactor: navbar chrome and hero parallax.

use serde::Serialize;
use tracing::trace;

use crate::config::StageConfig;
use crate::context::StageContext;
use crate::dom::{Dom, NodeId};
use crate::listeners::{Handler, Target};
use crate::signal::SignalKind;

/// Navbar flags derived from the scroll position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NavbarState {
    /// Past the `scrolled` threshold
    pub scrolled: bool,
    /// Hidden because the user is scrolling down past the hide threshold
    pub hidden_by_direction: bool,
    /// Offset seen on the previous signal
    pub last_scroll_top: f64,
}

impl NavbarState {
    /// State after a scroll to offset `y`.
    pub fn advance(self, y: f64, config: &StageConfig) -> Self {
        Self {
            scrolled: y > config.scrolled_threshold,
            hidden_by_direction: y > self.last_scroll_top && y > config.hide_threshold,
            last_scroll_top: y,
        }
    }

    /// Inline transform for the navbar
    pub fn transform(&self) -> &'static str {
        if self.hidden_by_direction {
            "translateY(-100%)"
        } else {
            "translateY(0)"
        }
    }
}

/// Hero translate for offset `y`
pub fn parallax_transform(y: f64, config: &StageConfig) -> String {
    format!("translateY({}px)", y * config.parallax_factor)
}

#[derive(Debug, Default)]
pub struct ScrollReactor {
    navbar: Option<NodeId>,
    hero: Option<NodeId>,
    state: NavbarState,
}

impl ScrollReactor {
    pub fn mount<D: Dom>(&mut self, cx: &mut StageContext<D>) {
        self.navbar = cx.dom.element_by_id("navbar");
        self.hero = cx.dom.query(".hero");

        if self.navbar.is_none() && self.hero.is_none() {
            return;
        }
        cx.listeners
            .subscribe(SignalKind::Scroll, Target::Window, Handler::Scroll);
    }

    pub fn on_scroll<D: Dom>(&mut self, cx: &mut StageContext<D>, y: f64) -> NavbarState {
        self.state = self.state.advance(y, &cx.config);
        trace!(y, state = ?self.state, "Scroll");

        if let Some(navbar) = self.navbar {
            if self.state.scrolled {
                cx.dom.add_class(navbar, "scrolled");
            } else {
                cx.dom.remove_class(navbar, "scrolled");
            }
            cx.dom.set_style(navbar, "transform", self.state.transform());
        }

        if let Some(hero) = self.hero {
            let transform = parallax_transform(y, &cx.config);
            cx.dom.set_style(hero, "transform", &transform);
        }

        self.state
    }

    pub fn state(&self) -> NavbarState {
        self.state
    }
}
