//! Stage configuration
//!
//! Every timing and threshold the controller uses lives here. The defaults
//! reproduce the site's shipped behavior; hosts may override them from JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};

/// Sentinel filter value that shows every gallery item
pub const FILTER_ALL: &str = "all";

/// Tunables for the whole controller.
///
/// Missing JSON fields fall back to [`StageConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Offset past which the navbar gets the `scrolled` class (px)
    pub scrolled_threshold: f64,
    /// Offset past which scrolling down hides the navbar (px)
    pub hide_threshold: f64,
    /// Hero translate per scrolled pixel
    pub parallax_factor: f64,
    /// Fraction of a section that must be visible to count as intersecting
    pub reveal_threshold: f64,
    /// Bottom root margin of the observer (px, negative pulls the trigger up)
    pub reveal_bottom_margin: i32,
    /// Delay between consecutive card reveals (ms)
    pub stagger_ms: u64,
    /// Length of the overlay and gallery fade transitions (ms)
    pub transition_ms: u64,
    /// Deferral used so a CSS transition observes the preceding change (ms)
    pub tick_ms: u64,
    /// Wait after the load signal before the loader starts fading (ms)
    pub loader_delay_ms: u64,
    /// Loader fade duration before it is detached (ms)
    pub loader_fade_ms: u64,
    /// Number of floating particles spawned at mount
    pub particle_count: usize,
    /// Fixed navbar height subtracted from smooth-scroll targets (px)
    pub nav_offset: f64,
    /// Category shown when the page opens
    pub default_filter: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            scrolled_threshold: 50.0,
            hide_threshold: 100.0,
            parallax_factor: 0.5,
            reveal_threshold: 0.1,
            reveal_bottom_margin: -50,
            stagger_ms: 100,
            transition_ms: 300,
            tick_ms: 10,
            loader_delay_ms: 500,
            loader_fade_ms: 500,
            particle_count: 15,
            nav_offset: 80.0,
            default_filter: "live".to_string(),
        }
    }
}

impl StageConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> StageResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> StageResult<()> {
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(StageError::InvalidConfig(format!(
                "reveal_threshold must be within 0..=1, got {}",
                self.reveal_threshold
            )));
        }
        if self.scrolled_threshold < 0.0 || self.hide_threshold < 0.0 {
            return Err(StageError::InvalidConfig(
                "scroll thresholds must not be negative".to_string(),
            ));
        }
        if !self.parallax_factor.is_finite() || !self.nav_offset.is_finite() {
            return Err(StageError::InvalidConfig(
                "parallax_factor and nav_offset must be finite".to_string(),
            ));
        }
        if self.default_filter.trim().is_empty() {
            return Err(StageError::InvalidConfig(
                "default_filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn loader_delay(&self) -> Duration {
        Duration::from_millis(self.loader_delay_ms)
    }

    pub fn loader_fade(&self) -> Duration {
        Duration::from_millis(self.loader_fade_ms)
    }

    /// Observer root margin in CSS shorthand, e.g. `0px 0px -50px 0px`
    pub fn reveal_root_margin(&self) -> String {
        format!("0px 0px {}px 0px", self.reveal_bottom_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site() {
        let config = StageConfig::default();
        assert_eq!(config.scrolled_threshold, 50.0);
        assert_eq!(config.hide_threshold, 100.0);
        assert_eq!(config.transition(), Duration::from_millis(300));
        assert_eq!(config.particle_count, 15);
        assert_eq!(config.reveal_root_margin(), "0px 0px -50px 0px");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = StageConfig::from_json(r#"{"default_filter": "mv", "stagger_ms": 50}"#)
            .unwrap();
        assert_eq!(config.default_filter, "mv");
        assert_eq!(config.stagger(), Duration::from_millis(50));
        assert_eq!(config.transition_ms, 300);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = StageConfig::from_json(r#"{"reveal_threshold": 2.0}"#).unwrap_err();
        assert!(matches!(err, StageError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_empty_default_filter() {
        let config = StageConfig {
            default_filter: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
