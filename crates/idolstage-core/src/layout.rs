//! Declarative page layouts for the in-memory document.
//!
//! A [`PageLayout`] describes the promotional page's structure in JSON and
//! builds the matching [`MemoryDom`], so the simulator and tests can mount
//! the controller against realistic markup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::components::modal::MODAL_ID;
use crate::config::FILTER_ALL;
use crate::dom::{Dom, MemoryDom, NodeId};
use crate::error::{StageError, StageResult};

/// Vertical space reserved per section when no offset is given
pub const SECTION_HEIGHT: f64 = 800.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Gallery item or show poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default)]
    pub category: String,
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionContent {
    Members { members: Vec<String> },
    Gallery { filters: Vec<String>, items: Vec<MediaItem> },
    Shows { posters: Vec<MediaItem> },
    Text { body: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: String,
    /// Document offset; defaults to stacking sections below the hero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_top: Option<f64>,
    #[serde(flatten)]
    pub content: SectionContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub viewport_width: f64,
    pub navbar: bool,
    pub nav_links: Vec<NavLink>,
    pub menu_toggle: bool,
    pub particles: bool,
    pub hero: bool,
    pub sections: Vec<SectionLayout>,
    pub donation_modal: bool,
    pub footer_year: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            navbar: false,
            nav_links: Vec::new(),
            menu_toggle: false,
            particles: false,
            hero: false,
            sections: Vec::new(),
            donation_modal: false,
            footer_year: false,
        }
    }
}

fn link(label: &str, href: &str) -> NavLink {
    NavLink {
        label: label.to_string(),
        href: href.to_string(),
    }
}

fn media(category: &str, src: &str, alt: &str) -> MediaItem {
    MediaItem {
        category: category.to_string(),
        src: src.to_string(),
        alt: alt.to_string(),
    }
}

impl PageLayout {
    /// The full promotional page.
    pub fn promo() -> Self {
        let section = |id: &str, content| SectionLayout {
            id: id.to_string(),
            offset_top: None,
            content,
        };

        Self {
            viewport_width: 1280.0,
            navbar: true,
            nav_links: vec![
                link("Home", "#home"),
                link("About", "#about"),
                link("Members", "#members"),
                link("Gallery", "#gallery"),
                link("Shows", "#shows"),
                link("Support", "#support"),
            ],
            menu_toggle: true,
            particles: true,
            hero: true,
            sections: vec![
                section(
                    "about",
                    SectionContent::Text {
                        body: "Five masked performers, one stage.".to_string(),
                    },
                ),
                section(
                    "members",
                    SectionContent::Members {
                        members: ["Aoi", "Rin", "Mei", "Yuna", "Kira"]
                            .iter()
                            .map(|m| m.to_string())
                            .collect(),
                    },
                ),
                section(
                    "gallery",
                    SectionContent::Gallery {
                        filters: vec![
                            FILTER_ALL.to_string(),
                            "live".to_string(),
                            "backstage".to_string(),
                            "photoshoot".to_string(),
                        ],
                        items: vec![
                            media("live", "images/live-1.jpg", "Debut live"),
                            media("live", "images/live-2.jpg", "Summer tour"),
                            media("backstage", "images/backstage-1.jpg", "Rehearsal"),
                            media("photoshoot", "images/shoot-1.jpg", "Mask portraits"),
                            media("photoshoot", "images/shoot-2.jpg", "Group shot"),
                            media("live", "images/live-3.jpg", "Encore"),
                        ],
                    },
                ),
                section(
                    "shows",
                    SectionContent::Shows {
                        posters: vec![
                            media("", "images/poster-spring.jpg", "Spring show"),
                            media("", "images/poster-winter.jpg", "Winter show"),
                        ],
                    },
                ),
                section(
                    "support",
                    SectionContent::Text {
                        body: "Help the group reach the next stage.".to_string(),
                    },
                ),
            ],
            donation_modal: true,
            footer_year: true,
        }
    }

    /// Parse and validate a layout document.
    pub fn from_json(json: &str) -> StageResult<Self> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> StageResult<()> {
        if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
            return Err(StageError::InvalidLayout(format!(
                "viewport_width must be positive, got {}",
                self.viewport_width
            )));
        }

        let mut ids = HashSet::new();
        if self.hero {
            ids.insert("home");
        }
        for section in &self.sections {
            if section.id.trim().is_empty() {
                return Err(StageError::InvalidLayout(
                    "section id must not be empty".to_string(),
                ));
            }
            if !ids.insert(section.id.as_str()) {
                return Err(StageError::InvalidLayout(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
            if let SectionContent::Gallery { items, .. } = &section.content {
                if let Some(item) = items.iter().find(|i| i.category.trim().is_empty()) {
                    return Err(StageError::InvalidLayout(format!(
                        "gallery item '{}' has no category",
                        item.src
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the document this layout describes.
    pub fn build(&self) -> MemoryDom {
        let mut dom = MemoryDom::new(self.viewport_width);
        let body = dom.body();

        if self.navbar {
            let nav = dom.element("nav").id("navbar").class("navbar").append_to(body);
            dom.element("a").class("logo").attr("href", "#home").text("PROJECT IDOL").append_to(nav);
            let links = dom.element("ul").class("nav-links").append_to(nav);
            for nav_link in &self.nav_links {
                let item = dom.element("li").append_to(links);
                dom.element("a")
                    .attr("href", &nav_link.href)
                    .text(&nav_link.label)
                    .append_to(item);
            }
            if self.menu_toggle {
                let toggle = dom.element("div").class("menu-toggle").append_to(nav);
                for _ in 0..3 {
                    dom.element("span").append_to(toggle);
                }
            }
        }

        if self.particles {
            dom.element("div").id("particles").class("particles").append_to(body);
        }

        let mut top = 0.0;
        if self.hero {
            let hero = dom.element("section").id("home").class("hero").offset_top(top).append_to(body);
            dom.element("h1").class("hero-title").text("PROJECT IDOL").append_to(hero);
            dom.element("a")
                .class("cta-button")
                .attr("href", "#members")
                .text("Meet the members")
                .append_to(hero);
            top += SECTION_HEIGHT;
        }

        for section in &self.sections {
            let offset = section.offset_top.unwrap_or(top);
            let node = dom
                .element("section")
                .id(&section.id)
                .class("fade-section")
                .offset_top(offset)
                .append_to(body);
            build_content(&mut dom, node, &section.content);
            top = offset + SECTION_HEIGHT;
        }

        if self.donation_modal {
            let support = dom.element("div").class("donate-cta").append_to(body);
            dom.element("button").class("donate-btn").text("Donate").append_to(support);

            let modal = dom.element("div").id(MODAL_ID).class("modal").append_to(body);
            let content = dom.element("div").class("modal-content").append_to(modal);
            dom.element("span").class("modal-close").text("\u{00d7}").append_to(content);
            dom.element("h2").text("Support Project Idol").append_to(content);
        }

        if self.footer_year {
            let footer = dom.element("footer").class("footer").append_to(body);
            let line = dom.element("p").text("\u{00a9} ").append_to(footer);
            dom.element("span").class("current-year").append_to(line);
        }

        dom
    }
}

fn build_content(dom: &mut MemoryDom, section: NodeId, content: &SectionContent) {
    match content {
        SectionContent::Members { members } => {
            let grid = dom.element("div").class("members-grid").append_to(section);
            for name in members {
                let card = dom.element("div").class("member-card").append_to(grid);
                dom.element("div").class("member-mask").append_to(card);
                dom.element("h3").text(name).append_to(card);
            }
        }
        SectionContent::Gallery { filters, items } => {
            let bar = dom.element("div").class("gallery-filters").append_to(section);
            for filter in filters {
                dom.element("button")
                    .class("filter-btn")
                    .attr("data-filter", filter)
                    .text(filter)
                    .append_to(bar);
            }
            let gallery = dom.element("div").class("gallery").append_to(section);
            for item in items {
                let tile = dom
                    .element("div")
                    .class("gallery-item")
                    .attr("data-category", &item.category)
                    .append_to(gallery);
                dom.element("img")
                    .attr("src", &item.src)
                    .attr("alt", &item.alt)
                    .append_to(tile);
            }
        }
        SectionContent::Shows { posters } => {
            let grid = dom.element("div").class("shows-grid").append_to(section);
            for poster in posters {
                let tile = dom.element("div").class("poster-item").append_to(grid);
                dom.element("img")
                    .attr("src", &poster.src)
                    .attr("alt", &poster.alt)
                    .append_to(tile);
            }
        }
        SectionContent::Text { body } => {
            dom.element("p").text(body).append_to(section);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promo_builds_expected_markup() {
        let dom = PageLayout::promo().build();
        assert!(dom.element_by_id("navbar").is_some());
        assert!(dom.query(".hero").is_some());
        assert_eq!(dom.query_all(".fade-section").len(), 5);
        assert_eq!(dom.query_all(".member-card").len(), 5);
        assert_eq!(dom.query_all(".gallery-item").len(), 6);
        assert_eq!(dom.query_all(".poster-item").len(), 2);
        assert_eq!(dom.query_all(r##"a[href^="#"]"##).len(), 8);
        assert!(dom.element_by_id(MODAL_ID).is_some());
    }

    #[test]
    fn test_sections_stack_below_hero() {
        let dom = PageLayout::promo().build();
        let about = dom.element_by_id("about").unwrap();
        let members = dom.element_by_id("members").unwrap();
        assert_eq!(dom.offset_top(about), SECTION_HEIGHT);
        assert_eq!(dom.offset_top(members), 2.0 * SECTION_HEIGHT);
    }

    #[test]
    fn test_json_roundtrip_keeps_sections() {
        let json = serde_json::to_string(&PageLayout::promo()).unwrap();
        assert!(json.contains(r#""kind":"gallery""#));
        let parsed = PageLayout::from_json(&json).unwrap();
        assert_eq!(parsed, PageLayout::promo());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{
            "sections": [
                {"id": "a", "kind": "text", "body": "x"},
                {"id": "a", "kind": "text", "body": "y"}
            ]
        }"#;
        let err = PageLayout::from_json(json).unwrap_err();
        assert!(matches!(err, StageError::InvalidLayout(_)));
    }

    #[test]
    fn test_uncategorised_gallery_item_rejected() {
        let json = r#"{
            "sections": [
                {"id": "g", "kind": "gallery", "filters": ["all"],
                 "items": [{"src": "a.jpg"}]}
            ]
        }"#;
        assert!(PageLayout::from_json(json).is_err());
    }

    #[test]
    fn test_minimal_layout_defaults() {
        let layout = PageLayout::from_json("{}").unwrap();
        assert_eq!(layout.viewport_width, 1280.0);
        assert!(layout.sections.is_empty());
    }
}
