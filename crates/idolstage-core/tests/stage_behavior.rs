//! End-to-end controller behavior against the in-memory document
//!
//! Each test mounts a stage over a built layout, feeds it signals and moves
//! the simulated clock forward.

use std::time::Duration;

use idolstage_core::{
    Dom, Handler, Key, LockOwner, MemoryDom, OverlayPhase, PageLayout, SectionContent,
    SectionLayout, Signal, Stage, StageConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn mounted(layout: &PageLayout) -> Stage<MemoryDom> {
    let mut stage = Stage::new(layout.build(), StageConfig::default()).unwrap();
    stage.mount(2026, &mut StdRng::seed_from_u64(42));
    stage
}

fn promo() -> Stage<MemoryDom> {
    mounted(&PageLayout::promo())
}

fn members_only(names: &[&str]) -> PageLayout {
    PageLayout {
        sections: vec![SectionLayout {
            id: "members".to_string(),
            offset_top: None,
            content: SectionContent::Members {
                members: names.iter().map(|n| n.to_string()).collect(),
            },
        }],
        ..PageLayout::default()
    }
}

fn click(stage: &mut Stage<MemoryDom>, selector: &str) -> idolstage_core::DispatchOutcome {
    let target = stage
        .dom()
        .query(selector)
        .unwrap_or_else(|| panic!("no element for {selector}"));
    stage.dispatch(Signal::Click { target })
}

fn body_overflow(stage: &Stage<MemoryDom>) -> Option<String> {
    let body = stage.dom().body();
    stage.dom().style(body, "overflow")
}

// ============================================================================
// Scroll
// ============================================================================

#[test]
fn test_scroll_sequence_drives_navbar() {
    let mut stage = promo();
    let navbar = stage.dom().element_by_id("navbar").unwrap();
    let hero = stage.dom().query(".hero").unwrap();

    stage.dispatch(Signal::Scroll { offset: 0.0 });
    assert!(!stage.dom().has_class(navbar, "scrolled"));
    assert_eq!(stage.dom().style(navbar, "transform").as_deref(), Some("translateY(0)"));

    stage.dispatch(Signal::Scroll { offset: 60.0 });
    assert!(stage.dom().has_class(navbar, "scrolled"));
    assert_eq!(stage.dom().style(navbar, "transform").as_deref(), Some("translateY(0)"));

    stage.dispatch(Signal::Scroll { offset: 200.0 });
    assert!(stage.dom().has_class(navbar, "scrolled"));
    assert_eq!(
        stage.dom().style(navbar, "transform").as_deref(),
        Some("translateY(-100%)")
    );

    stage.dispatch(Signal::Scroll { offset: 150.0 });
    assert!(stage.dom().has_class(navbar, "scrolled"));
    assert_eq!(stage.dom().style(navbar, "transform").as_deref(), Some("translateY(0)"));
    assert_eq!(stage.dom().style(hero, "transform").as_deref(), Some("translateY(75px)"));
    assert_eq!(stage.navbar().last_scroll_top, 150.0);
}

// ============================================================================
// Reveal
// ============================================================================

#[test]
fn test_member_cards_reveal_staggered() {
    let mut stage = mounted(&members_only(&["Aoi", "Rin", "Mei"]));
    let section = stage.dom().element_by_id("members").unwrap();
    let cards = stage.dom().query_all(".member-card");
    assert_eq!(cards.len(), 3);

    for card in &cards {
        assert_eq!(stage.dom().style(*card, "opacity").as_deref(), Some("0"));
    }

    stage.dispatch(Signal::Intersection {
        target: section,
        intersecting: true,
    });
    assert!(stage.dom().has_class(section, "visible"));

    let opacity = |stage: &Stage<MemoryDom>, i: usize| stage.dom().style(cards[i], "opacity");

    stage.advance(Duration::ZERO);
    assert_eq!(opacity(&stage, 0).as_deref(), Some("1"));
    assert_eq!(opacity(&stage, 1).as_deref(), Some("0"));

    stage.advance(ms(99));
    assert_eq!(opacity(&stage, 1).as_deref(), Some("0"));

    stage.advance(ms(1));
    assert_eq!(opacity(&stage, 1).as_deref(), Some("1"));
    assert_eq!(opacity(&stage, 2).as_deref(), Some("0"));

    stage.advance(ms(100));
    for card in &cards {
        assert_eq!(stage.dom().style(*card, "opacity").as_deref(), Some("1"));
        assert_eq!(stage.dom().style(*card, "transform").as_deref(), Some("translateY(0)"));
    }
}

#[test]
fn test_section_reveals_once() {
    let mut stage = mounted(&members_only(&["Aoi"]));
    let section = stage.dom().element_by_id("members").unwrap();

    stage.dispatch(Signal::Intersection {
        target: section,
        intersecting: false,
    });
    assert!(!stage.dom().has_class(section, "visible"));

    stage.dispatch(Signal::Intersection {
        target: section,
        intersecting: true,
    });
    stage.settle();
    stage.dispatch(Signal::Intersection {
        target: section,
        intersecting: true,
    });
    assert_eq!(stage.reveal().revealed_count(), 1);
    assert_eq!(stage.next_deadline(), None);
}

#[test]
fn test_gallery_items_wait_for_section_reveal() {
    let mut stage = promo();
    stage.advance(ms(50));

    for item in stage.dom().query_all(".gallery-item") {
        let live = stage.dom().attribute(item, "data-category").as_deref() == Some("live");
        let display = if live { "block" } else { "none" };
        assert_eq!(stage.dom().style(item, "display").as_deref(), Some(display));
        assert_eq!(stage.dom().style(item, "opacity").as_deref(), Some("0"));
        assert_eq!(stage.dom().style(item, "transform").as_deref(), Some("translateY(20px)"));
    }
}

#[test]
fn test_gallery_items_reveal_staggered() {
    let mut stage = promo();
    let section = stage.dom().element_by_id("gallery").unwrap();
    let shown = stage.gallery().visible_nodes();
    let hidden = stage.gallery().hidden_nodes();
    assert_eq!(shown.len(), 3);
    assert_eq!(hidden.len(), 3);

    stage.dispatch(Signal::Intersection {
        target: section,
        intersecting: true,
    });
    let opacity = |stage: &Stage<MemoryDom>, i: usize| stage.dom().style(shown[i], "opacity");

    stage.advance(Duration::ZERO);
    assert_eq!(opacity(&stage, 0).as_deref(), Some("1"));
    assert_eq!(opacity(&stage, 1).as_deref(), Some("0"));

    stage.advance(ms(100));
    assert_eq!(opacity(&stage, 1).as_deref(), Some("1"));
    assert_eq!(opacity(&stage, 2).as_deref(), Some("0"));

    stage.advance(ms(100));
    assert_eq!(opacity(&stage, 2).as_deref(), Some("1"));

    stage.settle();
    for item in &shown {
        assert_eq!(stage.dom().style(*item, "transform").as_deref(), Some("translateY(0)"));
    }
    for item in &hidden {
        assert_eq!(stage.dom().style(*item, "display").as_deref(), Some("none"));
        assert_eq!(stage.dom().style(*item, "opacity").as_deref(), Some("0"));
    }
}

#[test]
fn test_plain_section_reveal_schedules_nothing() {
    let mut stage = promo();
    let about = stage.dom().element_by_id("about").unwrap();
    assert_eq!(stage.next_deadline(), None);

    let revealed = stage.dispatch(Signal::Intersection {
        target: about,
        intersecting: true,
    });
    assert_eq!(revealed.handled, 1);
    assert!(stage.dom().has_class(about, "visible"));
    assert_eq!(stage.next_deadline(), None);
}

// ============================================================================
// Gallery
// ============================================================================

#[test]
fn test_default_filter_marks_button() {
    let stage = promo();
    assert_eq!(stage.gallery().active_filter(), "live");

    let active: Vec<_> = stage
        .dom()
        .query_all(".filter-btn")
        .into_iter()
        .filter(|b| stage.dom().has_class(*b, "active"))
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(
        stage.dom().attribute(active[0], "data-filter").as_deref(),
        Some("live")
    );
}

#[test]
fn test_apply_filter_twice_equals_once() {
    let mut once = promo();
    let mut twice = promo();

    once.apply_filter("live");
    twice.apply_filter("live");
    twice.apply_filter("live");
    assert_eq!(once.dom().outline(), twice.dom().outline());

    once.settle();
    twice.settle();
    assert_eq!(once.dom().outline(), twice.dom().outline());
    assert_eq!(once.gallery().visible_nodes(), twice.gallery().visible_nodes());
}

#[test]
fn test_filter_button_click_hides_after_transition() {
    let mut stage = promo();
    stage.settle();

    click(&mut stage, r#".filter-btn[data-filter="backstage"]"#);
    assert_eq!(stage.gallery().active_filter(), "backstage");

    let live = stage.dom().query(r#".gallery-item[data-category="live"]"#).unwrap();
    let backstage = stage
        .dom()
        .query(r#".gallery-item[data-category="backstage"]"#)
        .unwrap();

    assert_eq!(stage.dom().style(live, "opacity").as_deref(), Some("0"));
    assert_eq!(stage.dom().style(live, "display").as_deref(), Some("block"));
    assert_eq!(stage.dom().style(backstage, "display").as_deref(), Some("block"));

    stage.advance(ms(10));
    assert_eq!(stage.dom().style(backstage, "opacity").as_deref(), Some("1"));
    assert_eq!(stage.dom().style(backstage, "transform").as_deref(), Some("scale(1)"));

    stage.advance(ms(290));
    assert_eq!(stage.dom().style(live, "display").as_deref(), Some("none"));
}

#[test]
fn test_quick_refilter_does_not_hide_reshown_item() {
    let mut stage = promo();
    stage.settle();
    let live = stage.dom().query(r#".gallery-item[data-category="live"]"#).unwrap();

    stage.apply_filter("photoshoot");
    stage.advance(ms(100));
    stage.apply_filter("live");
    stage.settle();

    assert_eq!(stage.dom().style(live, "display").as_deref(), Some("block"));
    assert_eq!(stage.dom().style(live, "opacity").as_deref(), Some("1"));
}

// ============================================================================
// Lightbox
// ============================================================================

#[test]
fn test_lightbox_open_then_close_cleans_up() {
    let mut stage = promo();

    stage.open_lightbox("images/live-1.jpg", "Debut live");
    assert_eq!(stage.dom().query_all(".lightbox").len(), 1);
    assert_eq!(body_overflow(&stage).as_deref(), Some("hidden"));

    assert!(stage.close_lightbox());
    assert_eq!(body_overflow(&stage), None);

    stage.advance(ms(300));
    assert!(stage.dom().query_all(".lightbox").is_empty());
    assert!(!stage.scroll_lock().is_locked());
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Closed);
    assert_eq!(stage.listeners().count_handler(Handler::LightboxEscape), 0);
    assert_eq!(stage.listeners().count_handler(Handler::DismissLightbox), 0);
}

#[test]
fn test_gallery_click_opens_lightbox_with_image() {
    let mut stage = promo();
    let item = stage.dom().query(".gallery-item").unwrap();
    let img = stage.dom().query_one_within(item, "img").unwrap();

    stage.dispatch(Signal::Click { target: img });
    let overlay = stage.dom().query(".lightbox").unwrap();
    let shown = stage.dom().query_one_within(overlay, "img").unwrap();
    assert_eq!(
        stage.dom().attribute(shown, "src").as_deref(),
        Some("images/live-1.jpg")
    );
    assert_eq!(stage.dom().attribute(shown, "alt").as_deref(), Some("Debut live"));
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Opening);

    stage.advance(ms(10));
    assert!(stage.dom().has_class(overlay, "active"));
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Open);
}

#[test]
fn test_lightbox_dismiss_targets() {
    let mut stage = promo();
    let overlay = stage.open_lightbox("images/poster-spring.jpg", "Spring show");
    stage.advance(ms(10));

    let img = stage.dom().query_one_within(overlay, "img").unwrap();
    stage.dispatch(Signal::Click { target: img });
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Open);

    click(&mut stage, ".lightbox-close");
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Closing);
    stage.settle();
    assert!(stage.dom().query(".lightbox").is_none());
}

#[test]
fn test_lightbox_escape_ignores_other_keys() {
    let mut stage = promo();
    stage.open_lightbox("images/live-2.jpg", "Summer tour");

    stage.dispatch(Signal::KeyDown {
        key: Key::Other("ArrowLeft".to_string()),
    });
    assert!(stage.lightbox().phase().is_active());

    stage.dispatch(Signal::KeyDown { key: Key::Escape });
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Closing);
    assert_eq!(stage.listeners().count_handler(Handler::LightboxEscape), 0);
}

#[test]
fn test_reopen_while_closing_keeps_single_overlay() {
    let mut stage = promo();
    stage.open_lightbox("a.jpg", "");
    stage.close_lightbox();
    stage.advance(ms(100));

    stage.open_lightbox("b.jpg", "");
    assert_eq!(stage.dom().query_all(".lightbox").len(), 1);
    stage.settle();

    assert_eq!(stage.dom().query_all(".lightbox").len(), 1);
    assert_eq!(stage.lightbox().phase(), OverlayPhase::Open);
    assert!(stage.scroll_lock().holds(LockOwner::Lightbox));
}

#[test]
fn test_poster_click_opens_lightbox() {
    let mut stage = promo();
    click(&mut stage, ".poster-item");
    assert_eq!(
        stage.lightbox().current().map(|c| c.source_url.as_str()),
        Some("images/poster-spring.jpg")
    );
}

// ============================================================================
// Modal
// ============================================================================

#[test]
fn test_modal_escape_closes_exactly_once_across_cycles() {
    let mut stage = promo();

    for cycle in 1..=3 {
        click(&mut stage, ".donate-btn");
        assert!(stage.modal().is_open());
        assert_eq!(stage.listeners().count_handler(Handler::ModalEscape), 1);

        if cycle < 3 {
            click(&mut stage, ".modal-close");
        } else {
            let outcome = stage.dispatch(Signal::KeyDown { key: Key::Escape });
            assert_eq!(outcome.handled, 1);
        }
        assert!(!stage.modal().is_open());
        assert_eq!(stage.modal().closes(), cycle);
        assert_eq!(stage.listeners().count_handler(Handler::ModalEscape), 0);
    }

    let outcome = stage.dispatch(Signal::KeyDown { key: Key::Escape });
    assert_eq!(outcome.handled, 0);
    assert_eq!(stage.modal().closes(), 3);
}

#[test]
fn test_modal_backdrop_click_closes() {
    let mut stage = promo();
    stage.open_modal();

    let content = stage.dom().query(".modal-content").unwrap();
    let heading = stage.dom().query_one_within(content, "h2").unwrap();
    stage.dispatch(Signal::Click { target: heading });
    assert!(stage.modal().is_open());

    click(&mut stage, "#donationModal");
    assert!(!stage.modal().is_open());
}

#[test]
fn test_overlapping_overlays_share_scroll_lock() {
    let mut stage = promo();

    stage.open_modal();
    stage.open_lightbox("images/shoot-1.jpg", "Mask portraits");
    assert_eq!(
        stage.scroll_lock().owners(),
        vec![LockOwner::Lightbox, LockOwner::Modal]
    );

    stage.close_lightbox();
    stage.settle();
    assert_eq!(body_overflow(&stage).as_deref(), Some("hidden"));

    stage.close_modal();
    assert_eq!(body_overflow(&stage), None);
    assert!(!stage.scroll_lock().is_locked());
}

// ============================================================================
// Menu and navigation
// ============================================================================

#[test]
fn test_menu_toggle_twice_restores() {
    let mut stage = promo();
    let button = stage.dom().query(".menu-toggle").unwrap();
    let links = stage.dom().query(".nav-links").unwrap();

    click(&mut stage, ".menu-toggle");
    assert!(stage.menu().is_open());
    assert!(stage.dom().has_class(button, "active"));
    assert!(stage.dom().has_class(links, "active"));

    click(&mut stage, ".menu-toggle");
    assert!(!stage.menu().is_open());
    assert!(!stage.dom().has_class(button, "active"));
    assert!(!stage.dom().has_class(links, "active"));
}

#[test]
fn test_smooth_scroll_closes_open_menu() {
    let mut stage = promo();
    stage.toggle_menu();

    let outcome = click(&mut stage, r##"a[href="#gallery"]"##);
    assert!(outcome.prevent_default);
    assert!(!stage.menu().is_open());

    let gallery = stage.dom().element_by_id("gallery").unwrap();
    let expected = stage.dom().offset_top(gallery) - 80.0;
    assert_eq!(stage.dom().scroll_requests(), &[expected]);
}

#[test]
fn test_smooth_scroll_keeps_closed_menu_closed() {
    let mut stage = promo();
    let button = stage.dom().query(".menu-toggle").unwrap();
    let links = stage.dom().query(".nav-links").unwrap();
    assert!(!stage.menu().is_open());

    let outcome = click(&mut stage, r##"a[href="#gallery"]"##);
    assert!(outcome.prevent_default);
    assert_eq!(stage.dom().scroll_requests().len(), 1);
    assert!(!stage.menu().is_open());
    assert!(!stage.dom().has_class(button, "active"));
    assert!(!stage.dom().has_class(links, "active"));
}

#[test]
fn test_dangling_anchor_only_prevents_default() {
    let mut layout = PageLayout::promo();
    layout.nav_links.push(idolstage_core::NavLink {
        label: "Top".to_string(),
        href: "#".to_string(),
    });
    let mut stage = mounted(&layout);
    stage.toggle_menu();

    let outcome = click(&mut stage, r##"a[href="#"]"##);
    assert!(outcome.prevent_default);
    assert!(stage.menu().is_open());
    assert!(stage.dom().scroll_requests().is_empty());
}

// ============================================================================
// Loader, hover, footer
// ============================================================================

#[test]
fn test_loader_fades_then_detaches() {
    let mut stage = promo();
    let loader = stage.loader().node().unwrap();
    assert!(stage.loader().was_created());
    assert!(stage.dom().query_one_within(loader, ".loader-text").is_some());

    stage.dispatch(Signal::Load);
    stage.advance(ms(499));
    assert!(!stage.dom().has_class(loader, "hidden"));

    stage.advance(ms(1));
    assert!(stage.dom().has_class(loader, "hidden"));
    assert!(stage.dom().is_attached(loader));

    stage.advance(ms(500));
    assert!(!stage.dom().is_attached(loader));
    assert!(!stage.report().loader_attached);
    assert_eq!(stage.loader().node(), None);

    let again = stage.dispatch(Signal::Load);
    assert_eq!(again.handled, 1);
    assert_eq!(stage.next_deadline(), None);
}

#[test]
fn test_existing_loader_is_reused() {
    let mut dom = MemoryDom::default();
    let body = dom.body();
    let existing = dom.element("div").class("loader").append_to(body);

    let mut stage = Stage::new(dom, StageConfig::default()).unwrap();
    stage.mount(2026, &mut StdRng::seed_from_u64(0));
    assert_eq!(stage.loader().node(), Some(existing));
    assert_eq!(stage.dom().query_all(".loader").len(), 1);
}

#[test]
fn test_member_card_hover() {
    let mut stage = promo();
    let card = stage.dom().query(".member-card").unwrap();
    let name = stage.dom().query_one_within(card, "h3").unwrap();

    stage.dispatch(Signal::PointerEnter { target: card });
    assert_eq!(
        stage.dom().style(card, "transform").as_deref(),
        Some("translateY(-10px) scale(1.05)")
    );

    // pointer signals do not bubble
    stage.dispatch(Signal::PointerLeave { target: name });
    assert_eq!(
        stage.dom().style(card, "transform").as_deref(),
        Some("translateY(-10px) scale(1.05)")
    );

    stage.dispatch(Signal::PointerLeave { target: card });
    assert_eq!(
        stage.dom().style(card, "transform").as_deref(),
        Some("translateY(0) scale(1)")
    );
}

#[test]
fn test_mount_summary_for_promo() {
    let mut stage = Stage::new(PageLayout::promo().build(), StageConfig::default()).unwrap();
    let summary = stage.mount(2031, &mut StdRng::seed_from_u64(3));

    assert_eq!(summary.particles, 15);
    assert_eq!(summary.sections, 5);
    assert_eq!(summary.gallery_items, 6);
    assert_eq!(summary.filter_buttons, 4);
    assert_eq!(summary.lightbox_sources, 8);
    assert_eq!(summary.member_cards, 5);
    assert_eq!(summary.year_slots, 1);
    assert!(summary.modal);

    let year = stage.dom().query(".current-year").unwrap();
    assert_eq!(stage.dom().text(year), Some("2031"));
    assert!(stage.dom().query("style[data-idolstage]").is_some());
}
