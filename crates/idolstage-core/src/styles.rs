//! Markup and CSS the controller injects at runtime.

use crate::context::StageContext;
use crate::dom::{Dom, NodeId};

/// Attribute marking the injected `<style>` element
pub const STYLE_MARKER: &str = "data-idolstage";

/// Mask silhouette used by the particles and the loader
pub const MASK_PATH: &str = "M50 10 L30 30 L20 50 L30 70 L50 80 L70 70 L80 50 L70 30 Z";

pub fn particle_svg() -> String {
    format!(
        r#"<svg width="20" height="20" fill="rgba(139, 92, 246, 0.3)" viewBox="0 0 100 100"><path d="{}"/></svg>"#,
        MASK_PATH
    )
}

pub fn loader_mask_svg() -> String {
    format!(
        r##"<svg class="loader-mask" viewBox="0 0 100 100" fill="#8b5cf6"><path d="{}" stroke="currentColor" stroke-width="2"/></svg>"##,
        MASK_PATH
    )
}

/// Lightbox visuals, so the overlay works without stylesheet support
pub const LIGHTBOX_STYLES: &str = r#"
.lightbox {
    position: fixed;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    background: rgba(10, 10, 10, 0.95);
    display: flex;
    justify-content: center;
    align-items: center;
    z-index: 2000;
    opacity: 0;
    transition: opacity 0.3s ease;
}

.lightbox.active {
    opacity: 1;
}

.lightbox-content {
    position: relative;
    max-width: 90%;
    max-height: 90%;
}

.lightbox-content img {
    max-width: 100%;
    max-height: 85vh;
    width: auto;
    height: auto;
    display: block;
    object-fit: contain;
    border: 2px solid var(--primary-purple);
    border-radius: 10px;
    box-shadow: 0 0 50px rgba(139, 92, 246, 0.5);
}

.lightbox-close {
    position: absolute;
    top: -40px;
    right: 0;
    color: var(--primary-purple);
    font-size: 40px;
    cursor: pointer;
    transition: all 0.3s ease;
}

.lightbox-close:hover {
    color: var(--accent-purple);
    transform: scale(1.2);
}
"#;

/// Append the lightbox `<style>` block to `<head>` once.
pub fn inject<D: Dom>(cx: &mut StageContext<D>) -> NodeId {
    let marker = format!("style[{}]", STYLE_MARKER);
    if let Some(existing) = cx.dom.query(&marker) {
        return existing;
    }

    let style = cx.dom.create_element("style");
    cx.dom.set_attribute(style, STYLE_MARKER, "lightbox");
    cx.dom.set_text(style, LIGHTBOX_STYLES);
    let head = cx.dom.head();
    cx.dom.append_child(head, style);
    style
}
