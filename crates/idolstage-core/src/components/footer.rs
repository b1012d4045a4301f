//! Footer copyright year.

use crate::context::StageContext;
use crate::dom::Dom;

/// Write `year` into every `.current-year` element. Returns how many were stamped.
pub fn stamp_year<D: Dom>(cx: &mut StageContext<D>, year: i32) -> usize {
    let slots = cx.dom.query_all(".current-year");
    let text = year.to_string();
    for slot in &slots {
        cx.dom.set_text(*slot, &text);
    }
    slots.len()
}
