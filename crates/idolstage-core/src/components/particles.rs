//! Floating mask particles behind the hero.

use rand::Rng;

use crate::context::StageContext;
use crate::dom::Dom;
use crate::styles;

/// Fill `#particles` with randomly placed particles. Returns how many were added.
pub fn spawn<D: Dom, R: Rng>(cx: &mut StageContext<D>, rng: &mut R) -> usize {
    let Some(container) = cx.dom.element_by_id("particles") else {
        return 0;
    };

    let width = cx.dom.viewport_width();
    let markup = styles::particle_svg();

    for _ in 0..cx.config.particle_count {
        let left = rng.random::<f64>() * width;
        let delay = rng.random::<f64>() * 10.0;
        let duration = rng.random::<f64>() * 10.0 + 10.0;

        let particle = cx.dom.create_element("div");
        cx.dom.add_class(particle, "particle");
        cx.dom.set_styles(
            particle,
            &[
                ("left", &format!("{}px", left)),
                ("animation-delay", &format!("{}s", delay)),
                ("animation-duration", &format!("{}s", duration)),
            ],
        );
        cx.dom.set_markup(particle, &markup);
        cx.dom.append_child(container, particle);
    }

    cx.config.particle_count
}
