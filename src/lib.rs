//! Project Idol Browser Front-end
//!
//! Mounts the `idolstage-core` view controller on the live page. Compiled to
//! WebAssembly and loaded by the site's HTML:
//!
//! ```html
//! <script type="module">
//!   import init from "./pkg/idolstage.js";
//!   init();
//! </script>
//! ```
//!
//! On native targets only the [`slots`] arena is built; use `idolstage-cli`
//! to drive the controller headlessly.

#[cfg(target_arch = "wasm32")]
mod console_layer;
#[cfg(target_arch = "wasm32")]
mod driver;
pub mod slots;
#[cfg(target_arch = "wasm32")]
mod web_dom;

#[cfg(target_arch = "wasm32")]
pub use driver::StageHost;
#[cfg(target_arch = "wasm32")]
pub use web_dom::WebDom;

#[cfg(target_arch = "wasm32")]
mod entry {
    use std::cell::RefCell;
    use std::rc::Rc;

    use idolstage_core::StageConfig;
    use tracing::Level;
    use wasm_bindgen::prelude::*;

    use crate::console_layer;
    use crate::driver::StageHost;

    thread_local! {
        static HOST: RefCell<Option<Rc<StageHost>>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let _ = console_layer::init(Level::INFO);

        let host = StageHost::start(StageConfig::default())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        HOST.with(|slot| *slot.borrow_mut() = Some(host));
        Ok(())
    }
}
