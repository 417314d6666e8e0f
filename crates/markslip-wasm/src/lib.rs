mod api;
mod browser;
mod logging;
mod session;

pub use api::MarkslipApp;

use wasm_bindgen::prelude::*;

/// Install the panic hook and route tracing output to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
}
