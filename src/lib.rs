// Drag-and-drop book tree editor glue for the wiki Bookmaker page.
//
// Off-browser builds only compile the controller for its unit tests.
#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod api;
mod config;
mod controller;
mod dom;
mod form;
mod models;
mod tree;
mod util;
#[cfg(target_arch = "wasm32")]
mod web;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    if let Err(e) = web::mount() {
        leptos::logging::error!("[Bookmaker] {}", e);
    }
}
