#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Chatbox swarm overlay: speech bubbles drifting across a pixelated canvas,
//! cloud images popping in and HUD scanners that hunt them down.
//!
//! The simulation is plain Rust and runs on any target; the browser glue
//! lives in the wasm32-only `wasm` module.

pub mod chatbox;
pub mod cloud;
pub mod config;
pub mod draw;
pub mod geometry;
pub mod overlay;
pub mod scanner;
pub mod spawn;

pub use config::{BubbleStyle, IntroDurations, OverlayControls, OverlayParams};
pub use overlay::{Overlay, OverlayEvent};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod controls;
    mod dom;
    mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Debug).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        dom::setup_homepage(&document)?;
        render::start(window, document)?;
        log::info!("chatbox overlay started");
        Ok(())
    }
}
