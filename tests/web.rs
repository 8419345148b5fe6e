#![cfg(target_arch = "wasm32")]

use swarm_wasm::{Overlay, OverlayControls, OverlayParams};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn overlay_ticks_on_browser_clock() {
    let window = web_sys::window().unwrap();
    let performance = window.performance().unwrap();
    let now = performance.now();

    let mut overlay = Overlay::new(OverlayParams::default(), 1024.0, 768.0, 99, now).unwrap();
    overlay.seed_chatboxes(now);
    let seeded = overlay.chatboxes().len();

    let controls = OverlayControls::default();
    for frame in 1..=30 {
        overlay.tick(now + frame as f64 * 16.0, &controls);
    }
    assert_eq!(overlay.scanners().len(), 3);
    assert!(overlay.chatboxes().len() >= seeded);
    // bootstrap cloud after 100 ms
    assert_eq!(overlay.clouds().len(), 1);
}

#[wasm_bindgen_test]
fn canvas_2d_context_available() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    let ctx = canvas.get_context("2d").unwrap();
    assert!(ctx.is_some());
}
