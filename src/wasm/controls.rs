//! Page-facing setters for the per-frame controls. The render loop copies
//! the current values at the start of every tick.

use std::cell::Cell;

use wasm_bindgen::prelude::*;

use crate::config::{BubbleStyle, OverlayControls};

thread_local! {
    static CONTROLS: Cell<OverlayControls> = Cell::new(OverlayControls::default());
}

pub(super) fn current() -> OverlayControls {
    CONTROLS.with(Cell::get)
}

fn update(f: impl FnOnce(&mut OverlayControls)) {
    CONTROLS.with(|cell| {
        let mut controls = cell.get();
        f(&mut controls);
        cell.set(controls);
    });
}

#[wasm_bindgen]
pub fn set_chatbox_speed(speed: f64) {
    update(|c| c.speed = speed.max(0.0));
}

/// Slider value; the connector range is twelve times this.
#[wasm_bindgen]
pub fn set_connection_distance(range: f64) {
    update(|c| c.connection_range = Some(range.max(0.0)));
}

#[wasm_bindgen]
pub fn set_clouds_enabled(enabled: bool) {
    update(|c| c.clouds_enabled = enabled);
    log::info!("cloud spawning {}", if enabled { "enabled" } else { "disabled" });
}

/// `"ff7"` for the gradient theme, anything else for the classic one.
#[wasm_bindgen]
pub fn set_bubble_style(name: &str) {
    update(|c| c.style = BubbleStyle::from_name(name));
}
