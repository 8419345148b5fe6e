//! Turns overlay state into 2D canvas calls.
//!
//! Everything goes through [`Surface`], so the drawing code runs against a
//! recorder in tests and against `CanvasRenderingContext2d` in the browser.

use crate::chatbox::Chatbox;
use crate::config::{BubbleStyle, OverlayControls};
use crate::overlay::Overlay;

pub const CUSTOM_FONT: &str = "Epmarugo";
pub const FALLBACK_FONT: &str = "monospace";

const BASE_CARET_SIZE: f64 = 20.0;
const BASE_CARET_OFFSET: f64 = 32.0;

const FF7_STOPS: &[(f64, &str)] = &[(0.0, "#1e3a5f"), (0.5, "#0f1f3d"), (1.0, "#061426")];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(&'static str),
    /// Top-to-bottom gradient between `y0` and `y1`.
    Vertical {
        y0: f64,
        y1: f64,
        stops: &'static [(f64, &'static str)],
    },
}

/// The subset of the canvas 2D API the overlay needs.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn set_fill(&mut self, paint: Paint);
    fn set_stroke(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn begin_path(&mut self);
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn set_font(&mut self, font: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    fn measure_text(&mut self, text: &str) -> f64;
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

fn line_width(base: f64, pixel_scale: f64) -> f64 {
    (base / pixel_scale).round().max(1.0)
}

/// Clears the canvas, then draws connectors and bubbles.
pub fn draw_frame<S: Surface>(
    surface: &mut S,
    overlay: &Overlay,
    controls: &OverlayControls,
    font_loaded: bool,
) {
    let viewport = overlay.viewport();
    surface.clear(viewport.canvas_width(), viewport.canvas_height());

    let scale = viewport.pixel_scale;
    let boxes = overlay.chatboxes();
    draw_connections(surface, boxes, controls.connection_distance(), scale);

    let family = if font_loaded { CUSTOM_FONT } else { FALLBACK_FONT };
    for chatbox in boxes {
        draw_bubble(surface, chatbox, controls.style, scale, family);
    }
}

/// Straight lines between box centers closer than `max_distance`.
pub fn draw_connections<S: Surface>(
    surface: &mut S,
    boxes: &[Chatbox],
    max_distance: f64,
    pixel_scale: f64,
) {
    surface.set_stroke("black");
    surface.set_line_width(line_width(2.0, pixel_scale));

    for (i, a) in boxes.iter().enumerate() {
        let (ax, ay) = a.center();
        for b in &boxes[i + 1..] {
            let (bx, by) = b.center();
            if crate::geometry::distance(ax, ay, bx, by) < max_distance {
                surface.begin_path();
                surface.move_to(ax, ay);
                surface.line_to(bx, by);
                surface.stroke();
            }
        }
    }
}

pub fn draw_bubble<S: Surface>(
    surface: &mut S,
    chatbox: &Chatbox,
    style: BubbleStyle,
    pixel_scale: f64,
    family: &str,
) {
    let Chatbox {
        x, y, width, height, ..
    } = *chatbox;
    let caret = BASE_CARET_SIZE / pixel_scale;
    let caret_x = x + BASE_CARET_OFFSET / pixel_scale;
    let caret_y = y + height;

    match style {
        BubbleStyle::Ff7 => {
            surface.set_fill(Paint::Vertical {
                y0: y,
                y1: y + height,
                stops: FF7_STOPS,
            });
            surface.set_stroke("#4a6fa5");
            surface.set_line_width(line_width(2.0, pixel_scale));
        }
        BubbleStyle::Classic => {
            surface.set_fill(Paint::Solid("white"));
            surface.set_stroke("black");
            surface.set_line_width(line_width(4.0, pixel_scale));
        }
    }

    // box and caret filled as one shape
    surface.begin_path();
    surface.rect(x, y, width, height);
    surface.move_to(caret_x - caret, caret_y);
    surface.line_to(caret_x + caret, caret_y);
    surface.line_to(caret_x, caret_y + caret);
    surface.close_path();
    surface.fill();

    // outline, leaving the gap where the caret joins
    surface.begin_path();
    surface.move_to(x, y);
    surface.line_to(x + width, y);
    surface.line_to(x + width, y + height);
    surface.line_to(caret_x + caret, caret_y);
    surface.move_to(caret_x - caret, caret_y);
    surface.line_to(x, caret_y);
    surface.line_to(x, y);
    surface.stroke();

    surface.begin_path();
    surface.move_to(caret_x - caret, caret_y);
    surface.line_to(caret_x, caret_y + caret);
    surface.line_to(caret_x + caret, caret_y);
    surface.stroke();

    let ink = match style {
        BubbleStyle::Ff7 => "white",
        BubbleStyle::Classic => "black",
    };
    surface.set_fill(Paint::Solid(ink));
    surface.set_text_baseline("middle");
    draw_label(surface, chatbox, family);
}

fn font(bold: bool, size: f64, family: &str) -> String {
    let weight = if bold { "bold" } else { "normal" };
    format!("{weight} {size}px {family}")
}

/// Centered styled runs, shrunk to fit 90% of the box width.
fn draw_label<S: Surface>(surface: &mut S, chatbox: &Chatbox, family: &str) {
    let base_size = chatbox.height * 0.4;

    let mut total = 0.0;
    for fragment in &chatbox.fragments {
        surface.set_font(&font(fragment.bold, base_size * fragment.size_multiplier, family));
        total += surface.measure_text(fragment.text);
    }

    let max_width = chatbox.width * 0.9;
    let fit = if total > max_width { max_width / total } else { 1.0 };

    let mut pen = chatbox.x + (chatbox.width - total * fit) / 2.0;
    let text_y = chatbox.y + chatbox.height / 2.0;
    for fragment in &chatbox.fragments {
        let size = base_size * fragment.size_multiplier * fit;
        surface.set_font(&font(fragment.bold, size, family));
        surface.fill_text(fragment.text, pen, text_y);
        pen += surface.measure_text(fragment.text);
    }
}
