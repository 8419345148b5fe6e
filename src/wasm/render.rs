use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, FontFace, HtmlCanvasElement, Window,
};

use super::controls;
use super::dom::DomLayer;
use crate::config::OverlayParams;
use crate::draw::{self, Paint, Surface, CUSTOM_FONT};
use crate::overlay::Overlay;

const FONT_SOURCE: &str = "url(assets/epmarugo.ttf)";

/// Canvas 2D context seen through [`Surface`].
struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn set_fill(&mut self, paint: Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(color),
            Paint::Vertical { y0, y1, stops } => {
                let gradient = self.ctx.create_linear_gradient(0.0, y0, 0.0, y1);
                for &(offset, color) in stops {
                    if let Err(e) = gradient.add_color_stop(offset as f32, color) {
                        log::error!("bad gradient stop {color}: {e:?}");
                    }
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
    }

    fn set_stroke(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.rect(x, y, w, h);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        // a failed run just leaves a gap in the label
        let _ = self.ctx.fill_text(text, x, y);
    }
}

fn viewport_size(document: &Document) -> (f64, f64) {
    document
        .document_element()
        .map(|root| (root.client_width() as f64, root.client_height() as f64))
        .unwrap_or((0.0, 0.0))
}

/// Backing store at `1/pixel_scale` resolution, stretched to the viewport.
fn fit_canvas(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    (width, height): (f64, f64),
    pixel_scale: f64,
) -> Result<(), JsValue> {
    canvas.set_width((width / pixel_scale).floor() as u32);
    canvas.set_height((height / pixel_scale).floor() as u32);
    let style = canvas.style();
    style.set_property("width", &format!("{width}px"))?;
    style.set_property("height", &format!("{height}px"))?;
    // resizing resets context state
    ctx.set_image_smoothing_enabled(false);
    Ok(())
}

fn create_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    let style = canvas.style();
    for (name, value) in [
        ("position", "fixed"),
        ("top", "0"),
        ("left", "0"),
        ("pointer-events", "none"),
        ("z-index", "100"),
        ("image-rendering", "pixelated"),
        ("overflow", "hidden"),
    ] {
        style.set_property(name, value)?;
    }
    document.body().ok_or("no body")?.append_child(&canvas)?;
    Ok(canvas)
}

/// Starts loading the label font. The returned flag flips to `true` once it
/// is usable; on failure it stays `false` and labels use monospace.
fn load_custom_font(document: &Document) -> Rc<Cell<bool>> {
    let loaded = Rc::new(Cell::new(false));

    let face = match FontFace::new_with_str(CUSTOM_FONT, FONT_SOURCE) {
        Ok(face) => face,
        Err(e) => {
            log::warn!("custom font unavailable: {e:?}");
            return loaded;
        }
    };
    let promise = match face.load() {
        Ok(promise) => promise,
        Err(e) => {
            log::warn!("custom font failed to load: {e:?}");
            return loaded;
        }
    };

    let flag = loaded.clone();
    let fonts = document.fonts();
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(_) => match fonts.add(&face) {
                Ok(_) => {
                    flag.set(true);
                    log::info!("custom font {CUSTOM_FONT} loaded");
                }
                Err(e) => log::warn!("custom font could not be registered: {e:?}"),
            },
            Err(e) => log::warn!("custom font failed to load: {e:?}"),
        }
    });
    loaded
}

/// Builds the overlay, hooks window resize and runs the animation loop.
pub fn start(window: Window, document: Document) -> Result<(), JsValue> {
    let params = OverlayParams::default();
    let pixel_scale = params.pixel_scale;

    let canvas = create_canvas(&document)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or("2d canvas not supported")?
        .dyn_into()?;

    let size = Rc::new(Cell::new(viewport_size(&document)));
    fit_canvas(&canvas, &ctx, size.get(), pixel_scale)?;

    let font_loaded = load_custom_font(&document);

    let performance = window.performance().ok_or("no performance clock")?;
    let now = performance.now();
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let (width, height) = size.get();
    let mut overlay = Overlay::new(params, width, height, seed, now)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    overlay.seed_chatboxes(now);
    let mut dom = DomLayer::new(document.clone(), &overlay)?;

    // Resize canvas to fit window
    let resize_closure = {
        let canvas = canvas.clone();
        let ctx = ctx.clone();
        let size = size.clone();
        let document = document.clone();
        Closure::wrap(Box::new(move || {
            let viewport = viewport_size(&document);
            size.set(viewport);
            if let Err(e) = fit_canvas(&canvas, &ctx, viewport, pixel_scale) {
                log::error!("resize failed: {e:?}");
            }
        }) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();

    // Animation loop
    // `f` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. Storing it inside an `Option`
    // allows us to create the `Closure` first and then obtain a reference to
    // it from within itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let mut surface = CanvasSurface { ctx };
    let frame_window = window.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = performance.now();
        let controls = controls::current();

        let (width, height) = size.get();
        if overlay.viewport().width != width || overlay.viewport().height != height {
            overlay.resize(width, height);
        }

        let events = overlay.tick(now, &controls);
        dom.apply(&events, &overlay);
        dom.sync(&overlay);
        draw::draw_frame(&mut surface, &overlay, &controls, font_loaded.get());

        // schedule next
        if let Some(next) = f.borrow().as_ref() {
            if let Err(e) = frame_window.request_animation_frame(next.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {e:?}");
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(first) = g.borrow().as_ref() {
        window.request_animation_frame(first.as_ref().unchecked_ref())?;
    }

    Ok(())
}
