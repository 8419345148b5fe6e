//! DOM side of the overlay: cloud `<img>` nodes and scanner frames.

use std::collections::HashMap;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlImageElement};

use crate::cloud::{CloudId, CloudImage};
use crate::geometry::Size;
use crate::overlay::{Overlay, OverlayEvent};
use crate::scanner::Scanner;

fn place(node: &HtmlElement, x: f64, y: f64, size: Size) -> Result<(), JsValue> {
    let style = node.style();
    style.set_property("left", &format!("{x}px"))?;
    style.set_property("top", &format!("{y}px"))?;
    style.set_property("width", &format!("{}px", size.width))?;
    style.set_property("height", &format!("{}px", size.height))?;
    Ok(())
}

/// Owns the positioned nodes and mirrors overlay state onto them.
pub(super) struct DomLayer {
    document: Document,
    clouds: HashMap<CloudId, HtmlImageElement>,
    scanners: Vec<HtmlElement>,
}

impl DomLayer {
    pub fn new(document: Document, overlay: &Overlay) -> Result<Self, JsValue> {
        let scanners = overlay
            .scanners()
            .iter()
            .map(|scanner| create_scanner(&document, scanner))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            document,
            clouds: HashMap::new(),
            scanners,
        })
    }

    /// Creates and removes nodes for this tick's events.
    pub fn apply(&mut self, events: &[OverlayEvent], overlay: &Overlay) {
        for event in events {
            match *event {
                OverlayEvent::CloudSpawned(id) => {
                    let Some(cloud) = overlay.cloud(id) else { continue };
                    match create_cloud(&self.document, cloud) {
                        Ok(img) => {
                            self.clouds.insert(id, img);
                        }
                        Err(e) => log::error!("could not add cloud {id:?}: {e:?}"),
                    }
                }
                OverlayEvent::CloudRemoved(id) => {
                    if let Some(img) = self.clouds.remove(&id) {
                        img.remove();
                    }
                }
                OverlayEvent::ScannerChanged(index) => {
                    let (Some(node), Some(scanner)) =
                        (self.scanners.get(index), overlay.scanners().get(index))
                    else {
                        continue;
                    };
                    if let Err(e) = mark_scanner(node, scanner) {
                        log::error!("scanner {index} status update failed: {e:?}");
                    }
                }
            }
        }
    }

    /// Writes positions and sizes of every live node.
    pub fn sync(&self, overlay: &Overlay) {
        for cloud in overlay.clouds() {
            if let Some(img) = self.clouds.get(&cloud.id) {
                if let Err(e) = place(img, cloud.x, cloud.y, cloud.size) {
                    log::error!("cloud {:?} placement failed: {e:?}", cloud.id);
                }
            }
        }
        for (node, scanner) in self.scanners.iter().zip(overlay.scanners()) {
            if let Err(e) = place(node, scanner.x, scanner.y, scanner.size) {
                log::error!("scanner placement failed: {e:?}");
            }
        }
    }
}

fn create_cloud(document: &Document, cloud: &CloudImage) -> Result<HtmlImageElement, JsValue> {
    let img = document
        .create_element("img")?
        .dyn_into::<HtmlImageElement>()?;
    let src = cloud.asset_path();
    img.set_class_name("cloud-image");

    {
        let src = src.clone();
        let onload = Closure::once_into_js(move || log::debug!("cloud image loaded: {src}"));
        img.set_onload(Some(onload.unchecked_ref()));
    }
    {
        let src = src.clone();
        let onerror = Closure::once_into_js(move || log::error!("failed to load cloud image: {src}"));
        img.set_onerror(Some(onerror.unchecked_ref()));
    }
    img.set_src(&src);

    place(&img, cloud.x, cloud.y, cloud.size)?;
    img.style().set_property("transform", "translate(-50%, -50%)")?;
    document.body().ok_or("no body")?.append_child(&img)?;
    Ok(img)
}

fn create_scanner(document: &Document, scanner: &Scanner) -> Result<HtmlElement, JsValue> {
    let node = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    node.set_class_name("hud-scanner");
    for part in ["hud-scanner-frame", "hud-scanner-corners", "hud-scanner-line"] {
        let child = document.create_element("div")?;
        child.set_class_name(part);
        node.append_child(&child)?;
    }

    place(&node, scanner.x, scanner.y, scanner.size)?;
    node.style().set_property("transform", "translate(-50%, -50%)")?;
    mark_scanner(&node, scanner)?;
    document.body().ok_or("no body")?.append_child(&node)?;
    Ok(node)
}

fn mark_scanner(node: &HtmlElement, scanner: &Scanner) -> Result<(), JsValue> {
    node.set_attribute("data-status", scanner.status())?;
    let classes = node.class_list();
    if scanner.is_analysing() {
        classes.add_1("scanning")
    } else {
        classes.remove_1("scanning")
    }
}

/// Wires the enter button, if the page has one, to hide the landing UI.
pub(super) fn setup_homepage(document: &Document) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id("enter-button") else {
        return Ok(());
    };
    let homepage = document.get_element_by_id("homepage-ui");

    let on_click = Closure::wrap(Box::new(move || {
        if let Some(ui) = &homepage {
            if let Err(e) = ui.class_list().add_1("hidden") {
                log::error!("could not hide homepage: {e:?}");
            }
        }
        log::info!("Welcome to EX Research!");
    }) as Box<dyn FnMut()>);
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}
