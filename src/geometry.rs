/// Width and height of a visual footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Linear blend from `self` toward `to`; `t` is not clamped.
    pub fn lerp(self, to: Size, t: f64) -> Size {
        Size {
            width: self.width + (to.width - self.width) * t,
            height: self.height + (to.height - self.height) * t,
        }
    }
}

/// Page viewport in CSS pixels plus the pixelation factor of the overlay
/// canvas. Clouds and scanners live in viewport space, chatboxes in canvas
/// space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_scale: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_scale: f64) -> Self {
        Self { width, height, pixel_scale }
    }

    pub fn canvas_width(&self) -> f64 {
        (self.width / self.pixel_scale).floor()
    }

    pub fn canvas_height(&self) -> f64 {
        (self.height / self.pixel_scale).floor()
    }
}

pub fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt()
}
