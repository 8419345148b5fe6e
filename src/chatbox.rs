//! Speech-bubble entities: creation per speed tier and per-tick motion.

use fastrand::Rng;

use crate::geometry::Viewport;

const BASE_WIDTH: f64 = 240.0;
const BASE_HEIGHT: f64 = 72.0;
const BASE_SPAWN_MARGIN: f64 = 80.0;
const BASE_CARET_MARGIN: f64 = 20.0;

/// Chatboxes are pruned once their left edge passes this far beyond `-width`.
pub const OFFSCREEN_SLACK: f64 = 20.0;

pub const LABEL: &str = "EX Research";

/// Speed category picked at spawn; selects the velocity ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTier {
    Superfast,
    Fast,
    Medium,
    Slow,
    Normal,
}

impl SpeedTier {
    /// `(base, span, drift)`: vx = -(base + U*span), vy = (U - 0.5) * drift,
    /// both before dividing by the pixel scale.
    fn ranges(self) -> (f64, f64, f64) {
        match self {
            SpeedTier::Superfast => (5.0, 6.0, 1.5),
            SpeedTier::Fast => (3.0, 3.0, 1.0),
            SpeedTier::Medium => (1.5, 2.0, 0.6),
            SpeedTier::Slow => (0.8, 1.2, 0.4),
            SpeedTier::Normal => (0.5, 0.8, 0.2),
        }
    }
}

/// One styled run of the label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: &'static str,
    pub bold: bool,
    pub size_multiplier: f64,
}

pub fn random_fragments(rng: &mut Rng) -> Vec<TextFragment> {
    vec![
        TextFragment {
            text: "EX",
            bold: rng.bool(),
            size_multiplier: 0.8 + rng.f64() * 0.6,
        },
        TextFragment {
            text: " ",
            bold: false,
            size_multiplier: 1.0,
        },
        TextFragment {
            text: "Research",
            bold: rng.bool(),
            size_multiplier: 0.8 + rng.f64() * 0.6,
        },
    ]
}

fn restyle_interval(rng: &mut Rng) -> f64 {
    2000.0 + rng.f64() * 2000.0
}

#[derive(Debug, Clone)]
pub struct Chatbox {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub width: f64,
    pub height: f64,
    pub text: &'static str,
    pub fragments: Vec<TextFragment>,
    pub style_updated_at: f64,
    pub style_interval: f64,
    pub tier: SpeedTier,
}

impl Chatbox {
    /// New chatbox at `start_x`, or just past the right canvas edge.
    pub fn spawn(
        rng: &mut Rng,
        viewport: &Viewport,
        start_x: Option<f64>,
        tier: SpeedTier,
        now: f64,
    ) -> Self {
        let scale = viewport.pixel_scale;
        let width = BASE_WIDTH / scale;
        let height = BASE_HEIGHT / scale;
        let x = start_x.unwrap_or(viewport.canvas_width() + BASE_SPAWN_MARGIN / scale / 4.0);
        let y = rng.f64() * (viewport.canvas_height() - height - caret_margin(viewport)).max(0.0);

        let (base, span, drift) = tier.ranges();
        Self {
            x,
            y,
            vx: (-base - rng.f64() * span) / scale,
            vy: ((rng.f64() - 0.5) * drift) / scale,
            width,
            height,
            text: LABEL,
            fragments: random_fragments(rng),
            style_updated_at: now,
            style_interval: restyle_interval(rng),
            tier,
        }
    }

    /// Lowest allowed `y`, keeping the caret on the canvas.
    pub fn max_y(&self, viewport: &Viewport) -> f64 {
        viewport.canvas_height() - self.height - caret_margin(viewport)
    }

    /// Integrates one tick. Returns `false` once the box has left the canvas.
    pub fn advance(&mut self, rng: &mut Rng, viewport: &Viewport, speed: f64, now: f64) -> bool {
        self.x += self.vx * speed;
        self.y += self.vy * speed;

        if now - self.style_updated_at > self.style_interval {
            self.fragments = random_fragments(rng);
            self.style_updated_at = now;
            self.style_interval = restyle_interval(rng);
        }

        // damped bounce
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = self.vy.abs() * 0.5;
        }
        let max_y = self.max_y(viewport);
        if self.y > max_y {
            self.y = max_y;
            self.vy = -self.vy.abs() * 0.5;
        }

        !self.is_offscreen()
    }

    pub fn is_offscreen(&self) -> bool {
        self.x <= -self.width - OFFSCREEN_SLACK
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

pub fn caret_margin(viewport: &Viewport) -> f64 {
    BASE_CARET_MARGIN / viewport.pixel_scale
}

/// Initial population: `count` boxes spread over a jittered grid.
pub fn seed_grid(rng: &mut Rng, viewport: &Viewport, count: usize, now: f64) -> Vec<Chatbox> {
    if count == 0 {
        return Vec::new();
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    let cell_w = viewport.canvas_width() / cols as f64;
    let cell_h = viewport.canvas_height() / rows as f64;

    (0..count)
        .map(|i| {
            let mut chatbox = Chatbox::spawn(rng, viewport, None, SpeedTier::Normal, now);
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            let x = col * cell_w + rng.f64() * cell_w * 0.8;
            let y = row * cell_h + rng.f64() * cell_h * 0.8;
            chatbox.x = x.min(viewport.canvas_width() - chatbox.width).max(0.0);
            chatbox.y = y.min(chatbox.max_y(viewport)).max(0.0);
            chatbox
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1600.0, 900.0, 2.0)
    }

    #[test]
    fn test_spawn_defaults_past_right_edge() {
        let mut rng = Rng::with_seed(1);
        let vp = viewport();
        let c = Chatbox::spawn(&mut rng, &vp, None, SpeedTier::Normal, 0.0);
        assert_eq!(c.x, 800.0 + 10.0);
        assert_eq!(c.width, 120.0);
        assert_eq!(c.height, 36.0);
        assert!(c.y >= 0.0 && c.y <= c.max_y(&vp));
        assert_eq!(c.text, LABEL);
        assert_eq!(c.fragments.len(), 3);
    }

    #[test]
    fn test_tier_velocity_ranges() {
        let mut rng = Rng::with_seed(7);
        let vp = viewport();
        for _ in 0..200 {
            let c = Chatbox::spawn(&mut rng, &vp, Some(0.0), SpeedTier::Superfast, 0.0);
            assert!(c.vx <= -2.5 && c.vx >= -5.5, "vx={}", c.vx);
            assert!(c.vy.abs() <= 0.375);
            let c = Chatbox::spawn(&mut rng, &vp, Some(0.0), SpeedTier::Normal, 0.0);
            assert!(c.vx <= -0.25 && c.vx >= -0.65, "vx={}", c.vx);
            assert!(c.vy.abs() <= 0.05);
        }
    }

    #[test]
    fn test_fragment_multipliers() {
        let mut rng = Rng::with_seed(3);
        for _ in 0..100 {
            let f = random_fragments(&mut rng);
            assert_eq!(f[1].text, " ");
            assert!(!f[1].bold);
            for frag in [&f[0], &f[2]] {
                assert!(frag.size_multiplier >= 0.8 && frag.size_multiplier < 1.4);
            }
        }
    }

    #[test]
    fn test_bounce_halves_vy() {
        let mut rng = Rng::with_seed(5);
        let vp = viewport();
        let mut c = Chatbox::spawn(&mut rng, &vp, Some(400.0), SpeedTier::Normal, 0.0);
        c.y = 0.5;
        c.vy = -2.0;
        c.advance(&mut rng, &vp, 1.0, 16.0);
        assert_eq!(c.y, 0.0);
        assert_eq!(c.vy, 1.0);

        let max_y = c.max_y(&vp);
        c.y = max_y - 0.5;
        c.vy = 3.0;
        c.advance(&mut rng, &vp, 1.0, 32.0);
        assert_eq!(c.y, max_y);
        assert_eq!(c.vy, -1.5);
    }

    #[test]
    fn test_offscreen_boundary() {
        let mut rng = Rng::with_seed(9);
        let vp = viewport();
        let mut c = Chatbox::spawn(&mut rng, &vp, Some(0.0), SpeedTier::Normal, 0.0);
        c.vx = -1.0;
        c.vy = 0.0;
        c.x = -c.width - OFFSCREEN_SLACK + 2.0;
        assert!(c.advance(&mut rng, &vp, 1.0, 16.0));
        assert!(!c.advance(&mut rng, &vp, 1.0, 32.0));
        assert!(c.is_offscreen());
    }

    #[test]
    fn test_restyle_after_interval() {
        let mut rng = Rng::with_seed(11);
        let vp = viewport();
        let mut c = Chatbox::spawn(&mut rng, &vp, Some(100.0), SpeedTier::Normal, 0.0);
        c.advance(&mut rng, &vp, 1.0, 1000.0);
        assert_eq!(c.style_updated_at, 0.0);
        c.advance(&mut rng, &vp, 1.0, 4001.0);
        assert_eq!(c.style_updated_at, 4001.0);
        assert!(c.style_interval >= 2000.0 && c.style_interval < 4000.0);
    }

    #[test]
    fn test_seed_grid_on_canvas() {
        let mut rng = Rng::with_seed(13);
        let vp = viewport();
        let boxes = seed_grid(&mut rng, &vp, 10, 0.0);
        assert_eq!(boxes.len(), 10);
        for c in &boxes {
            assert!(c.x >= 0.0 && c.x <= vp.canvas_width() - c.width);
            assert!(c.y >= 0.0 && c.y <= c.max_y(&vp));
        }
    }
}
