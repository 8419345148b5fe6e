//! Cloud images: pop in, wait for a scanner, get analysed, disappear.

use fastrand::Rng;

use crate::geometry::{Size, Viewport};

pub const VARIANTS: u8 = 9;
const EDGE_MARGIN: f64 = 100.0;

/// Stable handle of a cloud across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CloudId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudPhase {
    Scaling,
    Ready,
    BeingScanned,
    Complete,
}

#[derive(Debug, Clone)]
pub struct CloudImage {
    pub id: CloudId,
    /// Picks `assets/ex{variant}.png`, 1-based.
    pub variant: u8,
    pub x: f64,
    pub y: f64,
    pub size: Size,
    pub final_size: Size,
    pub phase: CloudPhase,
    pub created_at: f64,
    pub scale_duration: f64,
    /// Index of the scanner analysing this cloud, if any.
    pub scanner: Option<usize>,
}

impl CloudImage {
    pub fn spawn(rng: &mut Rng, id: CloudId, viewport: &Viewport, now: f64) -> Self {
        let variant = rng.u8(1..=VARIANTS);
        let x = rng.f64() * (viewport.width - 2.0 * EDGE_MARGIN) + EDGE_MARGIN;
        let y = rng.f64() * (viewport.height - 2.0 * EDGE_MARGIN) + EDGE_MARGIN;
        let final_size = Size::new(150.0 + rng.f64() * 300.0, 100.0 + rng.f64() * 200.0);
        Self {
            id,
            variant,
            x,
            y,
            size: Size::new(0.0, 0.0),
            final_size,
            phase: CloudPhase::Scaling,
            created_at: now,
            scale_duration: 200.0 + rng.f64() * 300.0,
            scanner: None,
        }
    }

    pub fn asset_path(&self) -> String {
        format!("assets/ex{}.png", self.variant)
    }

    /// Grows the image while scaling. Returns `true` on the tick it becomes
    /// ready.
    pub fn update(&mut self, now: f64) -> bool {
        if self.phase != CloudPhase::Scaling {
            return false;
        }
        let progress = ((now - self.created_at) / self.scale_duration).clamp(0.0, 1.0);
        self.size = Size::new(0.0, 0.0).lerp(self.final_size, progress);
        if progress >= 1.0 {
            self.phase = CloudPhase::Ready;
            return true;
        }
        false
    }
}
