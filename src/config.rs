//! Engine parameters fixed at start-up and the controls read every frame.

use anyhow::{ensure, Result};

/// Delay after the first tick before the bootstrap cloud appears.
pub const BOOTSTRAP_CLOUD_DELAY: f64 = 100.0;

/// Durations of the intro phases, in milliseconds. All zero skips straight
/// to the steady cadence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntroDurations {
    pub flood: f64,
    pub stragglers: f64,
    pub transition: f64,
}

impl IntroDurations {
    pub fn total(&self) -> f64 {
        self.flood + self.stragglers + self.transition
    }
}

/// Start-up parameters of the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayParams {
    /// Viewport pixels per canvas pixel.
    pub pixel_scale: f64,
    /// Steady-state chatbox spawn interval.
    pub spawn_interval: f64,
    pub cloud_spawn_interval: f64,
    pub scanner_count: usize,
    pub intro: IntroDurations,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            pixel_scale: 2.0,
            spawn_interval: 1200.0,
            cloud_spawn_interval: 3000.0,
            scanner_count: 3,
            intro: IntroDurations::default(),
        }
    }
}

impl OverlayParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.pixel_scale.is_finite() && self.pixel_scale >= 1.0,
            "pixel scale must be at least 1, got {}",
            self.pixel_scale
        );
        ensure!(
            self.spawn_interval.is_finite() && self.spawn_interval > 0.0,
            "spawn interval must be positive, got {}",
            self.spawn_interval
        );
        ensure!(
            self.cloud_spawn_interval.is_finite() && self.cloud_spawn_interval > 0.0,
            "cloud spawn interval must be positive, got {}",
            self.cloud_spawn_interval
        );
        for (name, value) in [
            ("flood", self.intro.flood),
            ("stragglers", self.intro.stragglers),
            ("transition", self.intro.transition),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} duration must be non-negative, got {value}"
            );
        }
        Ok(())
    }
}

/// Visual theme of the speech bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BubbleStyle {
    /// White box, black outline and text.
    #[default]
    Classic,
    /// Navy gradient with a light-blue outline and white text.
    Ff7,
}

impl BubbleStyle {
    /// Unknown names fall back to the classic look.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ff7" => BubbleStyle::Ff7,
            _ => BubbleStyle::Classic,
        }
    }
}

/// Page-side controls, read fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayControls {
    /// Multiplier on chatbox velocity.
    pub speed: f64,
    /// Connection slider value; `None` uses the built-in 40 unit range.
    pub connection_range: Option<f64>,
    pub clouds_enabled: bool,
    pub style: BubbleStyle,
}

impl Default for OverlayControls {
    fn default() -> Self {
        Self {
            speed: 1.0,
            connection_range: None,
            clouds_enabled: false,
            style: BubbleStyle::Classic,
        }
    }
}

impl OverlayControls {
    /// Maximum center distance at which two chatboxes get a connector.
    pub fn connection_distance(&self) -> f64 {
        match self.connection_range {
            Some(range) => range * 12.0,
            None => 40.0,
        }
    }
}
