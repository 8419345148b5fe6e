//! Spawn cadence for chatboxes and clouds.

use fastrand::Rng;

use crate::chatbox::SpeedTier;
use crate::config::{IntroDurations, OverlayParams, BOOTSTRAP_CLOUD_DELAY};

const FLOOD_INTERVAL: f64 = 50.0;
const FLOOD_BATCH: usize = 8;
const STRAGGLER_INTERVAL: f64 = 200.0;
const STRAGGLER_BATCH: usize = 2;
/// Interval the transition phase starts from before easing to steady state.
const TRANSITION_START_INTERVAL: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    Flood,
    Stragglers,
    Transition,
    Normal,
}

impl IntroPhase {
    /// Phase for `elapsed` ms since the first tick.
    pub fn at(intro: &IntroDurations, elapsed: f64) -> Self {
        if elapsed < intro.flood {
            IntroPhase::Flood
        } else if elapsed < intro.flood + intro.stragglers {
            IntroPhase::Stragglers
        } else if elapsed < intro.total() {
            IntroPhase::Transition
        } else {
            IntroPhase::Normal
        }
    }
}

fn flood_tier(rng: &mut Rng) -> SpeedTier {
    let r = rng.f64();
    if r < 0.4 {
        SpeedTier::Superfast
    } else if r < 0.7 {
        SpeedTier::Fast
    } else {
        SpeedTier::Medium
    }
}

fn straggler_tier(rng: &mut Rng) -> SpeedTier {
    let r = rng.f64();
    if r < 0.3 {
        SpeedTier::Medium
    } else if r < 0.7 {
        SpeedTier::Slow
    } else {
        SpeedTier::Normal
    }
}

/// Decides when chatboxes and clouds appear.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    intro: IntroDurations,
    spawn_interval: f64,
    cloud_interval: f64,
    started_at: Option<f64>,
    last_spawn: f64,
    last_cloud_spawn: f64,
    bootstrap_pending: bool,
    phase: IntroPhase,
}

impl SpawnScheduler {
    pub fn new(params: &OverlayParams) -> Self {
        Self {
            intro: params.intro,
            spawn_interval: params.spawn_interval,
            cloud_interval: params.cloud_spawn_interval,
            started_at: None,
            last_spawn: 0.0,
            last_cloud_spawn: 0.0,
            bootstrap_pending: true,
            phase: IntroPhase::Normal,
        }
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    fn elapsed(&mut self, now: f64) -> f64 {
        now - *self.started_at.get_or_insert(now)
    }

    /// Tiers of the chatboxes to create this tick, if any.
    pub fn chatboxes_due(&mut self, rng: &mut Rng, now: f64) -> Vec<SpeedTier> {
        let elapsed = self.elapsed(now);
        self.phase = IntroPhase::at(&self.intro, elapsed);

        let since_last = now - self.last_spawn;
        let tiers: Vec<SpeedTier> = match self.phase {
            IntroPhase::Flood if since_last > FLOOD_INTERVAL => {
                (0..FLOOD_BATCH).map(|_| flood_tier(rng)).collect()
            }
            IntroPhase::Stragglers if since_last > STRAGGLER_INTERVAL => {
                (0..STRAGGLER_BATCH).map(|_| straggler_tier(rng)).collect()
            }
            IntroPhase::Transition => {
                let into = elapsed - self.intro.flood - self.intro.stragglers;
                let progress = into / self.intro.transition;
                let interval = TRANSITION_START_INTERVAL
                    + (self.spawn_interval - TRANSITION_START_INTERVAL) * progress;
                if since_last > interval {
                    vec![SpeedTier::Normal]
                } else {
                    Vec::new()
                }
            }
            IntroPhase::Normal if since_last > self.spawn_interval => vec![SpeedTier::Normal],
            _ => Vec::new(),
        };

        if !tiers.is_empty() {
            self.last_spawn = now;
        }
        tiers
    }

    /// Whether a cloud should appear this tick. `have_clouds` reports whether
    /// any cloud is alive; the bootstrap cloud only fires into an empty page.
    pub fn cloud_due(&mut self, clouds_enabled: bool, have_clouds: bool, now: f64) -> bool {
        let elapsed = self.elapsed(now);

        if self.bootstrap_pending && elapsed >= BOOTSTRAP_CLOUD_DELAY {
            self.bootstrap_pending = false;
            if !have_clouds {
                return true;
            }
        }

        if clouds_enabled && now - self.last_cloud_spawn > self.cloud_interval {
            self.last_cloud_spawn = now;
            return true;
        }
        false
    }

    /// Treats `now` as the moment of the last chatbox spawn.
    pub fn mark_spawned(&mut self, now: f64) {
        self.last_spawn = now;
    }
}
