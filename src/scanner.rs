//! HUD scanners: patrol the page, lock onto ready clouds, analyse them and
//! return to patrol.

use std::f64::consts::TAU;

use fastrand::Rng;

use crate::cloud::{CloudId, CloudImage, CloudPhase};
use crate::geometry::{distance, Size, Viewport};

pub const PATROL_SIZE: Size = Size::new(20.0, 20.0);
/// Pixels per tick while closing in on a target.
pub const TARGETING_STEP: f64 = 10.0;
/// Distance at which targeting turns into scanning.
pub const LOCK_DISTANCE: f64 = 5.0;
pub const GROW_DURATION: f64 = 300.0;
pub const SCAN_DURATION: f64 = 800.0;
pub const SHRINK_DURATION: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScannerPhase {
    Wandering,
    Targeting {
        cloud: CloudId,
    },
    Scanning {
        cloud: CloudId,
        started: f64,
        target_size: Size,
    },
    Returning {
        started: f64,
        from: Size,
    },
}

impl ScannerPhase {
    pub fn target(&self) -> Option<CloudId> {
        match *self {
            ScannerPhase::Targeting { cloud } | ScannerPhase::Scanning { cloud, .. } => Some(cloud),
            _ => None,
        }
    }
}

/// What a scanner did this tick that the outside world cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerStep {
    Idle,
    /// Reached the cloud and started the analysis.
    Locked(CloudId),
    /// Analysis finished; the cloud must be retired.
    Completed(CloudId),
    /// Shrunk back to patrol size.
    Released,
    /// Target vanished while en route.
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: Size,
    pub patrol_size: Size,
    pub phase: ScannerPhase,
    pub turned_at: f64,
    pub turn_after: f64,
}

impl Scanner {
    pub fn spawn(rng: &mut Rng, viewport: &Viewport, now: f64) -> Self {
        let mut scanner = Self {
            x: rng.f64() * viewport.width,
            y: rng.f64() * viewport.height,
            vx: 0.0,
            vy: 0.0,
            size: PATROL_SIZE,
            patrol_size: PATROL_SIZE,
            phase: ScannerPhase::Wandering,
            turned_at: now,
            turn_after: 0.0,
        };
        scanner.pick_heading(rng, now);
        scanner
    }

    pub fn is_wandering(&self) -> bool {
        self.phase == ScannerPhase::Wandering
    }

    /// HUD label shown next to the frame. Stays "Identified" until the
    /// scanner is back on patrol.
    pub fn status(&self) -> &'static str {
        match self.phase {
            ScannerPhase::Scanning { .. } | ScannerPhase::Returning { .. } => "Identified",
            _ => "Scanning",
        }
    }

    /// True while the analysis animation runs.
    pub fn is_analysing(&self) -> bool {
        matches!(self.phase, ScannerPhase::Scanning { .. })
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        distance(self.x, self.y, x, y)
    }

    /// Starts heading for `cloud`. Only valid while wandering.
    pub fn assign(&mut self, cloud: CloudId) {
        debug_assert!(self.is_wandering());
        self.phase = ScannerPhase::Targeting { cloud };
    }

    /// Uniform heading, speed in [1.0, 2.5), next turn in [2000, 5000).
    fn pick_heading(&mut self, rng: &mut Rng, now: f64) {
        let angle = rng.f64() * TAU;
        let speed = 1.0 + rng.f64() * 1.5;
        self.vx = angle.cos() * speed;
        self.vy = angle.sin() * speed;
        self.turned_at = now;
        self.turn_after = 2000.0 + rng.f64() * 3000.0;
    }

    /// Patrol motion with elastic reflection off the viewport edges.
    pub fn wander(&mut self, rng: &mut Rng, viewport: &Viewport, now: f64) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 || self.x > viewport.width {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, viewport.width);
        }
        if self.y < 0.0 || self.y > viewport.height {
            self.vy = -self.vy;
            self.y = self.y.clamp(0.0, viewport.height);
        }

        if now - self.turned_at > self.turn_after {
            self.pick_heading(rng, now);
        }
    }

    /// Advances the phase machine by one tick. Clouds are only read; the
    /// caller retires the cloud on [`ScannerStep::Completed`].
    pub fn update(
        &mut self,
        rng: &mut Rng,
        viewport: &Viewport,
        clouds: &[CloudImage],
        now: f64,
    ) -> ScannerStep {
        match self.phase {
            ScannerPhase::Wandering => {
                self.wander(rng, viewport, now);
                ScannerStep::Idle
            }
            ScannerPhase::Targeting { cloud } => {
                let Some(target) = clouds
                    .iter()
                    .find(|c| c.id == cloud && c.phase != CloudPhase::Complete)
                else {
                    self.phase = ScannerPhase::Wandering;
                    return ScannerStep::Abandoned;
                };

                let dist = self.distance_to(target.x, target.y);
                if dist > LOCK_DISTANCE {
                    self.x += (target.x - self.x) / dist * TARGETING_STEP;
                    self.y += (target.y - self.y) / dist * TARGETING_STEP;
                    ScannerStep::Idle
                } else {
                    self.phase = ScannerPhase::Scanning {
                        cloud,
                        started: now,
                        target_size: target.final_size,
                    };
                    ScannerStep::Locked(cloud)
                }
            }
            ScannerPhase::Scanning {
                cloud,
                started,
                target_size,
            } => {
                let elapsed = now - started;
                self.size = if elapsed < GROW_DURATION {
                    let t = elapsed / GROW_DURATION;
                    let eased = 1.0 - (1.0 - t).powi(3);
                    self.patrol_size.lerp(target_size, eased)
                } else {
                    target_size
                };

                if elapsed > SCAN_DURATION {
                    self.phase = ScannerPhase::Returning {
                        started: now,
                        from: target_size,
                    };
                    ScannerStep::Completed(cloud)
                } else {
                    ScannerStep::Idle
                }
            }
            ScannerPhase::Returning { started, from } => {
                let elapsed = now - started;
                if elapsed < SHRINK_DURATION {
                    // linear on the way back
                    self.size = from.lerp(self.patrol_size, elapsed / SHRINK_DURATION);
                    ScannerStep::Idle
                } else {
                    self.size = self.patrol_size;
                    self.phase = ScannerPhase::Wandering;
                    self.pick_heading(rng, now);
                    ScannerStep::Released
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0, 2.0)
    }

    fn ready_cloud(x: f64, y: f64) -> CloudImage {
        let mut rng = Rng::with_seed(4);
        let mut cloud = CloudImage::spawn(&mut rng, CloudId(7), &viewport(), 0.0);
        cloud.x = x;
        cloud.y = y;
        cloud.final_size = Size::new(220.0, 120.0);
        cloud.size = cloud.final_size;
        cloud.phase = CloudPhase::BeingScanned;
        cloud
    }

    fn scanner_at(x: f64, y: f64) -> Scanner {
        let mut rng = Rng::with_seed(8);
        let mut s = Scanner::spawn(&mut rng, &viewport(), 0.0);
        s.x = x;
        s.y = y;
        s
    }

    #[test]
    fn test_spawn_heading() {
        let mut rng = Rng::with_seed(12);
        for _ in 0..100 {
            let s = Scanner::spawn(&mut rng, &viewport(), 0.0);
            let speed = (s.vx * s.vx + s.vy * s.vy).sqrt();
            assert!(speed >= 1.0 - 1e-9 && speed < 2.5 + 1e-9);
            assert!(s.turn_after >= 2000.0 && s.turn_after < 5000.0);
            assert_eq!(s.size, PATROL_SIZE);
            assert!(s.is_wandering());
            assert_eq!(s.status(), "Scanning");
        }
    }

    #[test]
    fn test_wander_reflects_at_edges() {
        let mut rng = Rng::with_seed(1);
        let vp = viewport();
        let mut s = scanner_at(999.5, 400.0);
        s.vx = 2.0;
        s.vy = 0.0;
        s.wander(&mut rng, &vp, 16.0);
        assert_eq!(s.x, 1000.0);
        assert_eq!(s.vx, -2.0);

        s.y = 0.5;
        s.vy = -1.5;
        s.wander(&mut rng, &vp, 32.0);
        assert_eq!(s.y, 0.0);
        assert_eq!(s.vy, 1.5);
    }

    #[test]
    fn test_wander_turns_after_interval() {
        let mut rng = Rng::with_seed(2);
        let vp = viewport();
        let mut s = scanner_at(500.0, 400.0);
        let turn_at = s.turned_at + s.turn_after + 1.0;
        s.wander(&mut rng, &vp, turn_at - 2.0);
        assert_eq!(s.turned_at, 0.0);
        s.wander(&mut rng, &vp, turn_at);
        assert_eq!(s.turned_at, turn_at);
    }

    #[test]
    fn test_full_cycle() {
        let mut rng = Rng::with_seed(3);
        let vp = viewport();
        let mut clouds = vec![ready_cloud(130.0, 100.0)];
        let mut s = scanner_at(100.0, 100.0);
        s.assign(CloudId(7));

        // 30 px away: three steps of 10 px, then lock
        let mut now = 0.0;
        for _ in 0..3 {
            now += 16.0;
            assert_eq!(s.update(&mut rng, &vp, &clouds, now), ScannerStep::Idle);
        }
        assert!(s.distance_to(130.0, 100.0) <= LOCK_DISTANCE);
        now += 16.0;
        assert_eq!(s.update(&mut rng, &vp, &clouds, now), ScannerStep::Locked(CloudId(7)));
        assert_eq!(s.status(), "Identified");
        let scan_start = now;

        // ease-out is ahead of linear halfway through the growth window
        s.update(&mut rng, &vp, &clouds, scan_start + 150.0);
        let linear = PATROL_SIZE.lerp(Size::new(220.0, 120.0), 0.5);
        assert!(s.size.width > linear.width);

        s.update(&mut rng, &vp, &clouds, scan_start + 400.0);
        assert_eq!(s.size, Size::new(220.0, 120.0));

        assert_eq!(
            s.update(&mut rng, &vp, &clouds, scan_start + 801.0),
            ScannerStep::Completed(CloudId(7))
        );
        clouds[0].phase = CloudPhase::Complete;
        assert!(!s.is_analysing());
        assert_eq!(s.status(), "Identified");
        let return_start = scan_start + 801.0;

        s.update(&mut rng, &vp, &clouds, return_start + 100.0);
        assert_eq!(s.size, Size::new(120.0, 70.0));

        assert_eq!(
            s.update(&mut rng, &vp, &clouds, return_start + 200.0),
            ScannerStep::Released
        );
        assert_eq!(s.size, PATROL_SIZE);
        assert!(s.is_wandering());
        assert_eq!(s.status(), "Scanning");
        assert_eq!(s.phase.target(), None);
    }

    #[test]
    fn test_abandons_missing_target() {
        let mut rng = Rng::with_seed(6);
        let vp = viewport();
        let mut s = scanner_at(10.0, 10.0);
        s.assign(CloudId(99));
        assert_eq!(s.update(&mut rng, &vp, &[], 16.0), ScannerStep::Abandoned);
        assert!(s.is_wandering());
    }

    #[test]
    fn test_abandons_completed_target() {
        let mut rng = Rng::with_seed(6);
        let vp = viewport();
        let mut cloud = ready_cloud(300.0, 300.0);
        cloud.phase = CloudPhase::Complete;
        let mut s = scanner_at(10.0, 10.0);
        s.assign(CloudId(7));
        assert_eq!(s.update(&mut rng, &vp, &[cloud], 16.0), ScannerStep::Abandoned);
    }
}
