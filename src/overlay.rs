//! The overlay engine: owns every entity and advances them once per frame.
//!
//! `tick` is pure state. It reports the DOM-relevant changes as
//! [`OverlayEvent`]s and leaves drawing to [`crate::draw`].

use std::collections::VecDeque;

use anyhow::Result;
use fastrand::Rng;

use crate::chatbox::{self, Chatbox, SpeedTier};
use crate::cloud::{CloudId, CloudImage, CloudPhase};
use crate::config::{OverlayControls, OverlayParams};
use crate::geometry::Viewport;
use crate::scanner::{Scanner, ScannerStep};
use crate::spawn::{IntroPhase, SpawnScheduler};

/// Changes the DOM layer has to mirror. Positions and sizes are read from
/// the state after the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    CloudSpawned(CloudId),
    /// The cloud was analysed; its node should go away.
    CloudRemoved(CloudId),
    /// Status label or analysing flag of scanner `index` changed.
    ScannerChanged(usize),
}

pub struct Overlay {
    params: OverlayParams,
    viewport: Viewport,
    rng: Rng,
    scheduler: SpawnScheduler,
    chatboxes: Vec<Chatbox>,
    clouds: Vec<CloudImage>,
    scanners: Vec<Scanner>,
    /// Ready clouds still waiting for a free scanner, oldest first.
    pending: VecDeque<CloudId>,
    next_cloud_id: u64,
}

impl Overlay {
    pub fn new(params: OverlayParams, width: f64, height: f64, seed: u64, now: f64) -> Result<Self> {
        params.validate()?;
        let viewport = Viewport::new(width, height, params.pixel_scale);
        let mut rng = Rng::with_seed(seed);
        let scanners = (0..params.scanner_count)
            .map(|_| Scanner::spawn(&mut rng, &viewport, now))
            .collect();
        log::info!(
            "overlay ready: {}x{} viewport, {} scanners",
            width,
            height,
            params.scanner_count
        );

        Ok(Self {
            scheduler: SpawnScheduler::new(&params),
            params,
            viewport,
            rng,
            chatboxes: Vec::new(),
            clouds: Vec::new(),
            scanners,
            pending: VecDeque::new(),
            next_cloud_id: 0,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn params(&self) -> &OverlayParams {
        &self.params
    }

    pub fn chatboxes(&self) -> &[Chatbox] {
        &self.chatboxes
    }

    pub fn clouds(&self) -> &[CloudImage] {
        &self.clouds
    }

    pub fn cloud(&self, id: CloudId) -> Option<&CloudImage> {
        self.clouds.iter().find(|c| c.id == id)
    }

    pub fn clouds_mut(&mut self) -> &mut [CloudImage] {
        &mut self.clouds
    }

    pub fn scanners(&self) -> &[Scanner] {
        &self.scanners
    }

    pub fn scanners_mut(&mut self) -> &mut [Scanner] {
        &mut self.scanners
    }

    pub fn intro_phase(&self) -> IntroPhase {
        self.scheduler.phase()
    }

    /// Ready clouds waiting for a scanner.
    pub fn pending(&self) -> impl Iterator<Item = CloudId> + '_ {
        self.pending.iter().copied()
    }

    /// New viewport size in CSS pixels; picked up by the next tick.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height, self.params.pixel_scale);
    }

    /// Fills the canvas with 8 to 12 slow boxes on a jittered grid.
    pub fn seed_chatboxes(&mut self, now: f64) {
        let count = self.rng.usize(8..=12);
        let seeded = chatbox::seed_grid(&mut self.rng, &self.viewport, count, now);
        self.chatboxes.extend(seeded);
        log::info!("created {} initial chatboxes", count);
    }

    pub fn spawn_chatbox(&mut self, start_x: Option<f64>, tier: SpeedTier, now: f64) {
        let chatbox = Chatbox::spawn(&mut self.rng, &self.viewport, start_x, tier, now);
        self.chatboxes.push(chatbox);
    }

    pub fn spawn_cloud(&mut self, now: f64) -> CloudId {
        let id = CloudId(self.next_cloud_id);
        self.next_cloud_id += 1;
        let cloud = CloudImage::spawn(&mut self.rng, id, &self.viewport, now);
        log::debug!(
            "cloud {:?} ({}) at {:.0},{:.0}",
            id,
            cloud.asset_path(),
            cloud.x,
            cloud.y
        );
        self.clouds.push(cloud);
        id
    }

    /// Advances the whole overlay to `now`.
    pub fn tick(&mut self, now: f64, controls: &OverlayControls) -> Vec<OverlayEvent> {
        let mut events = Vec::new();

        // clouds strictly before scanners
        self.update_clouds(now, controls, &mut events);
        self.assign_pending();
        self.update_scanners(now, &mut events);

        for tier in self.scheduler.chatboxes_due(&mut self.rng, now) {
            self.spawn_chatbox(None, tier, now);
        }
        let (rng, viewport) = (&mut self.rng, &self.viewport);
        self.chatboxes
            .retain_mut(|c| c.advance(rng, viewport, controls.speed, now));

        events
    }

    fn update_clouds(&mut self, now: f64, controls: &OverlayControls, events: &mut Vec<OverlayEvent>) {
        // analysed last tick
        self.clouds.retain(|c| c.phase != CloudPhase::Complete);

        if self
            .scheduler
            .cloud_due(controls.clouds_enabled, !self.clouds.is_empty(), now)
        {
            let id = self.spawn_cloud(now);
            events.push(OverlayEvent::CloudSpawned(id));
        }

        for cloud in &mut self.clouds {
            if cloud.update(now) {
                self.pending.push_back(cloud.id);
            }
        }
    }

    /// Hands queued clouds to the nearest wandering scanner, oldest cloud
    /// first. Clouds with no free scanner stay queued for the next tick.
    pub fn assign_pending(&mut self) {
        while let Some(&id) = self.pending.front() {
            let Some(cloud) = self
                .clouds
                .iter_mut()
                .find(|c| c.id == id && c.phase == CloudPhase::Ready)
            else {
                self.pending.pop_front();
                continue;
            };

            let nearest = self
                .scanners
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_wandering())
                .map(|(i, s)| (i, s.distance_to(cloud.x, cloud.y)))
                .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                });

            let Some((index, dist)) = nearest else {
                log::debug!("no free scanner for cloud {:?}, {} waiting", id, self.pending.len());
                break;
            };

            self.scanners[index].assign(id);
            cloud.phase = CloudPhase::BeingScanned;
            cloud.scanner = Some(index);
            self.pending.pop_front();
            log::info!("scanner {} assigned to cloud {:?} ({:.0} px away)", index, id, dist);
        }
    }

    fn update_scanners(&mut self, now: f64, events: &mut Vec<OverlayEvent>) {
        let mut completed = Vec::new();
        for (index, scanner) in self.scanners.iter_mut().enumerate() {
            match scanner.update(&mut self.rng, &self.viewport, &self.clouds, now) {
                ScannerStep::Idle => {}
                ScannerStep::Locked(id) => {
                    log::debug!("scanner {} analysing cloud {:?}", index, id);
                    events.push(OverlayEvent::ScannerChanged(index));
                }
                ScannerStep::Completed(id) => {
                    completed.push(id);
                    events.push(OverlayEvent::CloudRemoved(id));
                    events.push(OverlayEvent::ScannerChanged(index));
                }
                ScannerStep::Released => {
                    log::debug!("scanner {} back on patrol", index);
                    events.push(OverlayEvent::ScannerChanged(index));
                }
                ScannerStep::Abandoned => {
                    log::debug!("scanner {} lost its target", index);
                }
            }
        }

        for cloud in &mut self.clouds {
            if completed.contains(&cloud.id) {
                cloud.phase = CloudPhase::Complete;
                cloud.scanner = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(scanners: usize) -> Overlay {
        let params = OverlayParams {
            scanner_count: scanners,
            ..OverlayParams::default()
        };
        Overlay::new(params, 1280.0, 720.0, 42, 0.0).unwrap()
    }

    fn freeze(scanner: &mut Scanner, x: f64, y: f64) {
        scanner.x = x;
        scanner.y = y;
        scanner.vx = 0.0;
        scanner.vy = 0.0;
        scanner.turn_after = f64::INFINITY;
    }

    #[test]
    fn test_new_rejects_bad_params() {
        let params = OverlayParams {
            pixel_scale: 0.0,
            ..OverlayParams::default()
        };
        assert!(Overlay::new(params, 800.0, 600.0, 1, 0.0).is_err());
    }

    #[test]
    fn test_pool_size() {
        let o = overlay(3);
        assert_eq!(o.scanners().len(), 3);
        assert!(o.scanners().iter().all(|s| s.is_wandering()));
    }

    #[test]
    fn test_seed_chatboxes_count() {
        let mut o = overlay(0);
        o.seed_chatboxes(0.0);
        assert!((8..=12).contains(&o.chatboxes().len()));
    }

    #[test]
    fn test_ties_go_to_first_scanner() {
        let mut o = overlay(2);
        let id = o.spawn_cloud(0.0);
        o.clouds_mut()[0].x = 500.0;
        o.clouds_mut()[0].y = 300.0;
        freeze(&mut o.scanners_mut()[0], 400.0, 300.0);
        freeze(&mut o.scanners_mut()[1], 600.0, 300.0);

        o.tick(1000.0, &OverlayControls::default());
        assert_eq!(o.scanners()[0].phase.target(), Some(id));
        assert!(o.scanners()[1].is_wandering());
        assert_eq!(o.cloud(id).map(|c| c.scanner), Some(Some(0)));
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut o = overlay(0);
        o.resize(640.0, 480.0);
        assert_eq!(o.viewport().canvas_width(), 320.0);
        assert_eq!(o.viewport().canvas_height(), 240.0);
    }
}
