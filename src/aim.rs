//! Aim trainer: click a fixed number of targets as fast as possible.
//!
//! The clock starts on the first hit rather than on `start`, so the time spent
//! finding the first target is not measured. Misses before that first hit are
//! ignored for the same reason.

use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::SessionError;
use crate::score::AimScore;
use crate::session::{accuracy_percent, Phase};

/// Targets to hit in one session
pub const TOTAL_TARGETS: u32 = 30;
/// Extra gap kept between a target's edge and the play-area border
pub const TARGET_PADDING: f64 = 20.0;
/// Viewports narrower than this get compact targets
pub const COMPACT_BREAKPOINT: f64 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

impl PlayArea {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSize {
    Compact,
    Regular,
}

impl TargetSize {
    pub fn for_viewport(width: f64) -> Self {
        if width < COMPACT_BREAKPOINT {
            TargetSize::Compact
        } else {
            TargetSize::Regular
        }
    }

    pub fn diameter(&self) -> f64 {
        match self {
            TargetSize::Compact => 50.0,
            TargetSize::Regular => 60.0,
        }
    }
}

/// A target centred at (`x`, `y`) in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
}

impl Target {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let r = self.diameter / 2.0;
        let (dx, dy) = (x - self.x, y - self.y);
        dx * dx + dy * dy <= r * r
    }
}

/// One play-through of the aim trainer
#[derive(Debug)]
pub struct AimSession<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    area: PlayArea,
    target_diameter: f64,
    phase: Phase,
    targets_hit: u32,
    total_clicks: u32,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    target: Option<Target>,
    next_target_id: u64,
    score: Option<AimScore>,
}

impl<C: Clock, R: Rng> AimSession<C, R> {
    pub fn new(clock: C, rng: R, area: PlayArea, target_diameter: f64) -> Self {
        Self {
            clock,
            rng,
            area,
            target_diameter,
            phase: Phase::Idle,
            targets_hit: 0,
            total_clicks: 0,
            started_at: None,
            ended_at: None,
            target: None,
            next_target_id: 0,
            score: None,
        }
    }

    /// Resize the play area. A live target that no longer fits is replaced.
    pub fn set_play_area(&mut self, area: PlayArea, target_diameter: f64) {
        self.area = area;
        self.target_diameter = target_diameter;

        if !self.phase.is_playing() {
            return;
        }
        if let Some(target) = self.target {
            if !self.fits(&target) {
                debug!("target {} no longer fits the play area, replacing it", target.id);
                self.target = Some(self.generate_target());
            }
        }
    }

    pub fn start(&mut self) {
        if self.phase.is_playing() {
            debug!("restarting aim session mid-play");
        }
        self.phase = Phase::Playing;
        self.targets_hit = 0;
        self.total_clicks = 0;
        self.started_at = None;
        self.ended_at = None;
        self.score = None;
        self.target = Some(self.generate_target());
    }

    /// Counts a hit on the current target. Returns the final score on the last target.
    pub fn register_hit(&mut self) -> Result<Option<AimScore>, SessionError> {
        self.ensure_playing("register a hit")?;

        let now = self.clock.now();
        let started_at = *self.started_at.get_or_insert(now);

        self.total_clicks += 1;
        self.targets_hit += 1;

        if self.targets_hit < TOTAL_TARGETS {
            self.target = Some(self.generate_target());
            return Ok(None);
        }

        self.ended_at = Some(now);
        self.phase = Phase::Finished;
        self.target = None;

        let time = now.duration_since(started_at).as_secs_f64();
        let score = AimScore {
            time,
            accuracy: self.accuracy().min(100.0),
            cps: per_second(self.targets_hit, time),
            timestamp: self.clock.timestamp(),
        };
        info!(
            "aim session finished: {:.2}s, {:.0}% accuracy, {:.2} cps",
            score.time, score.accuracy, score.cps
        );
        self.score = Some(score.clone());
        Ok(Some(score))
    }

    /// Counts a stray click. Ignored until the first hit has started the clock.
    pub fn register_miss(&mut self) -> Result<(), SessionError> {
        self.ensure_playing("register a miss")?;
        if self.started_at.is_some() {
            self.total_clicks += 1;
        }
        Ok(())
    }

    /// Routes a click at (`x`, `y`) to a hit or a miss
    pub fn click(&mut self, x: f64, y: f64) -> Result<Option<AimScore>, SessionError> {
        match self.target {
            Some(target) if target.contains(x, y) => self.register_hit(),
            _ => self.register_miss().map(|_| None),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn targets_hit(&self) -> u32 {
        self.targets_hit
    }

    pub fn total_clicks(&self) -> u32 {
        self.total_clicks
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn play_area(&self) -> PlayArea {
        self.area
    }

    /// The finalized score once the session is finished
    pub fn score(&self) -> Option<&AimScore> {
        self.score.as_ref()
    }

    /// Time since the first hit, frozen at the last hit once finished
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => self.clock.now().duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Live accuracy; 100 before any click
    pub fn accuracy(&self) -> f64 {
        accuracy_percent(self.targets_hit as usize, self.total_clicks as usize)
    }

    /// Live clicks per second; 0 until time has passed
    pub fn cps(&self) -> f64 {
        per_second(self.targets_hit, self.elapsed().as_secs_f64())
    }

    fn ensure_playing(&self, op: &'static str) -> Result<(), SessionError> {
        if self.phase.is_playing() {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                op,
                phase: self.phase,
            })
        }
    }

    fn fits(&self, target: &Target) -> bool {
        let padding = self.target_diameter / 2.0 + TARGET_PADDING;
        target.diameter == self.target_diameter
            && coord_fits(target.x, self.area.width, padding)
            && coord_fits(target.y, self.area.height, padding)
    }

    fn generate_target(&mut self) -> Target {
        let padding = self.target_diameter / 2.0 + TARGET_PADDING;
        let x = random_coord(&mut self.rng, self.area.width, padding);
        let y = random_coord(&mut self.rng, self.area.height, padding);
        self.next_target_id += 1;
        Target {
            id: self.next_target_id,
            x,
            y,
            diameter: self.target_diameter,
        }
    }
}

fn random_coord<R: Rng>(rng: &mut R, extent: f64, padding: f64) -> f64 {
    let span = extent - padding * 2.0;
    if span > 0.0 {
        rng.gen_range(0.0..span) + padding
    } else {
        extent / 2.0
    }
}

/// Whether `coord` is a position `random_coord` could have produced
fn coord_fits(coord: f64, extent: f64, padding: f64) -> bool {
    if extent - padding * 2.0 > 0.0 {
        coord >= padding && coord <= extent - padding
    } else {
        coord == extent / 2.0
    }
}

fn per_second(count: u32, secs: f64) -> f64 {
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}
