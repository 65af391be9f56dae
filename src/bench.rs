//! Entry points a front-end drives: both game sessions, the one-second typing
//! timer, and the score store they report into.

use log::debug;
use rand::Rng;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::aim::{AimSession, PlayArea};
use crate::clock::Clock;
use crate::error::SessionError;
use crate::history::{HistoryBackend, ScoreStore};
use crate::runtime::Interval;
use crate::score::{AimScore, ScoreHistory, TypingScore};
use crate::typing::TypingSession;

pub struct Bench<B: HistoryBackend, C: Clock, R: Rng> {
    store: ScoreStore<B>,
    aim: AimSession<C, R>,
    typing: TypingSession<C, R>,
    typing_timer: Interval,
    clock: C,
}

impl<B: HistoryBackend, C: Clock, R: Rng> Bench<B, C, R> {
    pub fn new(
        store: ScoreStore<B>,
        aim: AimSession<C, R>,
        typing: TypingSession<C, R>,
        clock: C,
    ) -> Self {
        Self {
            store,
            aim,
            typing,
            typing_timer: Interval::new(Duration::from_secs(1)),
            clock,
        }
    }

    pub fn aim(&self) -> &AimSession<C, R> {
        &self.aim
    }

    pub fn typing(&self) -> &TypingSession<C, R> {
        &self.typing
    }

    pub fn history(&self) -> &ScoreHistory {
        self.store.history()
    }

    pub fn subscribe(&mut self) -> Receiver<ScoreHistory> {
        self.store.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn clear_scores(&mut self) {
        self.store.clear();
    }

    pub fn start_aim(&mut self) {
        self.aim.start();
    }

    pub fn set_play_area(&mut self, area: PlayArea, target_diameter: f64) {
        self.aim.set_play_area(area, target_diameter);
    }

    pub fn register_hit(&mut self) -> Option<AimScore> {
        let result = self.aim.register_hit();
        self.record_aim(result)
    }

    pub fn register_miss(&mut self) {
        settle(self.aim.register_miss());
    }

    pub fn click(&mut self, x: f64, y: f64) -> Option<AimScore> {
        let result = self.aim.click(x, y);
        self.record_aim(result)
    }

    pub fn start_typing(&mut self) {
        self.typing_timer.cancel();
        self.typing.start();
    }

    pub fn apply_input(&mut self, typed: &str) -> Option<TypingScore> {
        let result = self.typing.apply_input(typed);
        if self.typing.phase().is_playing()
            && self.typing.has_started()
            && !self.typing_timer.is_armed()
        {
            self.typing_timer.arm(self.clock.now());
        }
        self.record_typing(result)
    }

    pub fn push_char(&mut self, c: char) -> Option<TypingScore> {
        let mut typed = self.typing.typed_text().to_string();
        typed.push(c);
        self.apply_input(&typed)
    }

    pub fn pop_char(&mut self) -> Option<TypingScore> {
        let mut typed = self.typing.typed_text().to_string();
        typed.pop();
        self.apply_input(&typed)
    }

    /// One second of the typing countdown
    pub fn tick(&mut self) -> Option<TypingScore> {
        let result = self.typing.tick();
        self.record_typing(result)
    }

    /// Fires any one-second ticks that came due; call on every runtime tick
    pub fn advance(&mut self) -> Option<TypingScore> {
        let due = self.typing_timer.poll(self.clock.now());
        for _ in 0..due {
            if let Some(score) = self.tick() {
                return Some(score);
            }
            if !self.typing_timer.is_armed() {
                break;
            }
        }
        None
    }

    /// Whether the typing countdown is scheduled
    pub fn is_timer_running(&self) -> bool {
        self.typing_timer.is_armed()
    }

    /// The hosting view is going away: stop scheduled ticks
    pub fn leave(&mut self) {
        self.typing_timer.cancel();
    }

    fn record_aim(&mut self, result: Result<Option<AimScore>, SessionError>) -> Option<AimScore> {
        let score = settle(result).flatten()?;
        self.store.append(score.clone());
        Some(score)
    }

    fn record_typing(
        &mut self,
        result: Result<Option<TypingScore>, SessionError>,
    ) -> Option<TypingScore> {
        if !self.typing.phase().is_playing() {
            self.typing_timer.cancel();
        }
        let score = settle(result).flatten()?;
        self.store.append(score.clone());
        Some(score)
    }
}

/// Invalid transitions are no-ops for the player
fn settle<T>(result: Result<T, SessionError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("ignored: {e}");
            None
        }
    }
}
