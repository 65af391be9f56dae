use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of scores kept per game
pub const HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum GameKind {
    #[serde(rename = "aimTrainer")]
    #[strum(serialize = "aim trainer")]
    AimTrainer,
    #[serde(rename = "typingTest")]
    #[strum(serialize = "typing test")]
    TypingTest,
}

/// Finalized aim trainer result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AimScore {
    /// seconds between the first and last hit
    pub time: f64,
    pub accuracy: f64,
    /// targets hit per second
    pub cps: f64,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
}

/// Finalized typing test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingScore {
    #[serde(alias = "wpm")]
    pub words_per_minute: u32,
    pub accuracy: f64,
    #[serde(alias = "chars")]
    pub characters_typed: usize,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Score {
    Aim(AimScore),
    Typing(TypingScore),
}

impl Score {
    pub fn kind(&self) -> GameKind {
        match self {
            Score::Aim(_) => GameKind::AimTrainer,
            Score::Typing(_) => GameKind::TypingTest,
        }
    }
}

impl From<AimScore> for Score {
    fn from(s: AimScore) -> Self {
        Score::Aim(s)
    }
}

impl From<TypingScore> for Score {
    fn from(s: TypingScore) -> Self {
        Score::Typing(s)
    }
}

/// Newest-first bounded score lists, one per game.
///
/// Field names match the persisted blob: `{ aimTrainer: [...], typingTest: [...] }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistory {
    #[serde(default)]
    pub aim_trainer: VecDeque<AimScore>,
    #[serde(default)]
    pub typing_test: VecDeque<TypingScore>,
}

impl ScoreHistory {
    pub fn is_empty(&self) -> bool {
        self.aim_trainer.is_empty() && self.typing_test.is_empty()
    }

    pub fn len(&self, kind: GameKind) -> usize {
        match kind {
            GameKind::AimTrainer => self.aim_trainer.len(),
            GameKind::TypingTest => self.typing_test.len(),
        }
    }

    /// Insert at the head, evicting from the tail past capacity
    pub fn push(&mut self, score: Score) {
        match score {
            Score::Aim(s) => push_bounded(&mut self.aim_trainer, s),
            Score::Typing(s) => push_bounded(&mut self.typing_test, s),
        }
    }

    /// Drop anything past capacity, keeping the newest entries
    pub fn truncate(&mut self) {
        self.aim_trainer.truncate(HISTORY_CAPACITY);
        self.typing_test.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.aim_trainer.clear();
        self.typing_test.clear();
    }
}

fn push_bounded<T>(list: &mut VecDeque<T>, item: T) {
    list.push_front(item);
    list.truncate(HISTORY_CAPACITY);
}
