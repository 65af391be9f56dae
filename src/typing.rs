use log::info;
use rand::Rng;
use std::time::Instant;

use crate::clock::Clock;
use crate::corpus::Corpus;
use crate::error::SessionError;
use crate::score::TypingScore;
use crate::session::{accuracy_percent, Phase};

/// Length of a typing test in seconds
pub const TEST_DURATION_SECS: u32 = 60;

/// How a prompt character renders against what has been typed so far
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum CharState {
    Pending,
    Correct,
    Incorrect,
    Cursor,
}

/// represents a typing test in progress
#[derive(Debug)]
pub struct TypingSession<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    corpus: Corpus,
    phase: Phase,
    source_text: String,
    typed_text: String,
    remaining_secs: u32,
    started_at: Option<Instant>,
    score: Option<TypingScore>,
}

impl<C: Clock, R: Rng> TypingSession<C, R> {
    pub fn new(clock: C, rng: R, corpus: Corpus) -> Self {
        Self {
            clock,
            rng,
            corpus,
            phase: Phase::Idle,
            source_text: String::new(),
            typed_text: String::new(),
            remaining_secs: TEST_DURATION_SECS,
            started_at: None,
            score: None,
        }
    }

    pub fn start(&mut self) {
        self.source_text = self.corpus.pick(&mut self.rng).to_string();
        self.typed_text.clear();
        self.remaining_secs = TEST_DURATION_SECS;
        self.started_at = None;
        self.score = None;
        self.phase = Phase::Playing;
    }

    /// Replaces the typed text. Finishes immediately once it covers the prompt.
    pub fn apply_input(&mut self, typed: &str) -> Result<Option<TypingScore>, SessionError> {
        self.ensure_playing("apply input")?;

        if self.started_at.is_none() && !typed.is_empty() {
            self.started_at = Some(self.clock.now());
        }
        self.typed_text.clear();
        self.typed_text.push_str(typed);

        if self.typed_text.chars().count() >= self.source_text.chars().count() {
            return Ok(Some(self.finalize()));
        }
        Ok(None)
    }

    /// One second of wall-clock time. No-op until the first keystroke.
    pub fn tick(&mut self) -> Result<Option<TypingScore>, SessionError> {
        self.ensure_playing("tick")?;
        if self.started_at.is_none() {
            return Ok(None);
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Ok(Some(self.finalize()));
        }
        Ok(None)
    }

    fn finalize(&mut self) -> TypingScore {
        self.phase = Phase::Finished;

        let elapsed_minutes = self.elapsed_minutes().max(1.0 / 60.0);
        let score = TypingScore {
            words_per_minute: (words_in(&self.typed_text) as f64 / elapsed_minutes).round() as u32,
            accuracy: self.accuracy(),
            characters_typed: self.typed_text.chars().count(),
            timestamp: self.clock.timestamp(),
        };
        info!(
            "typing session finished: {} wpm, {:.1}% accuracy, {} chars",
            score.words_per_minute, score.accuracy, score.characters_typed
        );
        self.score = Some(score.clone());
        score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn score(&self) -> Option<&TypingScore> {
        self.score.as_ref()
    }

    /// Positional matches over typed length; 100 when nothing is typed
    pub fn accuracy(&self) -> f64 {
        let correct = self
            .typed_text
            .chars()
            .zip(self.source_text.chars())
            .filter(|(typed, expected)| typed == expected)
            .count();
        accuracy_percent(correct, self.typed_text.chars().count())
    }

    /// Live words per minute; 0 before the clock starts or the first tick
    pub fn wpm(&self) -> u32 {
        if self.started_at.is_none() {
            return 0;
        }
        let minutes = self.elapsed_minutes();
        if minutes > 0.0 {
            (words_in(&self.typed_text) as f64 / minutes).round() as u32
        } else {
            0
        }
    }

    /// Classifies every prompt character for display
    pub fn char_states(&self) -> Vec<(char, CharState)> {
        let typed: Vec<char> = self.typed_text.chars().collect();
        self.source_text
            .chars()
            .enumerate()
            .map(|(idx, expected)| {
                let state = match typed.get(idx) {
                    Some(&c) if c == expected => CharState::Correct,
                    Some(_) => CharState::Incorrect,
                    None if idx == typed.len() => CharState::Cursor,
                    None => CharState::Pending,
                };
                (expected, state)
            })
            .collect()
    }

    fn elapsed_minutes(&self) -> f64 {
        (TEST_DURATION_SECS - self.remaining_secs) as f64 / 60.0
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
}

/// Whitespace-delimited, non-empty tokens
pub fn words_in(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(prompt: &str) -> TypingSession<ManualClock, StdRng> {
        TypingSession::new(
            ManualClock::new(),
            StdRng::seed_from_u64(11),
            Corpus::single(prompt).unwrap(),
        )
    }

    #[test]
    fn start_picks_a_prompt_and_resets() {
        let mut s = TypingSession::new(
            ManualClock::new(),
            StdRng::seed_from_u64(5),
            Corpus::bundled("prose").unwrap(),
        );
        assert_eq!(s.phase(), Phase::Idle);

        s.start();
        assert_eq!(s.phase(), Phase::Playing);
        assert!(!s.source_text().is_empty());
        assert_eq!(s.typed_text(), "");
        assert_eq!(s.remaining_secs(), TEST_DURATION_SECS);
        assert!(!s.has_started());
    }

    #[test]
    fn accuracy_counts_positional_matches_over_typed_length() {
        let mut s = session("hello world");
        s.start();
        s.apply_input("helloxxx").unwrap();
        assert_eq!(s.accuracy(), 62.5);

        // index 7 of "hello world" is an 'o', so that one lines up
        s.apply_input("helloooo").unwrap();
        assert_eq!(s.accuracy(), 75.0);
    }

    #[test]
    fn accuracy_is_perfect_before_typing() {
        let mut s = session("hello world");
        s.start();
        assert_eq!(s.accuracy(), 100.0);
    }

    #[test]
    fn clock_starts_on_first_nonempty_input() {
        let mut s = session("hello world");
        s.start();
        s.apply_input("").unwrap();
        assert!(!s.has_started());
        assert_eq!(s.tick().unwrap(), None);
        assert_eq!(s.remaining_secs(), TEST_DURATION_SECS);

        s.apply_input("h").unwrap();
        assert!(s.has_started());
        s.tick().unwrap();
        assert_eq!(s.remaining_secs(), TEST_DURATION_SECS - 1);
    }

    #[test]
    fn completing_the_prompt_finishes_early() {
        let mut s = session("one two three four");
        s.start();
        s.apply_input("one").unwrap();
        for _ in 0..15 {
            assert_eq!(s.tick().unwrap(), None);
        }

        let score = s
            .apply_input("one two three four")
            .unwrap()
            .expect("finishes on full prompt");

        assert_eq!(s.phase(), Phase::Finished);
        assert_eq!(s.remaining_secs(), 45);
        // 4 words in a quarter minute
        assert_eq!(score.words_per_minute, 16);
        assert_eq!(score.accuracy, 100.0);
        assert_eq!(score.characters_typed, 18);
    }

    #[test]
    fn running_out_of_time_finishes() {
        let mut s = session("the quick brown fox jumps over the lazy dog");
        s.start();
        s.apply_input("the quick brwn").unwrap();

        let mut finals = Vec::new();
        for _ in 0..TEST_DURATION_SECS + 5 {
            match s.tick() {
                Ok(Some(score)) => finals.push(score),
                Ok(None) => {}
                Err(_) => break,
            }
        }

        assert_eq!(finals.len(), 1);
        assert_eq!(s.remaining_secs(), 0);
        assert_eq!(finals[0].words_per_minute, 3);
        assert_eq!(finals[0].characters_typed, 14);
    }

    #[test]
    fn instant_finish_guards_against_zero_minutes() {
        let mut s = session("hi there");
        s.start();
        let score = s.apply_input("hi there").unwrap().unwrap();
        // 2 words over the 1/60 minute floor
        assert_eq!(score.words_per_minute, 120);
    }

    #[test]
    fn overlong_input_still_finishes() {
        let mut s = session("abc");
        s.start();
        let score = s.apply_input("abxd").unwrap().unwrap();
        assert_eq!(score.characters_typed, 4);
        assert_eq!(score.accuracy, 50.0);
    }

    #[test]
    fn shorter_input_is_accepted_as_given() {
        let mut s = session("hello world");
        s.start();
        s.apply_input("hellx").unwrap();
        s.apply_input("hell").unwrap();
        assert_eq!(s.typed_text(), "hell");
        assert_eq!(s.accuracy(), 100.0);
    }

    #[test]
    fn input_outside_play_is_rejected() {
        let mut s = session("hello");
        assert_matches!(
            s.apply_input("h"),
            Err(SessionError::InvalidTransition {
                phase: Phase::Idle,
                ..
            })
        );
        s.start();
        s.apply_input("hello").unwrap();
        assert_matches!(s.tick(), Err(SessionError::InvalidTransition { .. }));
        assert_matches!(s.apply_input("hello!"), Err(_));
        assert_eq!(s.typed_text(), "hello");
    }

    #[test]
    fn live_wpm_tracks_elapsed_ticks() {
        let mut s = session("alpha beta gamma delta epsilon zeta");
        s.start();
        assert_eq!(s.wpm(), 0);

        s.apply_input("alpha beta").unwrap();
        assert_eq!(s.wpm(), 0);
        for _ in 0..30 {
            s.tick().unwrap();
        }
        assert_eq!(s.wpm(), 4);
    }

    #[test]
    fn char_states_classify_each_position() {
        let mut s = session("abcd");
        s.start();
        s.apply_input("ax").unwrap();

        let states: Vec<CharState> = s.char_states().into_iter().map(|(_, st)| st).collect();
        assert_eq!(
            states,
            vec![
                CharState::Correct,
                CharState::Incorrect,
                CharState::Cursor,
                CharState::Pending
            ]
        );
    }

    #[test]
    fn words_ignore_extra_whitespace() {
        assert_eq!(words_in("  hello   world \t again "), 3);
        assert_eq!(words_in("   "), 0);
    }
}
