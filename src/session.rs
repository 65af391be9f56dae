use serde::{Deserialize, Serialize};

/// Lifecycle shared by both benchmark games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    Finished,
}

impl Phase {
    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Finished)
    }
}

/// Accuracy as a percentage of `correct` over `total`, 100 when nothing was attempted
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        (correct as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_defaults_to_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
        assert!(!Phase::Idle.is_playing());
        assert!(Phase::Playing.is_playing());
        assert!(Phase::Finished.is_finished());
    }

    #[test]
    fn phase_displays_lowercase() {
        assert_eq!(Phase::Playing.to_string(), "playing");
        assert_eq!(Phase::Finished.to_string(), "finished");
    }

    #[test]
    fn accuracy_of_nothing_is_perfect() {
        assert_eq!(accuracy_percent(0, 0), 100.0);
        assert_eq!(accuracy_percent(5, 8), 62.5);
        assert_eq!(accuracy_percent(0, 4), 0.0);
    }
}
