use chrono::{DateTime, Utc};
use std::time::Duration;
use time_humanize::{Accuracy, HumanTime, Tense};

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// "5 minutes ago" style label for a score timestamp relative to `now`
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 5 {
        return "just now".to_string();
    }
    HumanTime::from(Duration::from_secs(secs as u64)).to_text_en(Accuracy::Rough, Tense::Past)
}
