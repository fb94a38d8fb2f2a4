//! Canned narration phrases.
//!
//! Congratulation messages rotate deterministically through a small set
//! so narration stays varied but testable.

use serde::{Deserialize, Serialize};

/// Spoken when the focus timer completes.
pub const TIMER_COMPLETE: &str = "Timer finished! Great job staying focused!";

/// Breathing cycle phase, used to key the spoken cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

pub(crate) fn task_completion(cursor: usize, task: &str) -> String {
    match cursor % 4 {
        0 => format!("Great job completing {task}!"),
        1 => format!("Awesome! You finished {task}!"),
        2 => format!("Well done on {task}!"),
        _ => format!("Excellent work finishing {task}!"),
    }
}

pub(crate) fn behavior_encouragement(cursor: usize, behavior: &str) -> String {
    let behavior = behavior.to_lowercase();
    match cursor % 4 {
        0 => format!("Amazing! You're being so {behavior}!"),
        1 => format!("Wonderful {behavior} behavior!"),
        2 => format!("Keep up that {behavior} attitude!"),
        _ => format!("I love seeing you be so {behavior}!"),
    }
}

pub(crate) fn breathing_cue(phase: BreathPhase, count: Option<u32>) -> String {
    let cue = match phase {
        BreathPhase::Inhale => "Breathe in...",
        BreathPhase::HoldIn | BreathPhase::HoldOut => "Hold...",
        BreathPhase::Exhale => "Breathe out...",
    };
    match count {
        Some(count) => format!("{cue} {count}"),
        None => cue.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycles_through_all_messages() {
        let all: Vec<_> = (0..4).map(|i| task_completion(i, "Brush teeth")).collect();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|m| m.contains("Brush teeth")));
        assert_eq!(task_completion(4, "Brush teeth"), all[0]);
    }

    #[test]
    fn behavior_phrases_lowercase_the_name() {
        assert!(behavior_encouragement(0, "Sharing").contains("sharing"));
    }

    #[test]
    fn breathing_cues() {
        assert_eq!(breathing_cue(BreathPhase::Inhale, Some(4)), "Breathe in... 4");
        assert_eq!(breathing_cue(BreathPhase::HoldIn, Some(2)), "Hold... 2");
        assert_eq!(breathing_cue(BreathPhase::Exhale, None), "Breathe out...");
    }
}
