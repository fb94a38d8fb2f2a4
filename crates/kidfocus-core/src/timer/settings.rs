//! Persisted timer settings.
//!
//! These live in their own storage key, separate from the main document,
//! and carry their own bounds validation at save time. Those bounds are
//! deliberately independent of the 1..=120 check applied when a run is
//! started.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerSettings {
    #[serde(default = "default_focus")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_focus() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            focus_minutes: default_focus(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            auto_start_breaks: false,
            sound_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Per-field bounds checked when the settings form is saved. Invalid
    /// input blocks the save with a message naming the field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(5..=90).contains(&self.focus_minutes) {
            return Err(ValidationError::invalid(
                "focus_minutes",
                "Focus time must be between 5 and 90 minutes",
            ));
        }
        if !(2..=30).contains(&self.short_break_minutes) {
            return Err(ValidationError::invalid(
                "short_break_minutes",
                "Short break must be between 2 and 30 minutes",
            ));
        }
        if !(5..=60).contains(&self.long_break_minutes) {
            return Err(ValidationError::invalid(
                "long_break_minutes",
                "Long break must be between 5 and 60 minutes",
            ));
        }
        Ok(())
    }
}
