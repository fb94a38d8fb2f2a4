//! Persisted voice settings, including the context timing table.

use serde::{Deserialize, Serialize};

use super::SpeechContext;

/// Pre-speech delays in milliseconds, keyed by context through
/// [`TimingSettings::delay_for`]. `overlap_prevention` is the minimum
/// silence enforced between any two utterances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingSettings {
    #[serde(default)]
    pub immediate: u64,
    #[serde(default = "d_quick")]
    pub quick: u64,
    #[serde(default = "d_normal")]
    pub normal: u64,
    #[serde(default = "d_instruction")]
    pub instruction: u64,
    #[serde(default = "d_celebration")]
    pub celebration: u64,
    #[serde(default = "d_error")]
    pub error: u64,
    #[serde(default = "d_overlap")]
    pub overlap_prevention: u64,
}

fn d_quick() -> u64 {
    300
}
fn d_normal() -> u64 {
    800
}
fn d_instruction() -> u64 {
    1200
}
fn d_celebration() -> u64 {
    500
}
fn d_error() -> u64 {
    100
}
fn d_overlap() -> u64 {
    200
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            immediate: 0,
            quick: d_quick(),
            normal: d_normal(),
            instruction: d_instruction(),
            celebration: d_celebration(),
            error: d_error(),
            overlap_prevention: d_overlap(),
        }
    }
}

impl TimingSettings {
    /// Default pre-speech delay for a context, used when the caller does
    /// not supply an explicit delay.
    pub fn delay_for(&self, context: SpeechContext) -> u64 {
        match context {
            SpeechContext::TaskCompletion => self.celebration,
            SpeechContext::Behavior => self.quick,
            SpeechContext::ExerciseInstruction => self.instruction,
            SpeechContext::Error => self.error,
            SpeechContext::TimerComplete => self.celebration,
            SpeechContext::Breathing => self.immediate,
            SpeechContext::Success => self.quick,
            SpeechContext::Sos | SpeechContext::General => self.normal,
        }
    }
}

/// Voice configuration, persisted on its own storage key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceSettings {
    /// Index into the enumerated voice list, if one has been chosen.
    #[serde(default)]
    pub selected_voice: Option<usize>,
    #[serde(default = "d_speed")]
    pub speed: f32,
    #[serde(default = "d_pitch")]
    pub pitch: f32,
    #[serde(default = "d_volume")]
    pub volume: f32,
    #[serde(default = "d_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub timing: TimingSettings,
}

fn d_speed() -> f32 {
    0.9
}
fn d_pitch() -> f32 {
    1.0
}
fn d_volume() -> f32 {
    0.7
}
fn d_enabled() -> bool {
    true
}

impl Default for VoiceSettings {
    fn default() -> Self {
        VoiceSettings {
            selected_voice: None,
            speed: d_speed(),
            pitch: d_pitch(),
            volume: d_volume(),
            enabled: true,
            timing: TimingSettings::default(),
        }
    }
}
