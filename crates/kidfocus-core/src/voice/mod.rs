//! Spoken-feedback subsystem.
//!
//! The platform speech capability can speak a single utterance at a time
//! and has no queueing or priority of its own. [`NarrationQueue`] layers
//! both on top: callers enqueue text with a context, and a cooperative
//! drain task serializes and paces the actual engine calls.

pub mod phrases;
pub mod queue;
pub mod settings;

pub use phrases::BreathPhase;
pub use queue::NarrationQueue;
pub use settings::{TimingSettings, VoiceSettings};

use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// Tag selecting the default timing policy for a spoken message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechContext {
    TaskCompletion,
    Behavior,
    ExerciseInstruction,
    Error,
    TimerComplete,
    Breathing,
    Success,
    Sos,
    General,
}

/// Narration priority. High priority preempts the pending queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Per-call speech options. Unset fields fall back to the voice settings
/// and the context timing table.
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    pub context: SpeechContext,
    pub priority: Priority,
    /// Cancel the in-flight utterance and clear the queue, then speak as
    /// soon as the cancellation settles.
    pub interrupt: bool,
    /// Explicit pre-speech delay, overriding the context default.
    pub delay_ms: Option<u64>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

impl Default for SpeechContext {
    fn default() -> Self {
        SpeechContext::General
    }
}

/// A fully resolved utterance handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Index into the enumerated voice list; `None` uses the engine's
    /// default voice.
    pub voice: Option<usize>,
}

/// One enumerated platform voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
    pub default: bool,
}

/// The single-utterance external speech capability.
///
/// Implementations are treated as unreliable: `voices()` may be empty
/// until some platform event fires, completion events may never arrive
/// (hence the queue polls `is_busy()`), and `speak` may fail outright.
pub trait SpeechEngine: Send + Sync {
    /// Whether the platform supports speech at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Begin speaking. Fire-and-forget: completion is observed through
    /// `is_busy`, not a callback.
    fn speak(&self, utterance: &Utterance) -> Result<(), CapabilityError>;

    /// Cancel the in-flight utterance, if any. Idempotent.
    fn cancel(&self);

    /// Whether an utterance is currently speaking or pending.
    fn is_busy(&self) -> bool;

    /// Enumerate available voices. May legitimately return an empty list
    /// before the platform has populated it.
    fn voices(&self) -> Vec<VoiceInfo>;
}

/// Engine used when the platform has no speech capability. Narration
/// degrades to a no-op without blocking any flow.
pub struct NullEngine;

impl SpeechEngine for NullEngine {
    fn is_supported(&self) -> bool {
        false
    }

    fn speak(&self, _utterance: &Utterance) -> Result<(), CapabilityError> {
        Err(CapabilityError::SpeechUnavailable)
    }

    fn cancel(&self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }
}
