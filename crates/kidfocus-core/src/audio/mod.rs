//! Audio manager: one registry for every sound-producing handle.
//!
//! Tones, ambient loops, and noise beds are started through here so a
//! single `stop_all()` deterministically silences everything regardless
//! of which subsystem started it. The manager also owns the shared audio
//! context lifecycle: created on demand, resumed on first use, suspended
//! once everything is stopped.

pub mod synth;

pub use synth::{
    brown_noise, white_noise, AmbientSpec, NoiseKind, ToneSpec, Waveform, CALMING_CHIME, FOREST,
    HEARTBEAT_BPM, HELP_ALERT_TONE, MINDFULNESS_BELL, OCEAN, RAIN, SUCCESS_DING,
    TIMER_COMPLETE_TONE, TIMER_START_TONE,
};

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::CapabilityError;

/// Opaque handle to a sound the sink has started.
pub type HandleId = u64;

/// The externally owned playback capability. Best-effort: `stop` must
/// tolerate handles that already finished or were never known.
pub trait AudioSink: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    fn play_tone(&self, spec: &ToneSpec) -> Result<HandleId, CapabilityError>;

    fn play_ambient(&self, spec: &AmbientSpec) -> Result<HandleId, CapabilityError>;

    /// Play a generated sample buffer, optionally looping.
    fn play_buffer(&self, samples: &[f32], looped: bool) -> Result<HandleId, CapabilityError>;

    /// Stop one handle. Idempotent; unknown handles are ignored.
    fn stop(&self, handle: HandleId);
}

/// Sink used when the platform has no audio output.
pub struct NullSink;

impl AudioSink for NullSink {
    fn is_supported(&self) -> bool {
        false
    }

    fn play_tone(&self, _spec: &ToneSpec) -> Result<HandleId, CapabilityError> {
        Err(CapabilityError::AudioUnavailable)
    }

    fn play_ambient(&self, _spec: &AmbientSpec) -> Result<HandleId, CapabilityError> {
        Err(CapabilityError::AudioUnavailable)
    }

    fn play_buffer(&self, _samples: &[f32], _looped: bool) -> Result<HandleId, CapabilityError> {
        Err(CapabilityError::AudioUnavailable)
    }

    fn stop(&self, _handle: HandleId) {}
}

/// Shared audio context lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Nothing has asked for audio yet.
    Uninitialized,
    /// The context exists and playback is allowed.
    Running,
    /// Everything stopped; the context is parked until the next play.
    Suspended,
}

/// Registry of active sound handles plus the context state machine.
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct AudioManager {
    sink: Arc<dyn AudioSink>,
    active: Arc<Mutex<Vec<HandleId>>>,
    state: Arc<Mutex<ContextState>>,
}

impl AudioManager {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        AudioManager {
            sink,
            active: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(ContextState::Uninitialized)),
        }
    }

    pub fn context_state(&self) -> ContextState {
        *self.state.lock()
    }

    /// Play a tone. Degrades to a warning when audio is unavailable;
    /// never blocks the calling flow.
    pub fn play_tone(&self, spec: &ToneSpec) {
        self.ensure_running();
        match self.sink.play_tone(spec) {
            Ok(handle) => self.track(handle),
            Err(e) => warn!(error = %e, "tone playback unavailable"),
        }
    }

    /// Start an ambient loop, silencing anything already playing first.
    pub fn play_ambient(&self, spec: &AmbientSpec) {
        self.stop_all();
        self.ensure_running();
        match self.sink.play_ambient(spec) {
            Ok(handle) => self.track(handle),
            Err(e) => warn!(error = %e, name = spec.name, "ambient playback unavailable"),
        }
    }

    /// Generate and loop a noise bed, silencing anything already playing
    /// first. Two seconds of samples at 48kHz, like the original buffers.
    pub fn play_noise(&self, kind: NoiseKind, seed: u64) {
        self.stop_all();
        self.ensure_running();
        let samples = match kind {
            NoiseKind::White => synth::white_noise(96_000, seed),
            NoiseKind::Brown => synth::brown_noise(96_000, seed),
        };
        match self.sink.play_buffer(&samples, true) {
            Ok(handle) => self.track(handle),
            Err(e) => warn!(error = %e, ?kind, "noise playback unavailable"),
        }
    }

    /// Register a handle started elsewhere so `stop_all` reaches it.
    /// Handles must be registered before or immediately upon starting
    /// playback.
    pub fn track(&self, handle: HandleId) {
        self.active.lock().push(handle);
    }

    /// Silence every registered handle. Tolerates handles that already
    /// stopped; idempotent. Suspends the context afterwards.
    pub fn stop_all(&self) {
        let handles: Vec<HandleId> = std::mem::take(&mut *self.active.lock());
        debug!(count = handles.len(), "stopping all sounds");
        for handle in handles {
            self.sink.stop(handle);
        }
        let mut state = self.state.lock();
        if *state == ContextState::Running {
            *state = ContextState::Suspended;
        }
    }

    fn ensure_running(&self) {
        let mut state = self.state.lock();
        match *state {
            ContextState::Uninitialized | ContextState::Suspended => {
                *state = ContextState::Running;
            }
            ContextState::Running => {}
        }
    }
}

/// Sink that records what it was asked to play. Useful for tests and
/// headless runs.
#[derive(Default)]
pub struct RecordingSink {
    inner: Mutex<RecordingState>,
}

#[derive(Default)]
struct RecordingState {
    next_handle: HandleId,
    started: Vec<(HandleId, String)>,
    stopped: Vec<HandleId>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    /// Descriptions of every started sound, in order.
    pub fn started(&self) -> Vec<String> {
        self.inner
            .lock()
            .started
            .iter()
            .map(|(_, desc)| desc.clone())
            .collect()
    }

    pub fn stopped(&self) -> Vec<HandleId> {
        self.inner.lock().stopped.clone()
    }

    fn begin(&self, description: String) -> HandleId {
        let mut inner = self.inner.lock();
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.started.push((handle, description));
        handle
    }
}

impl AudioSink for RecordingSink {
    fn play_tone(&self, spec: &ToneSpec) -> Result<HandleId, CapabilityError> {
        Ok(self.begin(format!(
            "tone {}hz {:.1}s",
            spec.frequency_hz, spec.duration_secs
        )))
    }

    fn play_ambient(&self, spec: &AmbientSpec) -> Result<HandleId, CapabilityError> {
        Ok(self.begin(format!("ambient {}", spec.name)))
    }

    fn play_buffer(&self, samples: &[f32], looped: bool) -> Result<HandleId, CapabilityError> {
        Ok(self.begin(format!("buffer {} samples looped={looped}", samples.len())))
    }

    fn stop(&self, handle: HandleId) {
        // Stopping an unknown or finished handle is fine.
        self.inner.lock().stopped.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (AudioManager, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (AudioManager::new(sink.clone()), sink)
    }

    #[test]
    fn play_tone_registers_and_stop_all_silences() {
        let (audio, sink) = manager();
        audio.play_tone(&TIMER_START_TONE);
        audio.play_tone(&TIMER_COMPLETE_TONE);
        assert_eq!(sink.started().len(), 2);

        audio.stop_all();
        assert_eq!(sink.stopped().len(), 2);
    }

    #[test]
    fn stop_all_is_idempotent() {
        let (audio, sink) = manager();
        audio.play_tone(&SUCCESS_DING);
        audio.stop_all();
        audio.stop_all();
        audio.stop_all();
        assert_eq!(sink.stopped().len(), 1);
    }

    #[test]
    fn ambient_replaces_whatever_was_playing() {
        let (audio, sink) = manager();
        audio.play_noise(NoiseKind::Brown, 1);
        audio.play_ambient(&OCEAN);
        // The noise handle was stopped before ocean started.
        assert_eq!(sink.stopped().len(), 1);
        assert_eq!(sink.started().last().unwrap(), "ambient ocean");
    }

    #[test]
    fn context_lifecycle() {
        let (audio, _sink) = manager();
        assert_eq!(audio.context_state(), ContextState::Uninitialized);
        audio.play_tone(&CALMING_CHIME);
        assert_eq!(audio.context_state(), ContextState::Running);
        audio.stop_all();
        assert_eq!(audio.context_state(), ContextState::Suspended);
        audio.play_tone(&CALMING_CHIME);
        assert_eq!(audio.context_state(), ContextState::Running);
    }

    #[test]
    fn unsupported_sink_never_blocks() {
        let audio = AudioManager::new(Arc::new(NullSink));
        audio.play_tone(&TIMER_START_TONE);
        audio.play_noise(NoiseKind::White, 3);
        audio.stop_all();
        assert_eq!(audio.context_state(), ContextState::Suspended);
    }
}
