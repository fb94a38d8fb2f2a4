//! Terminal implementations of the platform capability seams.
//!
//! Narration prints to stdout with a busy window proportional to the
//! text length, so pacing behaves like a real speech engine. Audio
//! prints what it would play.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use kidfocus_core::{
    AudioSink, CapabilityError, SpeechEngine, Utterance, VoiceInfo,
};
use kidfocus_core::audio::{AmbientSpec, ToneSpec};

/// Rough speaking pace used to simulate utterance length.
const MS_PER_CHAR: u64 = 50;

pub struct ConsoleEngine {
    busy_until: Mutex<Option<Instant>>,
}

impl ConsoleEngine {
    pub fn new() -> Self {
        ConsoleEngine {
            busy_until: Mutex::new(None),
        }
    }
}

impl Default for ConsoleEngine {
    fn default() -> Self {
        ConsoleEngine::new()
    }
}

impl SpeechEngine for ConsoleEngine {
    fn speak(&self, utterance: &Utterance) -> Result<(), CapabilityError> {
        println!("🔊 {}", utterance.text);
        let speak_ms = utterance.text.chars().count() as u64 * MS_PER_CHAR;
        // Slower rates stretch the simulated utterance.
        let speak_ms = (speak_ms as f32 / utterance.rate.max(0.1)) as u64;
        *self.busy_until.lock() = Some(Instant::now() + Duration::from_millis(speak_ms));
        Ok(())
    }

    fn cancel(&self) {
        *self.busy_until.lock() = None;
    }

    fn is_busy(&self) -> bool {
        self.busy_until
            .lock()
            .is_some_and(|until| Instant::now() < until)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            name: "Console".to_string(),
            lang: "en-US".to_string(),
            default: true,
        }]
    }
}

pub struct ConsoleSink;

impl AudioSink for ConsoleSink {
    fn play_tone(&self, spec: &ToneSpec) -> Result<u64, CapabilityError> {
        println!("♪ tone {}Hz for {:.1}s", spec.frequency_hz, spec.duration_secs);
        Ok(0)
    }

    fn play_ambient(&self, spec: &AmbientSpec) -> Result<u64, CapabilityError> {
        println!("♪ ambient loop: {}", spec.name);
        Ok(0)
    }

    fn play_buffer(&self, samples: &[f32], looped: bool) -> Result<u64, CapabilityError> {
        println!(
            "♪ generated buffer ({} samples{})",
            samples.len(),
            if looped { ", looping" } else { "" }
        );
        Ok(0)
    }

    fn stop(&self, _handle: u64) {}
}
