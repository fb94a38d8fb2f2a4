//! Sound descriptions and sample generation.
//!
//! The core describes sounds as data and generates noise buffers as pure
//! functions; an [`AudioSink`](super::AudioSink) turns them into actual
//! playback. Generators take an explicit seed so output is reproducible.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One synthesized tone: an oscillator/gain pair ramped in over 100ms and
/// decayed out over its duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub waveform: Waveform,
}

impl ToneSpec {
    pub const fn sine(frequency_hz: f32, duration_secs: f32) -> Self {
        ToneSpec {
            frequency_hz,
            duration_secs,
            waveform: Waveform::Sine,
        }
    }
}

/// Tone played when a focus run starts.
pub const TIMER_START_TONE: ToneSpec = ToneSpec::sine(523.0, 0.5);
/// Tone played when a focus run completes.
pub const TIMER_COMPLETE_TONE: ToneSpec = ToneSpec::sine(659.0, 2.0);
/// Short alert when a child calls for help.
pub const HELP_ALERT_TONE: ToneSpec = ToneSpec::sine(659.0, 0.3);
/// Calming chime.
pub const CALMING_CHIME: ToneSpec = ToneSpec::sine(523.0, 2.0);
/// Mindfulness bell.
pub const MINDFULNESS_BELL: ToneSpec = ToneSpec::sine(293.0, 3.0);
/// Success ding.
pub const SUCCESS_DING: ToneSpec = ToneSpec::sine(659.0, 1.0);

/// A looping ambient bed built from a fixed set of detuned oscillators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientSpec {
    pub name: &'static str,
    pub frequencies: &'static [f32],
    pub waveform: Waveform,
}

/// Synthetic ocean waves.
pub const OCEAN: AmbientSpec = AmbientSpec {
    name: "ocean",
    frequencies: &[80.0, 120.0, 150.0, 200.0],
    waveform: Waveform::Sine,
};
/// Synthetic gentle rain.
pub const RAIN: AmbientSpec = AmbientSpec {
    name: "rain",
    frequencies: &[400.0, 800.0, 1200.0, 1600.0],
    waveform: Waveform::Sawtooth,
};
/// Synthetic forest bed.
pub const FOREST: AmbientSpec = AmbientSpec {
    name: "forest",
    frequencies: &[100.0, 200.0, 300.0, 400.0],
    waveform: Waveform::Sine,
};

/// Heartbeat loop tempo.
pub const HEARTBEAT_BPM: u32 = 60;

/// Noise colors the calming screens can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    White,
    Brown,
}

fn lcg_next(state: &mut u64) -> f32 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    // Top bits, mapped to [-1, 1).
    ((*state >> 40) as f32 / (1u64 << 23) as f32) * 2.0 - 1.0
}

/// Uniform white noise in [-1, 1).
pub fn white_noise(samples: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..samples).map(|_| lcg_next(&mut state)).collect()
}

/// Brown noise: a leaky integrator over white noise, with makeup gain.
/// The filter constants keep successive samples highly correlated, which
/// is what makes it sound deep and calm.
pub fn brown_noise(samples: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    let mut last = 0.0f32;
    (0..samples)
        .map(|_| {
            let white = lcg_next(&mut state);
            last = (last + 0.02 * white) / 1.02;
            last * 3.5
        })
        .collect()
}
