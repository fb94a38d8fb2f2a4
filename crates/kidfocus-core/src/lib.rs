//! # Kidfocus Core Library
//!
//! Core business logic for Kidfocus, a self-regulation and task-management
//! aid for children. The CLI binary is a thin layer over this library; a
//! GUI would consume the same operations.
//!
//! ## Architecture
//!
//! - **Persistence store**: one JSON document under one storage key,
//!   loaded defensively and written whole on every change
//! - **Focus timer**: a wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Narration queue**: a priority-aware, rate-limited scheduler over a
//!   single-utterance platform speech capability
//! - **Audio manager**: one registry for every sound-producing handle so
//!   a single stop call silences everything
//! - **Exercise/SOS orchestrators**: narrated step sequences with a
//!   single mutual-exclusion slot, plus crisis-mode event logging
//!
//! ## Key Components
//!
//! - [`Store`]: document load/validate/sanitize/save lifecycle
//! - [`FocusTimer`]: countdown state machine
//! - [`NarrationQueue`]: speech scheduling with interrupt semantics
//! - [`App`]: explicit wiring of all subsystems for one instance

pub mod app;
pub mod audio;
pub mod error;
pub mod events;
pub mod exercise;
pub mod ops;
pub mod sos;
pub mod store;
pub mod timer;
pub mod types;
pub mod util;
pub mod voice;

pub use app::App;
pub use audio::{AudioManager, AudioSink, NullSink, RecordingSink};
pub use error::{CapabilityError, CoreError, DataIntegrityError, StorageError, ValidationError};
pub use events::Event;
pub use exercise::{ExerciseKind, ExerciseRunner, ExerciseState};
pub use sos::{meltdown_patterns, PatternReport, SosSession};
pub use store::{FileBackend, MemoryBackend, Store};
pub use timer::{FocusTimer, TimerPhase, TimerSettings, TimerTicker};
pub use types::{
    AppSettings, BehaviorEntry, ChildStats, MeltdownEvent, MeltdownKind, Profile, SosActivity,
    Task, TaskPriority, ViewMode,
};
pub use voice::{
    BreathPhase, NarrationQueue, NullEngine, Priority, SpeakOptions, SpeechContext, SpeechEngine,
    TimingSettings, Utterance, VoiceInfo, VoiceSettings,
};
