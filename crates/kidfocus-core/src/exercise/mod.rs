//! Calming/sensory exercise orchestration.
//!
//! Each exercise is a linear step sequence driven by a single
//! self-rescheduling task. At most one exercise is active at a time:
//! starting a new one tears down any running one first.

pub mod scripts;

pub use scripts::{script_for, ExerciseScript, ExerciseStep};

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::Event;
use crate::voice::NarrationQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Breathing,
    MuscleRelaxation,
    Grounding,
    DeskStretches,
    BodyScan,
    Visualization,
    Affirmations,
    Counting,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 8] = [
        ExerciseKind::Breathing,
        ExerciseKind::MuscleRelaxation,
        ExerciseKind::Grounding,
        ExerciseKind::DeskStretches,
        ExerciseKind::BodyScan,
        ExerciseKind::Visualization,
        ExerciseKind::Affirmations,
        ExerciseKind::Counting,
    ];
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExerciseKind::Breathing => "breathing",
            ExerciseKind::MuscleRelaxation => "muscle-relaxation",
            ExerciseKind::Grounding => "54321-grounding",
            ExerciseKind::DeskStretches => "desk-stretches",
            ExerciseKind::BodyScan => "body-scan",
            ExerciseKind::Visualization => "visualization",
            ExerciseKind::Affirmations => "affirmations",
            ExerciseKind::Counting => "counting",
        };
        f.write_str(name)
    }
}

/// Explicit exercise state: the single mutual-exclusion slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseState {
    Idle,
    Active { kind: ExerciseKind },
}

/// Drives exercise scripts, speaking each step through the narration
/// queue. Cheap to clone; clones share the active slot.
#[derive(Clone)]
pub struct ExerciseRunner {
    narration: NarrationQueue,
    state: Arc<Mutex<ExerciseState>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ExerciseRunner {
    pub fn new(narration: NarrationQueue) -> Self {
        ExerciseRunner {
            narration,
            state: Arc::new(Mutex::new(ExerciseState::Idle)),
            task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> ExerciseState {
        *self.state.lock()
    }

    /// Start an exercise, tearing down any running one first. Requires a
    /// running tokio runtime.
    pub fn start(&self, kind: ExerciseKind) -> Event {
        self.stop();
        *self.state.lock() = ExerciseState::Active { kind };

        let script = script_for(kind);
        let narration = self.narration.clone();
        let state = self.state.clone();
        *self.task.lock() = Some(tokio::spawn(drive(script, narration, state)));

        Event::ExerciseStarted {
            kind,
            at: Utc::now(),
        }
    }

    /// Stop the active exercise. Idempotent; returns the stop event when
    /// something was actually running.
    pub fn stop(&self) -> Option<Event> {
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut *state, ExerciseState::Idle)
        };
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        match previous {
            ExerciseState::Active { kind } => {
                debug!(%kind, "exercise stopped");
                Some(Event::ExerciseStopped {
                    kind,
                    at: Utc::now(),
                })
            }
            ExerciseState::Idle => None,
        }
    }
}

async fn drive(
    script: ExerciseScript,
    narration: NarrationQueue,
    state: Arc<Mutex<ExerciseState>>,
) {
    narration.speak_exercise_instruction(script.intro, true);
    loop {
        for step in &script.steps {
            if let Some(phase) = step.breath {
                narration.speak_breathing_cue(phase, Some(step.duration.as_secs() as u32));
            } else if !step.text.is_empty() {
                narration.speak_exercise_instruction(&step.text, false);
            }
            tokio::time::sleep(step.duration).await;
        }
        if !script.looped {
            break;
        }
    }
    narration.speak_exercise_instruction(script.completion, false);
    *state.lock() = ExerciseState::Idle;
}
