use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercise::ExerciseKind;
use crate::types::SosActivity;

/// Every state change in the system produces an Event.
///
/// The UI layer renders these as transient notifications plus accessible
/// announcements; the core never renders anything itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ProfileCreated {
        profile_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    ProfileSwitched {
        profile_id: Option<String>,
        name: Option<String>,
        at: DateTime<Utc>,
    },
    ProfileDeleted {
        profile_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TaskAdded {
        task_id: String,
        text: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        text: String,
        points_awarded: u32,
        reward_points: u32,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        text: String,
        at: DateTime<Utc>,
    },
    BehaviorMarked {
        behavior: String,
        points_awarded: u32,
        reward_points: u32,
        at: DateTime<Utc>,
    },
    StatsReset {
        profile_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        minutes: u32,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    ExerciseStarted {
        kind: ExerciseKind,
        at: DateTime<Utc>,
    },
    ExerciseStopped {
        kind: ExerciseKind,
        at: DateTime<Utc>,
    },
    SosActivated {
        at: DateTime<Utc>,
    },
    SosResolved {
        duration_secs: u64,
        activity_used: Option<SosActivity>,
        at: DateTime<Utc>,
    },
    HelpRequested {
        at: DateTime<Utc>,
    },
    DataExported {
        at: DateTime<Utc>,
    },
    DataImported {
        profiles_added: usize,
        at: DateTime<Utc>,
    },
}
