//! Entity types persisted inside the application document.

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util;

/// Maximum characters kept for a profile name.
pub const MAX_NAME_LEN: usize = 50;
/// Maximum characters kept for a task text.
pub const MAX_TASK_LEN: usize = 200;
/// Meltdown log cap; oldest events are evicted first.
pub const MELTDOWN_LOG_CAP: usize = 100;

fn fresh_id(prefix: &str) -> String {
    format!("{prefix}-{}-{}", Utc::now().timestamp(), uuid::Uuid::new_v4())
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// A single task owned by one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    pub date_added: DateTime<Utc>,
    /// Set iff `completed` is true. Completion is one-way.
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        priority: TaskPriority,
        deadline: Option<NaiveDate>,
    ) -> Self {
        Task {
            id: fresh_id("task"),
            text: text.into(),
            category: category.into(),
            priority,
            deadline,
            completed: false,
            date_added: Utc::now(),
            date_completed: None,
        }
    }
}

/// One recorded positive behavior. Append-only; pruned only by the
/// storage-cleanup cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEntry {
    pub id: String,
    pub behavior: String,
    pub time: DateTime<Utc>,
    pub points: u32,
}

impl BehaviorEntry {
    pub fn new(behavior: impl Into<String>, points: u32) -> Self {
        BehaviorEntry {
            id: fresh_id("behavior"),
            behavior: behavior.into(),
            time: Utc::now(),
            points,
        }
    }
}

/// Kind of a logged meltdown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeltdownKind {
    SosActivated,
    SosResolved,
    HelpRequested,
}

/// Calming activity chosen during an SOS session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosActivity {
    Breathing,
    Sound,
    Movement,
    HelpCalled,
}

impl fmt::Display for SosActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SosActivity::Breathing => "breathing",
            SosActivity::Sound => "sound",
            SosActivity::Movement => "movement",
            SosActivity::HelpCalled => "help_called",
        };
        f.write_str(name)
    }
}

/// A logged SOS activation/resolution/help-request, used for pattern
/// analysis. Append-only, FIFO-capped at [`MELTDOWN_LOG_CAP`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeltdownEvent {
    pub id: String,
    pub kind: MeltdownKind,
    pub timestamp: DateTime<Utc>,
    /// Local hour of day (0-23) at the time of the event.
    pub time_of_day: u32,
    /// Local day of week, 0 = Sunday.
    pub day_of_week: u32,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub activity_used: Option<SosActivity>,
}

impl MeltdownEvent {
    pub fn new(kind: MeltdownKind) -> Self {
        let local = Local::now();
        MeltdownEvent {
            id: fresh_id("meltdown"),
            kind,
            timestamp: Utc::now(),
            time_of_day: local.hour(),
            day_of_week: local.weekday().num_days_from_sunday(),
            duration_secs: None,
            activity_used: None,
        }
    }

    pub fn resolved(duration_secs: u64, activity_used: Option<SosActivity>) -> Self {
        let mut event = MeltdownEvent::new(MeltdownKind::SosResolved);
        event.duration_secs = Some(duration_secs);
        event.activity_used = activity_used;
        event
    }
}

/// One child's isolated data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorEntry>,
    #[serde(default)]
    pub meltdown_log: Vec<MeltdownEvent>,
    #[serde(default)]
    pub warning_signs: Vec<String>,
    #[serde(default)]
    pub reward_points: u32,
    #[serde(default)]
    pub preferred_theme: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Profile {
            id: fresh_id("profile"),
            name: name.into(),
            age,
            tasks: Vec::new(),
            behaviors: Vec::new(),
            meltdown_log: Vec::new(),
            warning_signs: Vec::new(),
            reward_points: 0,
            preferred_theme: None,
            date_created: Utc::now(),
        }
    }

    /// Append a meltdown event, evicting the oldest past the cap.
    pub fn log_meltdown(&mut self, event: MeltdownEvent) {
        self.meltdown_log.push(event);
        if self.meltdown_log.len() > MELTDOWN_LOG_CAP {
            let excess = self.meltdown_log.len() - MELTDOWN_LOG_CAP;
            self.meltdown_log.drain(..excess);
        }
    }

    /// Re-clamp free-text fields through the input sanitizer.
    pub fn sanitize(&mut self) {
        self.name = util::sanitize_input(&self.name, MAX_NAME_LEN);
        for task in &mut self.tasks {
            task.text = util::sanitize_input(&task.text, MAX_TASK_LEN);
        }
    }
}

/// Global application settings singleton, persisted alongside profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default = "default_task_points")]
    pub task_points: u32,
    #[serde(default = "default_behavior_points")]
    pub behavior_points: u32,
    /// Rolling hash of the parent PIN; never exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_pin: Option<String>,
}

fn default_theme() -> String {
    "light".to_string()
}
fn default_font_size() -> u32 {
    16
}
fn default_task_points() -> u32 {
    5
}
fn default_behavior_points() -> u32 {
    3
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            theme: default_theme(),
            font_size: default_font_size(),
            high_contrast: false,
            task_points: default_task_points(),
            behavior_points: default_behavior_points(),
            parent_pin: None,
        }
    }
}

/// Task list presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Visual,
}

/// Per-profile summary for the parent dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ChildStats {
    pub name: String,
    pub age: u32,
    pub reward_points: u32,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub total_behaviors: usize,
}
