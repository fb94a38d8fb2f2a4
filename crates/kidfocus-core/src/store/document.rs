//! The persisted application document and its maintenance passes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AppSettings, Profile, ViewMode};

/// Storage key for the main document.
pub const APP_DATA_KEY: &str = "app_data";
/// Storage key for voice settings.
pub const VOICE_SETTINGS_KEY: &str = "voice_settings";
/// Storage key for timer settings.
pub const TIMER_SETTINGS_KEY: &str = "timer_settings";
/// Storage key for the terms-accepted flag.
pub const TERMS_ACCEPTED_KEY: &str = "terms_accepted";

/// Document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Soft serialized-size threshold. Crossing it triggers a proactive
/// cleanup pass before the write.
pub const SOFT_SIZE_LIMIT: usize = 5_000_000;

/// Completed tasks older than this are dropped during cleanup.
pub const COMPLETED_TASK_RETENTION_DAYS: i64 = 30;

/// Behavior entries kept per profile after cleanup.
pub const BEHAVIOR_CAP: usize = 100;

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// The whole persisted state under [`APP_DATA_KEY`]. Written in full on
/// every save; last write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDocument {
    #[serde(default)]
    pub current_profile: Option<String>,
    pub profiles: Vec<Profile>,
    pub settings: AppSettings,
    /// Routine definitions are carried opaquely so import/export keeps
    /// them intact.
    #[serde(default)]
    pub routines: Vec<serde_json::Value>,
    #[serde(default)]
    pub current_view: ViewMode,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
}

impl Default for AppDocument {
    fn default() -> Self {
        AppDocument {
            current_profile: None,
            profiles: Vec::new(),
            settings: AppSettings::default(),
            routines: Vec::new(),
            current_view: ViewMode::List,
            version: default_version(),
            last_saved: None,
        }
    }
}

impl AppDocument {
    /// Structural validation applied before any typed parse: the document
    /// must be an object with an array `profiles` and an object `settings`.
    pub fn is_valid_structure(value: &serde_json::Value) -> bool {
        value.get("profiles").is_some_and(|p| p.is_array())
            && value.get("settings").is_some_and(|s| s.is_object())
    }

    /// Re-clamp every free-text field through the input sanitizer.
    pub fn sanitize(&mut self) {
        for profile in &mut self.profiles {
            profile.sanitize();
        }
    }

    /// Drop old completed tasks and cap behavior lists. Returns what was
    /// pruned so callers can report it.
    pub fn cleanup_old_data(&mut self, now: DateTime<Utc>) -> CleanupSummary {
        let cutoff = now - Duration::days(COMPLETED_TASK_RETENTION_DAYS);
        let mut summary = CleanupSummary::default();
        for profile in &mut self.profiles {
            let before = profile.tasks.len();
            profile.tasks.retain(|task| {
                !(task.completed && task.date_completed.is_some_and(|done| done <= cutoff))
            });
            summary.tasks_removed += before - profile.tasks.len();

            if profile.behaviors.len() > BEHAVIOR_CAP {
                let excess = profile.behaviors.len() - BEHAVIOR_CAP;
                profile.behaviors.drain(..excess);
                summary.behaviors_trimmed += excess;
            }
        }
        summary
    }

    /// What a cleanup pass would remove right now, without mutating.
    pub fn cleanup_decision(&self, now: DateTime<Utc>) -> CleanupDecision {
        let cutoff = now - Duration::days(COMPLETED_TASK_RETENTION_DAYS);
        let prunable_tasks = self
            .profiles
            .iter()
            .flat_map(|p| &p.tasks)
            .filter(|task| {
                task.completed && task.date_completed.is_some_and(|done| done <= cutoff)
            })
            .count();
        let prunable_behaviors = self
            .profiles
            .iter()
            .map(|p| p.behaviors.len().saturating_sub(BEHAVIOR_CAP))
            .sum();
        CleanupDecision {
            prunable_tasks,
            prunable_behaviors,
        }
    }
}

/// What a cleanup pass actually removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub tasks_removed: usize,
    pub behaviors_trimmed: usize,
}

/// Pure "needs cleanup" decision offered to the confirmation layer when a
/// save hits the quota. The core never prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupDecision {
    pub prunable_tasks: usize,
    pub prunable_behaviors: usize,
}

impl CleanupDecision {
    pub fn has_anything_to_prune(&self) -> bool {
        self.prunable_tasks > 0 || self.prunable_behaviors > 0
    }
}

/// Shape written by export: the document minus the PIN, plus provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub profiles: Vec<Profile>,
    pub settings: AppSettings,
    pub routines: Vec<serde_json::Value>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

/// Shape accepted by import. Settings are intentionally absent: import
/// merges profiles and routines only.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportDocument {
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub routines: Vec<serde_json::Value>,
}

/// What an import merged in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub profiles_added: usize,
    pub routines_added: usize,
}

/// Whether a save wrote directly or pruned first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    SavedAfterCleanup(CleanupSummary),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BehaviorEntry, Task, TaskPriority};

    fn profile_with_old_task(now: DateTime<Utc>) -> Profile {
        let mut profile = Profile::new("Alex", 9);
        let mut old = Task::new("Old chore", "Chores", TaskPriority::Normal, None);
        old.completed = true;
        old.date_completed = Some(now - Duration::days(45));
        let mut recent = Task::new("Recent chore", "Chores", TaskPriority::Normal, None);
        recent.completed = true;
        recent.date_completed = Some(now - Duration::days(2));
        profile.tasks.push(old);
        profile.tasks.push(recent);
        profile.tasks.push(Task::new(
            "Pending chore",
            "Chores",
            TaskPriority::Normal,
            None,
        ));
        profile
    }

    #[test]
    fn structure_validation() {
        let good: serde_json::Value =
            serde_json::json!({ "profiles": [], "settings": {} });
        let missing_profiles: serde_json::Value = serde_json::json!({ "settings": {} });
        let wrong_type: serde_json::Value =
            serde_json::json!({ "profiles": {}, "settings": {} });
        assert!(AppDocument::is_valid_structure(&good));
        assert!(!AppDocument::is_valid_structure(&missing_profiles));
        assert!(!AppDocument::is_valid_structure(&wrong_type));
    }

    #[test]
    fn cleanup_drops_old_completed_tasks_only() {
        let now = Utc::now();
        let mut doc = AppDocument {
            profiles: vec![profile_with_old_task(now)],
            ..AppDocument::default()
        };
        let summary = doc.cleanup_old_data(now);
        assert_eq!(summary.tasks_removed, 1);
        assert_eq!(doc.profiles[0].tasks.len(), 2);
        assert!(doc.profiles[0].tasks.iter().all(|t| t.text != "Old chore"));
    }

    #[test]
    fn cleanup_caps_behaviors_at_100_keeping_newest() {
        let now = Utc::now();
        let mut profile = Profile::new("Alex", 9);
        for i in 0..130 {
            profile
                .behaviors
                .push(BehaviorEntry::new(format!("Sharing {i}"), 3));
        }
        let mut doc = AppDocument {
            profiles: vec![profile],
            ..AppDocument::default()
        };
        let summary = doc.cleanup_old_data(now);
        assert_eq!(summary.behaviors_trimmed, 30);
        assert_eq!(doc.profiles[0].behaviors.len(), 100);
        assert_eq!(doc.profiles[0].behaviors[0].behavior, "Sharing 30");
    }

    #[test]
    fn cleanup_decision_counts_without_mutating() {
        let now = Utc::now();
        let doc = AppDocument {
            profiles: vec![profile_with_old_task(now)],
            ..AppDocument::default()
        };
        let decision = doc.cleanup_decision(now);
        assert_eq!(decision.prunable_tasks, 1);
        assert_eq!(decision.prunable_behaviors, 0);
        assert!(decision.has_anything_to_prune());
        assert_eq!(doc.profiles[0].tasks.len(), 3);
    }
}
