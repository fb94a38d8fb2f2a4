//! Profile, task, and behavior operations over the persistence store.
//!
//! Every operation validates first, mutates the in-memory document, then
//! persists the whole document. The returned [`Event`] is what the UI
//! layer renders; narration and audio side effects are wired one level
//! up and never block persistence.

use chrono::{NaiveDate, Utc};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::store::Store;
use crate::types::{
    BehaviorEntry, ChildStats, MeltdownEvent, Profile, Task, TaskPriority, MAX_NAME_LEN,
    MAX_TASK_LEN,
};
use crate::util;

impl Store {
    // ── Profiles ─────────────────────────────────────────────────────

    /// Create a profile. The name is sanitized and must be unique
    /// case-insensitively; age must be within 3..=18.
    pub fn create_profile(&mut self, name: &str, age: u32) -> Result<Event> {
        let name = util::sanitize_input(name, MAX_NAME_LEN);
        if name.is_empty() || !util::validate_age(age) {
            return Err(ValidationError::invalid(
                "profile",
                "Please enter a valid name and age (3-18)",
            )
            .into());
        }
        let duplicate = self
            .doc
            .profiles
            .iter()
            .any(|p| p.name.to_lowercase() == name.to_lowercase());
        if duplicate {
            return Err(ValidationError::DuplicateProfileName.into());
        }

        let profile = Profile::new(name.clone(), age);
        let profile_id = profile.id.clone();
        self.doc.profiles.push(profile);
        self.save()?;
        Ok(Event::ProfileCreated {
            profile_id,
            name,
            at: Utc::now(),
        })
    }

    /// Switch the current profile. `None` deselects.
    pub fn switch_profile(&mut self, profile_id: Option<&str>) -> Result<Event> {
        let name = match profile_id {
            Some(id) => {
                let profile = self
                    .doc
                    .profiles
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| ValidationError::invalid("profile", "Profile not found"))?;
                Some(profile.name.clone())
            }
            None => None,
        };
        self.doc.current_profile = profile_id.map(str::to_string);
        self.save()?;
        Ok(Event::ProfileSwitched {
            profile_id: profile_id.map(str::to_string),
            name,
            at: Utc::now(),
        })
    }

    /// Delete a profile. Never cascades from anywhere else; the caller is
    /// responsible for confirming first.
    pub fn delete_profile(&mut self, profile_id: &str) -> Result<Event> {
        let index = self
            .doc
            .profiles
            .iter()
            .position(|p| p.id == profile_id)
            .ok_or_else(|| ValidationError::invalid("profile", "Profile not found"))?;
        let removed = self.doc.profiles.remove(index);
        if self.doc.current_profile.as_deref() == Some(profile_id) {
            self.doc.current_profile = None;
        }
        self.save()?;
        Ok(Event::ProfileDeleted {
            profile_id: removed.id,
            name: removed.name,
            at: Utc::now(),
        })
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        let id = self.doc.current_profile.as_deref()?;
        self.doc.profiles.iter().find(|p| p.id == id)
    }

    fn current_profile_mut(&mut self) -> Result<&mut Profile> {
        let id = self
            .doc
            .current_profile
            .clone()
            .ok_or(ValidationError::NoProfileSelected)?;
        self.doc
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ValidationError::invalid("profile", "Profile not found").into())
    }

    /// Summary of the current profile for the parent dashboard.
    pub fn child_stats(&self) -> Option<ChildStats> {
        let profile = self.current_profile()?;
        Some(ChildStats {
            name: profile.name.clone(),
            age: profile.age,
            reward_points: profile.reward_points,
            completed_tasks: profile.tasks.iter().filter(|t| t.completed).count(),
            total_tasks: profile.tasks.len(),
            total_behaviors: profile.behaviors.len(),
        })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Add a task to the current profile.
    pub fn add_task(
        &mut self,
        text: &str,
        category: &str,
        priority: TaskPriority,
        deadline: Option<NaiveDate>,
    ) -> Result<Event> {
        let text = util::sanitize_input(text, MAX_TASK_LEN);
        if text.is_empty() {
            return Err(ValidationError::invalid("task", "Please enter a task").into());
        }
        let task = Task::new(text.clone(), category, priority, deadline);
        let task_id = task.id.clone();
        self.current_profile_mut()?.tasks.push(task);
        self.save()?;
        Ok(Event::TaskAdded {
            task_id,
            text,
            at: Utc::now(),
        })
    }

    /// Complete a task. Idempotent in effect: completing an already
    /// completed task changes nothing and awards nothing.
    pub fn complete_task(&mut self, task_id: &str) -> Result<Option<Event>> {
        let points = self.doc.settings.task_points;
        let profile = self.current_profile_mut()?;
        let Some(task) = profile.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Err(ValidationError::invalid("task", "Task not found").into());
        };
        if task.completed {
            return Ok(None);
        }
        task.completed = true;
        task.date_completed = Some(Utc::now());
        let text = task.text.clone();
        profile.reward_points += points;
        let reward_points = profile.reward_points;
        self.save()?;
        Ok(Some(Event::TaskCompleted {
            task_id: task_id.to_string(),
            text,
            points_awarded: points,
            reward_points,
            at: Utc::now(),
        }))
    }

    /// Delete a task from the current profile. The caller confirms first.
    pub fn delete_task(&mut self, task_id: &str) -> Result<Event> {
        let profile = self.current_profile_mut()?;
        let index = profile
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| ValidationError::invalid("task", "Task not found"))?;
        let removed = profile.tasks.remove(index);
        self.save()?;
        Ok(Event::TaskDeleted {
            task_id: removed.id,
            text: removed.text,
            at: Utc::now(),
        })
    }

    // ── Behaviors ────────────────────────────────────────────────────

    /// Record a positive behavior on the current profile.
    pub fn mark_behavior(&mut self, behavior: &str) -> Result<Event> {
        let points = self.doc.settings.behavior_points;
        let profile = self.current_profile_mut()?;
        profile.behaviors.push(BehaviorEntry::new(behavior, points));
        profile.reward_points += points;
        let reward_points = profile.reward_points;
        self.save()?;
        Ok(Event::BehaviorMarked {
            behavior: behavior.to_string(),
            points_awarded: points,
            reward_points,
            at: Utc::now(),
        })
    }

    // ── Stats / warning signs / meltdown log ────────────────────────

    /// Reset the current profile's tasks, behaviors, and points. The
    /// profile itself (and its routines) is kept. The caller double
    /// confirms first.
    pub fn reset_stats(&mut self) -> Result<Event> {
        let profile = self.current_profile_mut()?;
        profile.tasks.clear();
        profile.behaviors.clear();
        profile.reward_points = 0;
        let profile_id = profile.id.clone();
        let name = profile.name.clone();
        self.save()?;
        Ok(Event::StatsReset {
            profile_id,
            name,
            at: Utc::now(),
        })
    }

    pub fn add_warning_sign(&mut self, sign: &str) -> Result<()> {
        let sign = util::sanitize_input(sign, MAX_TASK_LEN);
        if sign.is_empty() {
            return Err(ValidationError::invalid("warning_sign", "Please enter a warning sign").into());
        }
        self.current_profile_mut()?.warning_signs.push(sign);
        self.save()?;
        Ok(())
    }

    pub fn remove_warning_sign(&mut self, index: usize) -> Result<()> {
        let profile = self.current_profile_mut()?;
        if index >= profile.warning_signs.len() {
            return Err(ValidationError::invalid("warning_sign", "No such warning sign").into());
        }
        profile.warning_signs.remove(index);
        self.save()?;
        Ok(())
    }

    /// Append a meltdown event to the current profile's log, evicting
    /// past the cap.
    pub fn log_meltdown(&mut self, event: MeltdownEvent) -> Result<()> {
        self.current_profile_mut()?.log_meltdown(event);
        self.save()?;
        Ok(())
    }

    // ── Parent settings ──────────────────────────────────────────────

    /// Update the reward point values. Task points are bounded 1..=20,
    /// behavior points 1..=10.
    pub fn update_parent_settings(&mut self, task_points: u32, behavior_points: u32) -> Result<()> {
        if !(1..=20).contains(&task_points) {
            return Err(ValidationError::invalid(
                "task_points",
                "Task points must be between 1 and 20",
            )
            .into());
        }
        if !(1..=10).contains(&behavior_points) {
            return Err(ValidationError::invalid(
                "behavior_points",
                "Behavior points must be between 1 and 10",
            )
            .into());
        }
        self.doc.settings.task_points = task_points;
        self.doc.settings.behavior_points = behavior_points;
        self.save()?;
        Ok(())
    }
}
