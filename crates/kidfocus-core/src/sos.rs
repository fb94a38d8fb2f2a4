//! SOS crisis mode: session tracking and meltdown pattern analysis.
//!
//! An SOS session is opened when the child taps the crisis button and
//! closed when they feel better. Activations, resolutions, and help
//! requests are logged per profile; simple descriptive statistics are
//! derived on demand for the parent dashboard.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::{MeltdownEvent, MeltdownKind, Profile, SosActivity};
use crate::util::now_ms;

/// An open SOS session.
#[derive(Debug, Clone)]
pub struct SosSession {
    started_at_ms: u64,
    /// The calming activity currently chosen, if any.
    pub activity: Option<SosActivity>,
}

impl SosSession {
    pub fn begin() -> Self {
        SosSession {
            started_at_ms: now_ms(),
            activity: None,
        }
    }

    /// Seconds since the session was opened.
    pub fn elapsed_secs(&self) -> u64 {
        (now_ms().saturating_sub(self.started_at_ms) + 500) / 1000
    }

    /// Close the session, producing the resolution event to log.
    pub fn resolve(self) -> MeltdownEvent {
        MeltdownEvent::resolved(self.elapsed_secs(), self.activity)
    }
}

/// Pattern analysis over a profile's meltdown log.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatternReport {
    /// Fewer than three activations logged so far.
    InsufficientData,
    Patterns(MeltdownPatterns),
}

#[derive(Debug, Clone, Serialize)]
pub struct MeltdownPatterns {
    pub total_events: usize,
    /// Local hour (0-23) with the most activations.
    pub most_common_hour: u32,
    /// Weekday name with the most activations.
    pub most_common_day: &'static str,
    /// Mean resolution time in seconds, when any resolution carried one.
    pub average_duration_secs: Option<u64>,
    /// The strategy most often used in resolved sessions.
    pub most_effective_strategy: Option<SosActivity>,
    /// Activations in the last seven days.
    pub last_7_days: usize,
}

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Derive descriptive statistics from a profile's meltdown log.
pub fn meltdown_patterns(profile: &Profile, now: DateTime<Utc>) -> PatternReport {
    let activations: Vec<&MeltdownEvent> = profile
        .meltdown_log
        .iter()
        .filter(|e| e.kind == MeltdownKind::SosActivated)
        .collect();

    if activations.len() < 3 {
        return PatternReport::InsufficientData;
    }

    let most_common_hour = most_common(activations.iter().map(|e| e.time_of_day)).unwrap_or(0);
    let most_common_day_index =
        most_common(activations.iter().map(|e| e.day_of_week)).unwrap_or(0);
    let most_common_day = DAY_NAMES[most_common_day_index.min(6) as usize];

    let resolved: Vec<&MeltdownEvent> = profile
        .meltdown_log
        .iter()
        .filter(|e| e.kind == MeltdownKind::SosResolved && e.duration_secs.is_some())
        .collect();

    let average_duration_secs = if resolved.is_empty() {
        None
    } else {
        let total: u64 = resolved.iter().filter_map(|e| e.duration_secs).sum();
        Some((total as f64 / resolved.len() as f64).round() as u64)
    };

    let most_effective_strategy = most_common(resolved.iter().filter_map(|e| e.activity_used));

    let week_ago = now - Duration::days(7);
    let last_7_days = activations
        .iter()
        .filter(|e| e.timestamp >= week_ago)
        .count();

    PatternReport::Patterns(MeltdownPatterns {
        total_events: activations.len(),
        most_common_hour,
        most_common_day,
        average_duration_secs,
        most_effective_strategy,
        last_7_days,
    })
}

/// Most frequent value; ties go to the value seen latest in iteration
/// order.
fn most_common<T: Copy + PartialEq>(values: impl Iterator<Item = T>) -> Option<T> {
    let collected: Vec<T> = values.collect();
    let mut best: Option<(T, usize)> = None;
    for &value in &collected {
        let count = collected.iter().filter(|&&v| v == value).count();
        match best {
            Some((_, best_count)) if best_count > count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// `h:00 AM/PM` rendering for pattern summaries.
pub fn format_hour(hour: u32) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = if hour > 12 {
        hour - 12
    } else if hour == 0 {
        12
    } else {
        hour
    };
    format!("{display}:00 {period}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activation(hour: u32, day: u32) -> MeltdownEvent {
        let mut event = MeltdownEvent::new(MeltdownKind::SosActivated);
        event.time_of_day = hour;
        event.day_of_week = day;
        event
    }

    #[test]
    fn fewer_than_three_activations_is_insufficient() {
        let mut profile = Profile::new("Alex", 9);
        profile.log_meltdown(activation(15, 2));
        profile.log_meltdown(activation(15, 2));
        assert!(matches!(
            meltdown_patterns(&profile, Utc::now()),
            PatternReport::InsufficientData
        ));
    }

    #[test]
    fn patterns_pick_dominant_hour_day_and_strategy() {
        let mut profile = Profile::new("Alex", 9);
        for _ in 0..3 {
            profile.log_meltdown(activation(15, 2));
        }
        profile.log_meltdown(activation(8, 5));
        profile.log_meltdown(MeltdownEvent::resolved(60, Some(SosActivity::Breathing)));
        profile.log_meltdown(MeltdownEvent::resolved(120, Some(SosActivity::Breathing)));
        profile.log_meltdown(MeltdownEvent::resolved(30, Some(SosActivity::Sound)));

        let report = meltdown_patterns(&profile, Utc::now());
        let PatternReport::Patterns(patterns) = report else {
            panic!("expected patterns");
        };
        assert_eq!(patterns.total_events, 4);
        assert_eq!(patterns.most_common_hour, 15);
        assert_eq!(patterns.most_common_day, "Tuesday");
        assert_eq!(patterns.average_duration_secs, Some(70));
        assert_eq!(
            patterns.most_effective_strategy,
            Some(SosActivity::Breathing)
        );
        assert_eq!(patterns.last_7_days, 4);
    }

    #[test]
    fn resolutions_without_duration_do_not_count() {
        let mut profile = Profile::new("Alex", 9);
        for _ in 0..3 {
            profile.log_meltdown(activation(10, 1));
        }
        profile.log_meltdown(MeltdownEvent::new(MeltdownKind::SosResolved));
        let PatternReport::Patterns(patterns) = meltdown_patterns(&profile, Utc::now()) else {
            panic!("expected patterns");
        };
        assert_eq!(patterns.average_duration_secs, None);
        assert_eq!(patterns.most_effective_strategy, None);
    }

    #[test]
    fn old_activations_fall_out_of_the_week_window() {
        let mut profile = Profile::new("Alex", 9);
        for _ in 0..3 {
            let mut event = activation(10, 1);
            event.timestamp = Utc::now() - Duration::days(30);
            profile.log_meltdown(event);
        }
        profile.log_meltdown(activation(10, 1));
        let PatternReport::Patterns(patterns) = meltdown_patterns(&profile, Utc::now()) else {
            panic!("expected patterns");
        };
        assert_eq!(patterns.total_events, 4);
        assert_eq!(patterns.last_7_days, 1);
    }

    #[test]
    fn hour_formatting() {
        assert_eq!(format_hour(0), "12:00 AM");
        assert_eq!(format_hour(9), "9:00 AM");
        assert_eq!(format_hour(12), "12:00 PM");
        assert_eq!(format_hour(15), "3:00 PM");
    }

    #[test]
    fn session_resolution_carries_activity() {
        let mut session = SosSession::begin();
        session.activity = Some(SosActivity::Movement);
        let event = session.resolve();
        assert_eq!(event.kind, MeltdownKind::SosResolved);
        assert_eq!(event.activity_used, Some(SosActivity::Movement));
        assert!(event.duration_secs.is_some());
    }
}
