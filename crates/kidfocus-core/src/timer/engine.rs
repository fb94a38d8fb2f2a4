//! Focus timer implementation.
//!
//! The timer is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically. The displayed value is always recomputed from
//! `now - started_at`, never decremented, so missed ticks (a starved
//! event loop, a backgrounded window) cannot cause drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle
//! ```

use chrono::Utc;

use super::settings::TimerSettings;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::util::{self, now_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
}

/// Core focus timer.
///
/// Operates on wall-clock time -- no internal thread. The caller is
/// responsible for calling `tick()` periodically and for reacting to the
/// completion event (tone, narration).
#[derive(Debug, Clone)]
pub struct FocusTimer {
    settings: TimerSettings,
    phase: TimerPhase,
    /// Wall-clock anchor (ms since epoch) of the current run.
    started_at_ms: Option<u64>,
    /// Total run length in seconds.
    duration_secs: u64,
}

impl FocusTimer {
    /// Create an idle timer displaying the configured focus duration.
    pub fn new(settings: TimerSettings) -> Self {
        let duration_secs = u64::from(settings.focus_minutes) * 60;
        FocusTimer {
            settings,
            phase: TimerPhase::Idle,
            started_at_ms: None,
            duration_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Remaining seconds: `max(0, duration - elapsed)` while running,
    /// the idle display value otherwise.
    pub fn remaining_secs(&self) -> u64 {
        match (self.phase, self.started_at_ms) {
            (TimerPhase::Running, Some(started)) => {
                let elapsed = now_ms().saturating_sub(started) / 1000;
                self.duration_secs.saturating_sub(elapsed)
            }
            _ => self.duration_secs,
        }
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn display(&self) -> String {
        let remaining = self.remaining_secs();
        util::format_time(remaining / 60, remaining % 60)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown. Minutes outside 1..=120 are rejected with a
    /// validation error and the timer keeps its prior state.
    pub fn start(&mut self, minutes: u32) -> Result<Event> {
        if !util::validate_timer_minutes(minutes) {
            return Err(ValidationError::invalid(
                "minutes",
                "Invalid timer value. Please use 1-120 minutes.",
            )
            .into());
        }

        // A new run always cancels the previous one.
        self.phase = TimerPhase::Running;
        self.started_at_ms = Some(now_ms());
        self.duration_secs = u64::from(minutes) * 60;

        Ok(Event::TimerStarted {
            minutes,
            at: Utc::now(),
        })
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` exactly
    /// once, when the computed remaining time reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        if self.remaining_secs() == 0 {
            self.reset_to_default();
            return Some(Event::TimerCompleted { at: Utc::now() });
        }
        None
    }

    /// Immediate resync after the host regains focus. The remaining time
    /// is a pure function of the wall clock, so this is just a tick.
    pub fn sync(&mut self) -> Option<Event> {
        self.tick()
    }

    /// Manual cancellation. Safe to call in any state; the display resets
    /// to the configured focus duration.
    pub fn stop(&mut self) -> Event {
        self.reset_to_default();
        Event::TimerStopped { at: Utc::now() }
    }

    /// Replace the settings; an idle display picks up the new focus
    /// duration immediately.
    pub fn set_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
        if self.phase == TimerPhase::Idle {
            self.duration_secs = u64::from(self.settings.focus_minutes) * 60;
        }
    }

    #[cfg(test)]
    pub(crate) fn force_started_at(&mut self, started_at_ms: u64) {
        self.started_at_ms = Some(started_at_ms);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_to_default(&mut self) {
        self.phase = TimerPhase::Idle;
        self.started_at_ms = None;
        self.duration_secs = u64::from(self.settings.focus_minutes) * 60;
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        FocusTimer::new(TimerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn start_validates_bounds_and_keeps_state() {
        let mut timer = FocusTimer::default();
        for bad in [0, 121, 500] {
            assert!(timer.start(bad).is_err());
            assert_eq!(timer.phase(), TimerPhase::Idle);
            assert_eq!(timer.remaining_secs(), 25 * 60);
        }
    }

    #[test]
    fn start_while_running_restarts() {
        let mut timer = FocusTimer::default();
        timer.start(10).unwrap();
        assert_eq!(timer.phase(), TimerPhase::Running);
        timer.start(5).unwrap();
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.remaining_secs(), 5 * 60);
    }

    #[test]
    fn remaining_is_pure_function_of_wall_clock() {
        let mut timer = FocusTimer::default();
        timer.start(2).unwrap();
        // Rewind the anchor as if 65 seconds passed without any tick.
        timer.started_at_ms = Some(now_ms() - 65_000);
        assert_eq!(timer.remaining_secs(), 120 - 65);
        assert!(timer.tick().is_none());
    }

    #[test]
    fn complete_fires_once_and_resets_display() {
        let mut timer = FocusTimer::default();
        timer.start(1).unwrap();
        timer.started_at_ms = Some(now_ms() - 61_000);
        let event = timer.tick();
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(timer.phase(), TimerPhase::Idle);
        // Display resets to the focus default, not to zero.
        assert_eq!(timer.remaining_secs(), 25 * 60);
        assert!(timer.tick().is_none());
    }

    #[test]
    fn stop_is_safe_in_any_state() {
        let mut timer = FocusTimer::default();
        timer.stop();
        timer.start(30).unwrap();
        timer.stop();
        timer.stop();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.display(), "25:00");
    }

    #[test]
    fn sync_completes_an_overdue_run() {
        let mut timer = FocusTimer::default();
        timer.start(1).unwrap();
        timer.started_at_ms = Some(now_ms() - 3_600_000);
        assert!(matches!(timer.sync(), Some(Event::TimerCompleted { .. })));
    }

    proptest! {
        #[test]
        fn start_accepts_exactly_the_valid_range(minutes in 0u32..300) {
            let mut timer = FocusTimer::default();
            let result = timer.start(minutes);
            prop_assert_eq!(result.is_ok(), (1..=120).contains(&minutes));
        }

        #[test]
        fn remaining_matches_elapsed_formula(minutes in 1u32..=120, elapsed_secs in 0u64..20_000) {
            let mut timer = FocusTimer::default();
            timer.start(minutes).unwrap();
            timer.started_at_ms = Some(now_ms().saturating_sub(elapsed_secs * 1000));
            let expected = (u64::from(minutes) * 60).saturating_sub(elapsed_secs);
            // One second of slack for the wall clock moving under us.
            let got = timer.remaining_secs();
            prop_assert!(got == expected || got + 1 == expected);
        }
    }
}
