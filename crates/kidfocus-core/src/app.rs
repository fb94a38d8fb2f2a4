//! Application context: the explicit wiring between the store and the
//! side-effect subsystems.
//!
//! Operations mutate the store first; narration and audio fire after and
//! never block persistence. Everything is injected, so tests can run the
//! whole application headless.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::audio::{
    AudioManager, AudioSink, NoiseKind, HELP_ALERT_TONE, TIMER_COMPLETE_TONE, TIMER_START_TONE,
};
use crate::error::Result;
use crate::events::Event;
use crate::exercise::{ExerciseKind, ExerciseRunner};
use crate::sos::SosSession;
use crate::store::{Store, TIMER_SETTINGS_KEY, VOICE_SETTINGS_KEY};
use crate::timer::{FocusTimer, SharedTimer, TimerSettings};
use crate::types::{MeltdownEvent, MeltdownKind, SosActivity};
use crate::voice::{NarrationQueue, Priority, SpeakOptions, SpeechContext, SpeechEngine};

/// Owns every subsystem for one application instance.
pub struct App {
    pub store: Store,
    pub narration: NarrationQueue,
    pub audio: AudioManager,
    pub timer: SharedTimer,
    pub exercises: ExerciseRunner,
    sos: Option<SosSession>,
}

impl App {
    /// Build the context over a store and the platform capabilities.
    /// Voice and timer settings are loaded from their own storage keys.
    pub fn new(store: Store, engine: Arc<dyn SpeechEngine>, sink: Arc<dyn AudioSink>) -> Self {
        let voice_settings = store.load_settings_doc(VOICE_SETTINGS_KEY);
        let timer_settings: TimerSettings = store.load_settings_doc(TIMER_SETTINGS_KEY);
        let narration = NarrationQueue::new(engine, voice_settings);
        let audio = AudioManager::new(sink);
        let exercises = ExerciseRunner::new(narration.clone());
        App {
            store,
            narration,
            audio,
            timer: Arc::new(Mutex::new(FocusTimer::new(timer_settings))),
            exercises,
            sos: None,
        }
    }

    /// Start background work (the narration drain). Requires a running
    /// tokio runtime.
    pub fn init(&self) {
        self.narration.start();
    }

    /// Tear everything down: narration, exercises, sounds.
    pub fn shutdown(&self) {
        self.exercises.stop();
        self.narration.stop();
        self.audio.stop_all();
    }

    // ── Task / behavior flows with feedback ──────────────────────────

    /// Complete a task, with celebration narration on the first
    /// completion only.
    pub fn complete_task(&mut self, task_id: &str) -> Result<Option<Event>> {
        let event = self.store.complete_task(task_id)?;
        if let Some(Event::TaskCompleted { text, .. }) = &event {
            self.narration.speak_task_completion(text);
        }
        Ok(event)
    }

    /// Record a behavior, with encouragement narration.
    pub fn mark_behavior(&mut self, behavior: &str) -> Result<Event> {
        let event = self.store.mark_behavior(behavior)?;
        self.narration.speak_behavior_encouragement(behavior);
        Ok(event)
    }

    // ── Timer flows ──────────────────────────────────────────────────

    /// Start a focus run; plays the start tone when sounds are enabled.
    pub fn start_timer(&self, minutes: u32) -> Result<Event> {
        let (event, sound_enabled) = {
            let mut timer = self.timer.lock();
            let event = timer.start(minutes)?;
            (event, timer.settings().sound_enabled)
        };
        if sound_enabled {
            self.audio.play_tone(&TIMER_START_TONE);
        }
        Ok(event)
    }

    pub fn stop_timer(&self) -> Event {
        self.timer.lock().stop()
    }

    /// React to a completion event from the ticker: completion tone plus
    /// an interrupting announcement.
    pub fn on_timer_complete(&self) {
        let sound_enabled = self.timer.lock().settings().sound_enabled;
        if sound_enabled {
            self.audio.play_tone(&TIMER_COMPLETE_TONE);
        }
        self.narration.speak_timer_complete();
    }

    /// Validate and persist new timer settings.
    pub fn save_timer_settings(&self, settings: TimerSettings) -> Result<()> {
        settings.validate()?;
        self.store
            .save_settings_doc(TIMER_SETTINGS_KEY, &settings)?;
        self.timer.lock().set_settings(settings);
        Ok(())
    }

    /// Persist the narration queue's current voice settings.
    pub fn save_voice_settings(&self) -> Result<()> {
        self.store
            .save_settings_doc(VOICE_SETTINGS_KEY, &self.narration.settings())
    }

    // ── Global teardown ──────────────────────────────────────────────

    /// Silence everything: sounds, narration, exercises.
    pub fn stop_all_sounds(&self) {
        self.exercises.stop();
        self.narration.cancel_all();
        self.audio.stop_all();
    }

    // ── SOS mode ─────────────────────────────────────────────────────

    pub fn sos_active(&self) -> bool {
        self.sos.is_some()
    }

    /// Enter crisis mode: stop everything, log the activation, speak the
    /// calming message.
    pub fn activate_sos(&mut self) -> Result<Event> {
        self.stop_all_sounds();
        self.sos = Some(SosSession::begin());
        self.store
            .log_meltdown(MeltdownEvent::new(MeltdownKind::SosActivated))?;
        self.narration.speak(
            "You're safe. I'm here to help you feel better.",
            SpeakOptions {
                context: SpeechContext::Sos,
                priority: Priority::High,
                rate: Some(0.8),
                volume: Some(0.8),
                ..SpeakOptions::default()
            },
        );
        Ok(Event::SosActivated { at: chrono::Utc::now() })
    }

    /// Start one of the SOS calming activities.
    pub fn start_sos_activity(&mut self, activity: SosActivity) {
        if let Some(session) = self.sos.as_mut() {
            session.activity = Some(activity);
        }
        match activity {
            SosActivity::Breathing => {
                self.exercises.start(ExerciseKind::Breathing);
                self.narration.speak(
                    "Breathe with me. In and out. Nice and slow.",
                    SpeakOptions {
                        context: SpeechContext::Breathing,
                        priority: Priority::High,
                        rate: Some(0.7),
                        ..SpeakOptions::default()
                    },
                );
            }
            SosActivity::Sound => {
                // Brown noise is the calmest of the generated beds.
                self.audio.play_noise(NoiseKind::Brown, crate::util::now_ms());
                self.narration.speak(
                    "Listen to the calming sound. Let it help you relax.",
                    SpeakOptions {
                        context: SpeechContext::Sos,
                        priority: Priority::High,
                        rate: Some(0.7),
                        ..SpeakOptions::default()
                    },
                );
            }
            SosActivity::Movement => {
                self.narration.speak(
                    "Try some of these movements. They help your body feel better.",
                    SpeakOptions {
                        context: SpeechContext::Sos,
                        priority: Priority::High,
                        rate: Some(0.8),
                        ..SpeakOptions::default()
                    },
                );
            }
            SosActivity::HelpCalled => {}
        }
    }

    /// Leave crisis mode, logging the resolution with its duration and
    /// chosen activity.
    pub fn resolve_sos(&mut self) -> Result<Option<Event>> {
        let Some(session) = self.sos.take() else {
            return Ok(None);
        };
        self.stop_all_sounds();
        let event = session.resolve();
        let (duration_secs, activity_used) = (event.duration_secs.unwrap_or(0), event.activity_used);
        self.store.log_meltdown(event)?;
        self.narration.speak(
            "Great job! You did so well calming down.",
            SpeakOptions {
                context: SpeechContext::Success,
                priority: Priority::High,
                ..SpeakOptions::default()
            },
        );
        Ok(Some(Event::SosResolved {
            duration_secs,
            activity_used,
            at: chrono::Utc::now(),
        }))
    }

    /// Log a help request, play the alert tone, reassure the child.
    pub fn call_for_help(&mut self) -> Result<Event> {
        if let Some(session) = self.sos.as_mut() {
            session.activity = Some(SosActivity::HelpCalled);
        }
        self.store
            .log_meltdown(MeltdownEvent::new(MeltdownKind::HelpRequested))?;
        self.audio.play_tone(&HELP_ALERT_TONE);
        self.narration.speak(
            "Help is on the way. You're doing great asking for help.",
            SpeakOptions {
                context: SpeechContext::Success,
                priority: Priority::High,
                ..SpeakOptions::default()
            },
        );
        debug!("help requested");
        Ok(Event::HelpRequested { at: chrono::Utc::now() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingSink;
    use crate::store::MemoryBackend;
    use crate::types::MeltdownKind;
    use crate::voice::NullEngine;

    fn app() -> App {
        let store = Store::open(Box::new(MemoryBackend::new()));
        let mut app = App::new(store, Arc::new(NullEngine), Arc::new(RecordingSink::new()));
        let event = app.store.create_profile("Alex", 9).unwrap();
        let Event::ProfileCreated { profile_id, .. } = event else {
            panic!("expected ProfileCreated");
        };
        app.store.switch_profile(Some(profile_id.as_str())).unwrap();
        app
    }

    #[tokio::test(start_paused = true)]
    async fn sos_lifecycle_logs_activation_and_resolution() {
        let mut app = app();
        app.activate_sos().unwrap();
        assert!(app.sos_active());
        app.start_sos_activity(SosActivity::Breathing);
        let event = app.resolve_sos().unwrap().unwrap();
        let Event::SosResolved { activity_used, .. } = event else {
            panic!("expected SosResolved");
        };
        assert_eq!(activity_used, Some(SosActivity::Breathing));
        assert!(!app.sos_active());

        let kinds: Vec<_> = app
            .store
            .current_profile()
            .unwrap()
            .meltdown_log
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            [MeltdownKind::SosActivated, MeltdownKind::SosResolved]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_without_activation_is_a_noop() {
        let mut app = app();
        assert!(app.resolve_sos().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn call_for_help_logs_and_alerts() {
        let mut app = app();
        app.activate_sos().unwrap();
        app.call_for_help().unwrap();
        let kinds: Vec<_> = app
            .store
            .current_profile()
            .unwrap()
            .meltdown_log
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            [MeltdownKind::SosActivated, MeltdownKind::HelpRequested]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_settings_validation_blocks_save() {
        let app = app();
        let bad = TimerSettings {
            focus_minutes: 200,
            ..TimerSettings::default()
        };
        assert!(app.save_timer_settings(bad).is_err());
        // The timer kept its old settings.
        assert_eq!(app.timer.lock().settings().focus_minutes, 25);

        let good = TimerSettings {
            focus_minutes: 45,
            ..TimerSettings::default()
        };
        app.save_timer_settings(good).unwrap();
        assert_eq!(app.timer.lock().settings().focus_minutes, 45);
        let reloaded: TimerSettings = app.store.load_settings_doc(TIMER_SETTINGS_KEY);
        assert_eq!(reloaded.focus_minutes, 45);
    }
}
