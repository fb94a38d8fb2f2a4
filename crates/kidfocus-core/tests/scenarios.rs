//! End-to-end scenarios over the public API: store, operations, timer,
//! narration, and SOS working together against an in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use kidfocus_core::{
    App, CapabilityError, Event, MemoryBackend, SosActivity, SpeechEngine, Store, TaskPriority,
    Utterance, VoiceInfo,
};

/// Engine that records utterances and is never busy, so queued items
/// drain as fast as the scheduler allows.
#[derive(Clone, Default)]
struct RecordingEngine {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingEngine {
    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl SpeechEngine for RecordingEngine {
    fn speak(&self, utterance: &Utterance) -> Result<(), CapabilityError> {
        self.spoken.lock().push(utterance.text.clone());
        Ok(())
    }

    fn cancel(&self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            name: "Test".to_string(),
            lang: "en-US".to_string(),
            default: true,
        }]
    }
}

fn app_with_profile() -> (App, RecordingEngine) {
    let engine = RecordingEngine::default();
    let store = Store::open(Box::new(MemoryBackend::new()));
    let mut app = App::new(
        store,
        Arc::new(engine.clone()),
        Arc::new(kidfocus_core::RecordingSink::new()),
    );
    let Event::ProfileCreated { profile_id, .. } = app.store.create_profile("Alex", 9).unwrap()
    else {
        panic!("expected ProfileCreated");
    };
    app.store.switch_profile(Some(profile_id.as_str())).unwrap();
    (app, engine)
}

#[tokio::test(start_paused = true)]
async fn create_profile_add_and_complete_task() {
    let (mut app, _engine) = app_with_profile();

    let Event::TaskAdded { task_id, .. } = app
        .store
        .add_task("Brush teeth", "Hygiene", TaskPriority::Normal, None)
        .unwrap()
    else {
        panic!("expected TaskAdded");
    };
    let event = app.complete_task(&task_id).unwrap().unwrap();

    let Event::TaskCompleted { reward_points, .. } = event else {
        panic!("expected TaskCompleted");
    };
    assert_eq!(reward_points, app.store.document().settings.task_points);

    let profile = app.store.current_profile().unwrap();
    assert!(profile.tasks[0].completed);
    assert!(profile.tasks[0].date_completed.is_some());
    assert_eq!(profile.reward_points, 5);
}

#[tokio::test(start_paused = true)]
async fn task_completion_is_narrated_once() {
    let (mut app, engine) = app_with_profile();
    app.init();

    let Event::TaskAdded { task_id, .. } = app
        .store
        .add_task("Brush teeth", "Hygiene", TaskPriority::Normal, None)
        .unwrap()
    else {
        panic!("expected TaskAdded");
    };
    app.complete_task(&task_id).unwrap();
    // Second completion awards nothing and says nothing.
    app.complete_task(&task_id).unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let spoken = engine.spoken();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].contains("Brush teeth"));
    assert_eq!(app.store.current_profile().unwrap().reward_points, 5);
    app.shutdown();
}

#[tokio::test(start_paused = true)]
async fn behaviors_are_narrated_in_order() {
    let (mut app, engine) = app_with_profile();
    app.init();

    app.mark_behavior("Sharing").unwrap();
    app.mark_behavior("Kindness").unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;

    let spoken = engine.spoken();
    assert_eq!(spoken.len(), 2);
    assert!(spoken[0].contains("sharing"));
    assert!(spoken[1].contains("kindness"));

    let profile = app.store.current_profile().unwrap();
    assert_eq!(profile.behaviors.len(), 2);
    assert_eq!(profile.reward_points, 6);
    app.shutdown();
}

#[tokio::test(start_paused = true)]
async fn timer_completion_announces_with_interrupt() {
    let (mut app, engine) = app_with_profile();
    app.init();

    // Queue some routine narration, then let the timer complete: the
    // completion announcement clears the backlog.
    app.mark_behavior("Patience").unwrap();
    app.start_timer(25).unwrap();
    app.on_timer_complete();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let spoken = engine.spoken();
    assert_eq!(spoken.last().unwrap(), "Timer finished! Great job staying focused!");
    app.shutdown();
}

#[tokio::test(start_paused = true)]
async fn timer_rejects_out_of_range_minutes() {
    let (app, _engine) = app_with_profile();
    assert!(app.start_timer(0).is_err());
    assert!(app.start_timer(121).is_err());
    assert_eq!(app.timer.lock().display(), "25:00");
    app.start_timer(60).unwrap();
    assert_eq!(app.timer.lock().remaining_secs(), 3600);
}

#[tokio::test(start_paused = true)]
async fn sos_flow_logs_and_reports_patterns() {
    let (mut app, _engine) = app_with_profile();
    app.init();

    for _ in 0..3 {
        app.activate_sos().unwrap();
        app.start_sos_activity(SosActivity::Sound);
        app.resolve_sos().unwrap();
    }

    let profile = app.store.current_profile().unwrap();
    assert_eq!(profile.meltdown_log.len(), 6);

    let report = kidfocus_core::meltdown_patterns(profile, chrono::Utc::now());
    let kidfocus_core::PatternReport::Patterns(patterns) = report else {
        panic!("expected patterns after three activations");
    };
    assert_eq!(patterns.total_events, 3);
    assert_eq!(patterns.last_7_days, 3);
    assert_eq!(patterns.most_effective_strategy, Some(SosActivity::Sound));
    app.shutdown();
}

#[tokio::test(start_paused = true)]
async fn export_import_roundtrip_preserves_profiles_not_pin() {
    let (mut app, _engine) = app_with_profile();
    let Event::TaskAdded { task_id, .. } = app
        .store
        .add_task("Brush teeth", "Hygiene", TaskPriority::Normal, None)
        .unwrap()
    else {
        panic!("expected TaskAdded");
    };
    app.complete_task(&task_id).unwrap();

    let exported = app.store.export_data().unwrap();
    assert!(!exported.contains("parent_pin"));

    let mut fresh = Store::open(Box::new(MemoryBackend::new()));
    fresh.change_pin("1234", "9999").unwrap();
    fresh.import_data(&exported).unwrap();

    assert_eq!(fresh.document().profiles.len(), 1);
    let imported = &fresh.document().profiles[0];
    assert_eq!(imported.name, "Alex");
    assert_eq!(imported.reward_points, 5);
    assert!(imported.tasks[0].completed);
    // The importing store's own PIN survived untouched.
    assert!(fresh.validate_pin("9999"));
}

#[tokio::test(start_paused = true)]
async fn persisted_state_survives_reopen() {
    let backend = Arc::new(MemoryBackend::new());

    struct SharedBackend(Arc<MemoryBackend>);
    impl kidfocus_core::store::StorageBackend for SharedBackend {
        fn read(&self, key: &str) -> Result<Option<String>, kidfocus_core::StorageError> {
            self.0.read(key)
        }
        fn write(&self, key: &str, value: &str) -> Result<(), kidfocus_core::StorageError> {
            self.0.write(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), kidfocus_core::StorageError> {
            self.0.remove(key)
        }
        fn clear(&self) -> Result<(), kidfocus_core::StorageError> {
            self.0.clear()
        }
    }
    use kidfocus_core::store::StorageBackend;

    let mut store = Store::open(Box::new(SharedBackend(backend.clone())));
    store.create_profile("Alex", 9).unwrap();
    store.change_pin("1234", "4321").unwrap();

    let reopened = Store::open(Box::new(SharedBackend(backend)));
    assert_eq!(reopened.document().profiles.len(), 1);
    assert!(reopened.validate_pin("4321"));
}
