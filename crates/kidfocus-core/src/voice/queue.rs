//! The narration queue: serializes and paces calls to the speech engine.
//!
//! Draining is a single cooperative task polling at a fixed short
//! interval. Polling, not events: the platform's completion events are
//! unreliable across environments, so the queue observes `is_busy()`
//! instead. FIFO order is preserved; explicit interruption is the only
//! reordering mechanism.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::phrases::{self, BreathPhase};
use super::settings::VoiceSettings;
use super::{Priority, SpeakOptions, SpeechContext, SpeechEngine, Utterance, VoiceInfo};

/// Queue re-check period. Also the granularity at which utterance
/// completion is observed.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settle delay after every utterance, absorbing engine latency in
/// ending events. Independent of the inter-utterance gap.
pub const SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Pause after a cancellation before the replacing utterance is spoken.
pub const CANCEL_SETTLE: Duration = Duration::from_millis(150);

const VOICE_RETRY_DELAY: Duration = Duration::from_secs(1);

struct QueuedUtterance {
    text: String,
    delay_ms: u64,
    interrupt: bool,
    rate: f32,
    pitch: f32,
    volume: f32,
    enqueued_at: Instant,
}

struct Shared {
    queue: Mutex<VecDeque<QueuedUtterance>>,
    last_speech_end: Mutex<Option<Instant>>,
    settings: Mutex<VoiceSettings>,
    voices: Mutex<Vec<VoiceInfo>>,
    shutdown: AtomicBool,
    phrase_cursor: AtomicUsize,
}

/// Priority-aware, rate-limited scheduler over a single-utterance speech
/// engine. Cheap to clone; all clones share one queue and drain task.
#[derive(Clone)]
pub struct NarrationQueue {
    engine: Arc<dyn SpeechEngine>,
    shared: Arc<Shared>,
    drain: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NarrationQueue {
    pub fn new(engine: Arc<dyn SpeechEngine>, settings: VoiceSettings) -> Self {
        NarrationQueue {
            engine,
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                last_speech_end: Mutex::new(None),
                settings: Mutex::new(settings),
                voices: Mutex::new(Vec::new()),
                shutdown: AtomicBool::new(false),
                phrase_cursor: AtomicUsize::new(0),
            }),
            drain: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the drain task and the voice enumeration retries. Requires a
    /// running tokio runtime. Calling twice is a no-op.
    pub fn start(&self) {
        let mut drain = self.drain.lock();
        if drain.is_some() {
            return;
        }
        if !self.engine.is_supported() {
            warn!("speech synthesis not supported; narration disabled");
            return;
        }
        self.shared.shutdown.store(false, Ordering::Relaxed);

        // The platform may report zero voices until an async event or a
        // user gesture; retry shortly after startup.
        if self.refresh_voices() == 0 {
            let this = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(VOICE_RETRY_DELAY).await;
                if this.voices().is_empty() {
                    this.refresh_voices();
                }
            });
        }

        *drain = Some(tokio::spawn(drive(
            self.engine.clone(),
            self.shared.clone(),
        )));
    }

    /// Stop the drain task. Idempotent; queued items stay queued.
    pub fn stop(&self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.drain.lock().take() {
            handle.abort();
        }
    }

    /// Enqueue text for narration.
    ///
    /// No-op when narration is disabled, the platform is unsupported, or
    /// the text is empty. `interrupt`/high priority clears the pending
    /// queue, cancels the in-flight utterance, and floors the delay to
    /// the `quick` timing.
    pub fn speak(&self, text: &str, opts: SpeakOptions) {
        if text.is_empty() || !self.engine.is_supported() {
            return;
        }
        let (enabled, quick, default_delay, speed, pitch, volume) = {
            let s = self.shared.settings.lock();
            (
                s.enabled,
                s.timing.quick,
                s.timing.delay_for(opts.context),
                s.speed,
                s.pitch,
                s.volume,
            )
        };
        if !enabled {
            return;
        }

        let mut delay_ms = opts.delay_ms.unwrap_or(default_delay);
        if opts.interrupt || opts.priority == Priority::High {
            self.shared.queue.lock().clear();
            self.engine.cancel();
            delay_ms = delay_ms.min(quick);
        }

        self.shared.queue.lock().push_back(QueuedUtterance {
            text: text.to_string(),
            delay_ms,
            interrupt: opts.interrupt,
            rate: opts.rate.unwrap_or(speed),
            pitch: opts.pitch.unwrap_or(pitch),
            volume: opts.volume.unwrap_or(volume),
            enqueued_at: Instant::now(),
        });
    }

    /// Cancel the in-flight utterance and drop everything queued.
    pub fn cancel_all(&self) {
        self.engine.cancel();
        self.shared.queue.lock().clear();
        *self.shared.last_speech_end.lock() = Some(Instant::now());
    }

    /// Number of utterances waiting in the queue.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// True when nothing is queued and nothing is speaking.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0 && !self.engine.is_busy()
    }

    // ── Voice enumeration ────────────────────────────────────────────

    /// Re-enumerate platform voices. Returns how many are now known.
    /// Zero voices is non-fatal: speech proceeds with the engine default.
    pub fn refresh_voices(&self) -> usize {
        let voices = self.engine.voices();
        if voices.is_empty() {
            debug!("no voices available yet");
            return self.shared.voices.lock().len();
        }
        let english = voices.iter().position(|v| v.lang.starts_with("en"));
        let count = voices.len();
        *self.shared.voices.lock() = voices;

        let mut settings = self.shared.settings.lock();
        if settings.selected_voice.is_none() {
            if let Some(index) = english {
                settings.selected_voice = Some(index);
                debug!(index, "auto-selected English voice");
            }
        }
        count
    }

    /// Hook for the platform's voices-changed notification.
    pub fn notify_voices_changed(&self) {
        self.refresh_voices();
    }

    /// Hook for the first user interaction; some platforms only populate
    /// the voice list after a gesture.
    pub fn notify_user_interaction(&self) {
        if self.voices().is_empty() {
            self.refresh_voices();
        }
    }

    pub fn voices(&self) -> Vec<VoiceInfo> {
        self.shared.voices.lock().clone()
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> VoiceSettings {
        self.shared.settings.lock().clone()
    }

    pub fn update_settings(&self, mutate: impl FnOnce(&mut VoiceSettings)) -> VoiceSettings {
        let mut settings = self.shared.settings.lock();
        mutate(&mut settings);
        settings.clone()
    }

    // ── Canned phrases ───────────────────────────────────────────────

    pub fn speak_task_completion(&self, task_text: &str) {
        let cursor = self.shared.phrase_cursor.fetch_add(1, Ordering::Relaxed);
        self.speak(
            &phrases::task_completion(cursor, task_text),
            SpeakOptions {
                context: SpeechContext::TaskCompletion,
                ..SpeakOptions::default()
            },
        );
    }

    pub fn speak_behavior_encouragement(&self, behavior: &str) {
        let cursor = self.shared.phrase_cursor.fetch_add(1, Ordering::Relaxed);
        self.speak(
            &phrases::behavior_encouragement(cursor, behavior),
            SpeakOptions {
                context: SpeechContext::Behavior,
                ..SpeakOptions::default()
            },
        );
    }

    pub fn speak_exercise_instruction(&self, instruction: &str, is_first: bool) {
        self.speak(
            instruction,
            SpeakOptions {
                context: SpeechContext::ExerciseInstruction,
                priority: if is_first {
                    Priority::High
                } else {
                    Priority::Normal
                },
                rate: Some(0.8),
                ..SpeakOptions::default()
            },
        );
    }

    pub fn speak_timer_complete(&self) {
        self.speak(
            phrases::TIMER_COMPLETE,
            SpeakOptions {
                context: SpeechContext::TimerComplete,
                priority: Priority::High,
                interrupt: true,
                ..SpeakOptions::default()
            },
        );
    }

    pub fn speak_error(&self, message: &str) {
        self.speak(
            message,
            SpeakOptions {
                context: SpeechContext::Error,
                priority: Priority::High,
                ..SpeakOptions::default()
            },
        );
    }

    pub fn speak_success(&self, message: &str) {
        self.speak(
            message,
            SpeakOptions {
                context: SpeechContext::Success,
                ..SpeakOptions::default()
            },
        );
    }

    pub fn speak_breathing_cue(&self, phase: BreathPhase, count: Option<u32>) {
        self.speak(
            &phrases::breathing_cue(phase, count),
            SpeakOptions {
                context: SpeechContext::Breathing,
                priority: Priority::High,
                rate: Some(0.7),
                ..SpeakOptions::default()
            },
        );
    }

    // ── Test hooks ───────────────────────────────────────────────────

    #[cfg(test)]
    pub(crate) fn queued_texts(&self) -> Vec<String> {
        self.shared
            .queue
            .lock()
            .iter()
            .map(|item| item.text.clone())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn queued_delays(&self) -> Vec<u64> {
        self.shared
            .queue
            .lock()
            .iter()
            .map(|item| item.delay_ms)
            .collect()
    }
}

/// The drain loop.
///
/// One item at a time: wait out the engine, pop the head, enforce the
/// inter-utterance gap, speak, poll to completion, settle, repeat.
async fn drive(engine: Arc<dyn SpeechEngine>, shared: Arc<Shared>) {
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        if shared.shutdown.load(Ordering::Relaxed) {
            break;
        }
        if engine.is_busy() {
            continue;
        }
        let Some(item) = shared.queue.lock().pop_front() else {
            continue;
        };

        // Minimum silence between utterances, even when the item asked
        // for zero delay.
        let wait_ms = {
            let last_end = *shared.last_speech_end.lock();
            let gap = shared.settings.lock().timing.overlap_prevention;
            let since_last = last_end
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(u64::MAX);
            item.delay_ms.max(gap.saturating_sub(since_last))
        };
        if wait_ms > 0 {
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        if item.interrupt {
            // Tell the engine to cancel, then give the cancellation a
            // moment to settle before speaking directly.
            engine.cancel();
            tokio::time::sleep(CANCEL_SETTLE).await;
        } else if engine.is_busy() {
            // The engine went busy while we waited. Requeue at the head
            // rather than dropping; FIFO order is preserved.
            shared.queue.lock().push_front(item);
            continue;
        }

        let utterance = {
            let settings = shared.settings.lock();
            Utterance {
                text: item.text.clone(),
                rate: item.rate,
                pitch: item.pitch,
                volume: item.volume,
                voice: settings.selected_voice,
            }
        };

        debug!(
            text = %item.text,
            queued_ms = item.enqueued_at.elapsed().as_millis() as u64,
            "speaking"
        );
        *shared.last_speech_end.lock() = Some(Instant::now());
        if let Err(e) = engine.speak(&utterance) {
            warn!(error = %e, "utterance failed");
            *shared.last_speech_end.lock() = Some(Instant::now());
            continue;
        }

        while engine.is_busy() {
            if shared.shutdown.load(Ordering::Relaxed) {
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        *shared.last_speech_end.lock() = Some(Instant::now());
        tokio::time::sleep(SETTLE_DELAY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapabilityError;

    const UTTER_MS: u64 = 1000;

    #[derive(Default)]
    struct FakeInner {
        spoken: Vec<(String, Instant)>,
        busy_until: Option<Instant>,
        cancels: usize,
        voices: Vec<VoiceInfo>,
    }

    #[derive(Clone)]
    struct FakeEngine {
        inner: Arc<Mutex<FakeInner>>,
    }

    impl FakeEngine {
        fn new() -> Self {
            let engine = FakeEngine {
                inner: Arc::new(Mutex::new(FakeInner::default())),
            };
            engine.inner.lock().voices = vec![VoiceInfo {
                name: "Test".to_string(),
                lang: "en-US".to_string(),
                default: true,
            }];
            engine
        }

        fn spoken(&self) -> Vec<(String, Instant)> {
            self.inner.lock().spoken.clone()
        }

        fn cancels(&self) -> usize {
            self.inner.lock().cancels
        }

        fn force_busy_until(&self, until: Instant) {
            self.inner.lock().busy_until = Some(until);
        }
    }

    impl SpeechEngine for FakeEngine {
        fn speak(&self, utterance: &Utterance) -> Result<(), CapabilityError> {
            let mut inner = self.inner.lock();
            inner.spoken.push((utterance.text.clone(), Instant::now()));
            inner.busy_until = Some(Instant::now() + Duration::from_millis(UTTER_MS));
            Ok(())
        }

        fn cancel(&self) {
            let mut inner = self.inner.lock();
            inner.busy_until = None;
            inner.cancels += 1;
        }

        fn is_busy(&self) -> bool {
            self.inner
                .lock()
                .busy_until
                .is_some_and(|until| Instant::now() < until)
        }

        fn voices(&self) -> Vec<VoiceInfo> {
            self.inner.lock().voices.clone()
        }
    }

    fn queue_with(engine: &FakeEngine) -> NarrationQueue {
        NarrationQueue::new(Arc::new(engine.clone()), VoiceSettings::default())
    }

    fn say(queue: &NarrationQueue, text: &str) {
        queue.speak(text, SpeakOptions::default());
    }

    #[tokio::test(start_paused = true)]
    async fn fifo_order_with_minimum_gap() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        queue.start();

        for text in ["one", "two", "three"] {
            queue.speak(
                text,
                SpeakOptions {
                    delay_ms: Some(0),
                    ..SpeakOptions::default()
                },
            );
        }
        tokio::time::sleep(Duration::from_secs(30)).await;

        let spoken = engine.spoken();
        let texts: Vec<_> = spoken.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);

        let gap = Duration::from_millis(200);
        let utter = Duration::from_millis(UTTER_MS);
        for pair in spoken.windows(2) {
            let end_of_first = pair[0].1 + utter;
            assert!(
                pair[1].1.duration_since(end_of_first) >= gap,
                "inter-utterance gap violated"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_clears_queue_and_speaks_next() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        queue.start();

        queue.speak(
            "one",
            SpeakOptions {
                delay_ms: Some(0),
                ..SpeakOptions::default()
            },
        );
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(engine.spoken().len(), 1);

        say(&queue, "two");
        say(&queue, "three");
        queue.speak(
            "urgent",
            SpeakOptions {
                interrupt: true,
                ..SpeakOptions::default()
            },
        );
        assert_eq!(queue.queued_texts(), ["urgent"]);
        assert!(engine.cancels() >= 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let texts: Vec<_> = engine.spoken().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(texts, ["one", "urgent"]);
    }

    #[tokio::test(start_paused = true)]
    async fn high_priority_floors_delay_to_quick() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        // ExerciseInstruction default delay is 1200ms; high priority
        // floors it to the 300ms quick timing.
        queue.speak(
            "first step",
            SpeakOptions {
                context: SpeechContext::ExerciseInstruction,
                priority: Priority::High,
                ..SpeakOptions::default()
            },
        );
        assert_eq!(queue.queued_delays(), [300]);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_engine_requeues_instead_of_dropping() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        queue.start();

        queue.speak(
            "patient",
            SpeakOptions {
                delay_ms: Some(400),
                ..SpeakOptions::default()
            },
        );
        // Let the drain pop the item and enter its pre-speech wait, then
        // make the engine busy underneath it.
        tokio::time::sleep(Duration::from_millis(200)).await;
        engine.force_busy_until(Instant::now() + Duration::from_millis(600));

        tokio::time::sleep(Duration::from_secs(10)).await;
        let texts: Vec<_> = engine.spoken().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(texts, ["patient"]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_or_empty_is_a_noop() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        say(&queue, "");
        assert!(queue.queued_texts().is_empty());

        queue.update_settings(|s| s.enabled = false);
        say(&queue, "ignored");
        assert!(queue.queued_texts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_engine_is_a_noop() {
        let queue = NarrationQueue::new(Arc::new(super::super::NullEngine), VoiceSettings::default());
        queue.start();
        say(&queue, "nobody listens");
        assert!(queue.queued_texts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn voices_auto_select_first_english() {
        let engine = FakeEngine::new();
        engine.inner.lock().voices = vec![
            VoiceInfo {
                name: "Colette".to_string(),
                lang: "fr-FR".to_string(),
                default: true,
            },
            VoiceInfo {
                name: "Daniel".to_string(),
                lang: "en-GB".to_string(),
                default: false,
            },
        ];
        let queue = queue_with(&engine);
        assert_eq!(queue.refresh_voices(), 2);
        assert_eq!(queue.settings().selected_voice, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_voice_list_degrades_gracefully() {
        let engine = FakeEngine::new();
        engine.inner.lock().voices = Vec::new();
        let queue = queue_with(&engine);
        queue.start();
        assert_eq!(queue.refresh_voices(), 0);

        queue.speak(
            "still speaks",
            SpeakOptions {
                delay_ms: Some(0),
                ..SpeakOptions::default()
            },
        );
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.spoken().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_silences_everything() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        say(&queue, "a");
        say(&queue, "b");
        queue.cancel_all();
        assert!(queue.queued_texts().is_empty());
        assert_eq!(engine.cancels(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let engine = FakeEngine::new();
        let queue = queue_with(&engine);
        queue.start();
        queue.stop();
        queue.stop();
    }
}
