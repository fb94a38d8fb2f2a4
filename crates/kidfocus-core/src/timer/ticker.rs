//! Sub-second probe driving a shared timer.
//!
//! The engine itself has no thread; this spawns the fast repeating probe
//! that calls `tick()` and forwards completion events to the caller. The
//! probe period only affects how promptly completion is noticed, never
//! the displayed time.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::engine::FocusTimer;
use crate::events::Event;

/// Shared handle to a focus timer driven by a ticker.
pub type SharedTimer = Arc<Mutex<FocusTimer>>;

/// Default probe period.
pub const TICK_PERIOD: Duration = Duration::from_millis(250);

/// A running probe task. Cancellation is idempotent.
pub struct TimerTicker {
    handle: Option<JoinHandle<()>>,
}

impl TimerTicker {
    /// Spawn the probe. Completion events are forwarded on `tx`; the task
    /// exits after forwarding a completion.
    pub fn spawn(timer: SharedTimer, tx: UnboundedSender<Event>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let event = timer.lock().tick();
                if let Some(event) = event {
                    let done = matches!(event, Event::TimerCompleted { .. });
                    if tx.send(event).is_err() || done {
                        break;
                    }
                }
            }
        });
        TimerTicker {
            handle: Some(handle),
        }
    }

    /// Stop the probe. Safe to call repeatedly or after completion.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TimerTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
