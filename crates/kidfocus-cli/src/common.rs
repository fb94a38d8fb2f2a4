//! Shared plumbing for CLI commands.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use kidfocus_core::{App, FileBackend, Store};

use crate::feedback::{ConsoleEngine, ConsoleSink};

/// Open the application over the on-disk store with console feedback.
pub fn open_app() -> Result<App, Box<dyn std::error::Error>> {
    let backend = FileBackend::open()?;
    let store = Store::open(Box::new(backend));
    Ok(App::new(
        store,
        Arc::new(ConsoleEngine::new()),
        Arc::new(ConsoleSink),
    ))
}

/// Build the runtime used by commands with narration or timers.
pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Let queued narration finish before the process exits.
pub async fn drain_narration(app: &App) {
    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    while !app.narration.is_idle() && std::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Ask a yes/no question on stdin. Defaults to no.
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Resolve a profile argument as an id first, then as a name
/// (case-insensitive).
pub fn resolve_profile_id(app: &App, name_or_id: &str) -> Option<String> {
    let profiles = &app.store.document().profiles;
    profiles
        .iter()
        .find(|p| p.id == name_or_id)
        .or_else(|| {
            profiles
                .iter()
                .find(|p| p.name.to_lowercase() == name_or_id.to_lowercase())
        })
        .map(|p| p.id.clone())
}
