//! Persistence store: single source of truth for all durable state.
//!
//! One JSON document under one storage key, plus parallel keys for voice
//! settings, timer settings, and the terms-accepted flag. Loading never
//! fails outward: an absent or malformed document resets to defaults.

pub mod backend;
pub mod document;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use document::{
    AppDocument, CleanupDecision, CleanupSummary, ExportDocument, ImportDocument, ImportSummary,
    SaveOutcome, APP_DATA_KEY, DOCUMENT_VERSION, SOFT_SIZE_LIMIT, TERMS_ACCEPTED_KEY,
    TIMER_SETTINGS_KEY, VOICE_SETTINGS_KEY,
};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{CoreError, Result, ValidationError};
use crate::util;

/// Returns `~/.config/kidfocus[-dev]/` based on KIDFOCUS_ENV.
///
/// Set KIDFOCUS_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KIDFOCUS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("kidfocus-dev")
    } else {
        base_dir.join("kidfocus")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default parent PIN installed on first run.
pub const DEFAULT_PIN: &str = "1234";

/// Structural validation and typed decode of a persisted document.
fn decode_document(raw: &str) -> Result<AppDocument, crate::error::DataIntegrityError> {
    use crate::error::DataIntegrityError;

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| DataIntegrityError::ParseFailed(e.to_string()))?;
    if !AppDocument::is_valid_structure(&value) {
        return Err(DataIntegrityError::InvalidStructure);
    }
    serde_json::from_value(value).map_err(|e| DataIntegrityError::ParseFailed(e.to_string()))
}

/// Outcome of the initial load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A structurally valid document was loaded (and re-sanitized).
    Loaded,
    /// The document was absent or malformed; defaults were installed.
    Defaulted,
}

/// The persistence store. Owns the in-memory document and the backend it
/// is serialized to.
pub struct Store {
    backend: Box<dyn StorageBackend>,
    pub(crate) doc: AppDocument,
}

impl Store {
    /// Open the store over a backend, loading the document (or defaults)
    /// and installing the default PIN hash when none is set.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let mut store = Store {
            backend,
            doc: AppDocument::default(),
        };
        let outcome = store.load();
        debug!(?outcome, "store opened");
        if store.doc.settings.parent_pin.is_none() {
            store.doc.settings.parent_pin = util::hash_pin(DEFAULT_PIN);
            if let Err(e) = store.save() {
                warn!(error = %e, "could not persist default PIN");
            }
        }
        store
    }

    /// Load the document from the backend. Any failure (missing key,
    /// parse error, invalid structure) degrades to defaults; a corrupt
    /// document is unrecoverable without losing the session anyway, so it
    /// never surfaces to the user.
    pub fn load(&mut self) -> LoadOutcome {
        let raw = match self.backend.read(APP_DATA_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.doc = AppDocument::default();
                return LoadOutcome::Defaulted;
            }
            Err(e) => {
                warn!(error = %e, "reading persisted document failed, using defaults");
                self.doc = AppDocument::default();
                return LoadOutcome::Defaulted;
            }
        };

        match decode_document(&raw) {
            Ok(mut doc) => {
                doc.sanitize();
                self.doc = doc;
                LoadOutcome::Loaded
            }
            Err(e) => {
                warn!(error = %e, "persisted document rejected, resetting to defaults");
                self.doc = AppDocument::default();
                LoadOutcome::Defaulted
            }
        }
    }

    /// Serialize and write the whole document in one write call.
    ///
    /// If the serialized size crosses the soft threshold, old data is
    /// pruned before writing. A quota failure surfaces as
    /// `StorageError::QuotaExceeded`; callers may confirm a cleanup via
    /// [`Store::cleanup_decision`] and [`Store::cleanup_and_retry`].
    pub fn save(&mut self) -> Result<SaveOutcome> {
        self.doc.version = DOCUMENT_VERSION.to_string();
        self.doc.last_saved = Some(Utc::now());

        let mut serialized = serde_json::to_string(&self.doc)?;
        let mut outcome = SaveOutcome::Saved;
        if serialized.len() > SOFT_SIZE_LIMIT {
            warn!(
                bytes = serialized.len(),
                "document size approaching storage limits, pruning old data"
            );
            let summary = self.doc.cleanup_old_data(Utc::now());
            outcome = SaveOutcome::SavedAfterCleanup(summary);
            serialized = serde_json::to_string(&self.doc)?;
        }

        self.backend.write(APP_DATA_KEY, &serialized)?;
        Ok(outcome)
    }

    /// What a cleanup pass would remove right now.
    pub fn cleanup_decision(&self) -> CleanupDecision {
        self.doc.cleanup_decision(Utc::now())
    }

    /// Run the cleanup pass and retry the save. Used after a
    /// quota-exceeded failure, once the caller has confirmed.
    pub fn cleanup_and_retry(&mut self) -> Result<CleanupSummary> {
        let summary = self.doc.cleanup_old_data(Utc::now());
        self.save()?;
        Ok(summary)
    }

    /// Read-only view of the document.
    pub fn document(&self) -> &AppDocument {
        &self.doc
    }

    // ── PIN handling ─────────────────────────────────────────────────

    /// Recompute and compare the stored PIN hash.
    pub fn validate_pin(&self, input: &str) -> bool {
        match (&self.doc.settings.parent_pin, util::hash_pin(input)) {
            (Some(stored), Some(hashed)) => *stored == hashed,
            _ => false,
        }
    }

    /// Change the parent PIN. The current PIN must validate and the new
    /// PIN must be exactly four digits.
    pub fn change_pin(&mut self, current: &str, new: &str) -> Result<()> {
        if !self.validate_pin(current) {
            return Err(ValidationError::WrongPin.into());
        }
        if new.len() != 4 || !new.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::MalformedPin.into());
        }
        self.doc.settings.parent_pin = util::hash_pin(new);
        self.save()?;
        Ok(())
    }

    // ── Export / import ──────────────────────────────────────────────

    /// Pretty-printed JSON export of the document with the PIN removed.
    pub fn export_data(&self) -> Result<String> {
        let mut settings = self.doc.settings.clone();
        settings.parent_pin = None;
        let export = ExportDocument {
            profiles: self.doc.profiles.clone(),
            settings,
            routines: self.doc.routines.clone(),
            export_date: Utc::now(),
            version: DOCUMENT_VERSION.to_string(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Merge an exported payload into the existing document: profiles and
    /// routines are concatenated (no replacement, no deduplication), then
    /// sanitized and saved. Settings in the payload are ignored.
    pub fn import_data(&mut self, payload: &str) -> Result<ImportSummary> {
        let value: serde_json::Value = serde_json::from_str(payload).map_err(|_| {
            ValidationError::invalid("import", "Failed to parse imported data")
        })?;
        if !AppDocument::is_valid_structure(&value) {
            return Err(ValidationError::invalid("import", "Invalid data format").into());
        }
        let incoming: ImportDocument = serde_json::from_value(value)
            .map_err(|_| ValidationError::invalid("import", "Invalid data format"))?;

        let summary = ImportSummary {
            profiles_added: incoming.profiles.len(),
            routines_added: incoming.routines.len(),
        };
        self.doc.profiles.extend(incoming.profiles);
        self.doc.routines.extend(incoming.routines);
        self.doc.sanitize();
        self.save()?;
        Ok(summary)
    }

    /// Remove every persisted key and reset the document to defaults
    /// (with a fresh default PIN).
    pub fn clear_all(&mut self) -> Result<()> {
        self.backend.clear().map_err(CoreError::Storage)?;
        self.doc = AppDocument::default();
        self.doc.settings.parent_pin = util::hash_pin(DEFAULT_PIN);
        self.save()?;
        Ok(())
    }

    // ── Parallel settings documents ──────────────────────────────────

    /// Load a settings sub-document from its own key, falling back to its
    /// defaults on any failure.
    pub fn load_settings_doc<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.backend.read(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "settings document failed to decode, using defaults");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "settings document failed to load, using defaults");
                T::default()
            }
        }
    }

    /// Persist a settings sub-document under its own key.
    pub fn save_settings_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        self.backend.write(key, &serialized)?;
        Ok(())
    }

    /// Whether the terms notice has been accepted.
    pub fn terms_accepted(&self) -> bool {
        matches!(
            self.backend.read(TERMS_ACCEPTED_KEY),
            Ok(Some(raw)) if raw == "true"
        )
    }

    /// Persist the terms-accepted flag.
    pub fn set_terms_accepted(&mut self, accepted: bool) -> Result<()> {
        self.backend
            .write(TERMS_ACCEPTED_KEY, if accepted { "true" } else { "false" })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Profile, Task, TaskPriority};

    fn memory_store() -> Store {
        Store::open(Box::new(MemoryBackend::new()))
    }

    #[test]
    fn open_on_empty_backend_installs_defaults_and_pin() {
        let store = memory_store();
        assert!(store.document().profiles.is_empty());
        assert!(store.validate_pin(DEFAULT_PIN));
        assert!(!store.validate_pin("0000"));
    }

    #[test]
    fn load_resets_on_garbage() {
        let backend = MemoryBackend::new();
        backend.write(APP_DATA_KEY, "not json at all").unwrap();
        let store = Store::open(Box::new(backend));
        assert!(store.document().profiles.is_empty());
    }

    #[test]
    fn load_resets_on_invalid_structure() {
        let backend = MemoryBackend::new();
        backend
            .write(APP_DATA_KEY, r#"{"profiles": 42, "settings": {}}"#)
            .unwrap();
        let store = Store::open(Box::new(backend));
        assert!(store.document().profiles.is_empty());
    }

    #[test]
    fn load_sanitizes_text_fields() {
        let backend = MemoryBackend::new();
        let mut doc = AppDocument::default();
        let mut profile = Profile::new("<script>Alex", 9);
        profile
            .tasks
            .push(Task::new("\"quoted\" chore", "Chores", TaskPriority::Low, None));
        doc.profiles.push(profile);
        backend
            .write(APP_DATA_KEY, &serde_json::to_string(&doc).unwrap())
            .unwrap();

        let store = Store::open(Box::new(backend));
        assert_eq!(store.document().profiles[0].name, "scriptAlex");
        assert_eq!(store.document().profiles[0].tasks[0].text, "quoted chore");
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let backend = MemoryBackend::new();
        let mut store = Store::open(Box::new(backend));
        store.doc.profiles.push(Profile::new("Alex", 9));
        store.save().unwrap();

        store.load();
        assert_eq!(store.document().profiles.len(), 1);
        assert_eq!(store.document().profiles[0].name, "Alex");
        assert_eq!(store.document().version, DOCUMENT_VERSION);
        assert!(store.document().last_saved.is_some());
    }

    #[test]
    fn quota_failure_surfaces_and_cleanup_retries() {
        let mut store = Store::open(Box::new(MemoryBackend::with_capacity(1000)));
        let mut profile = Profile::new("Alex", 9);
        for i in 0..50 {
            let mut task = Task::new(format!("Old chore {i}"), "Chores", TaskPriority::Low, None);
            task.completed = true;
            task.date_completed = Some(Utc::now() - chrono::Duration::days(60));
            profile.tasks.push(task);
        }
        store.doc.profiles.push(profile);

        let err = store.save().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Storage(crate::error::StorageError::QuotaExceeded { .. })
        ));
        assert!(store.cleanup_decision().has_anything_to_prune());

        let summary = store.cleanup_and_retry().unwrap();
        assert_eq!(summary.tasks_removed, 50);
    }

    #[test]
    fn export_strips_pin_and_import_merges() {
        let mut store = memory_store();
        store.doc.profiles.push(Profile::new("Alex", 9));
        store.save().unwrap();

        let exported = store.export_data().unwrap();
        assert!(!exported.contains("parent_pin"));
        assert!(exported.contains("export_date"));

        let mut fresh = memory_store();
        let summary = fresh.import_data(&exported).unwrap();
        assert_eq!(summary.profiles_added, 1);
        assert_eq!(fresh.document().profiles.len(), 1);
        assert_eq!(fresh.document().profiles[0].name, "Alex");
        // The import must not have touched the fresh store's PIN.
        assert!(fresh.validate_pin(DEFAULT_PIN));
    }

    #[test]
    fn import_concatenates_without_dedup() {
        let mut store = memory_store();
        store.doc.profiles.push(Profile::new("Alex", 9));
        store.save().unwrap();
        let exported = store.export_data().unwrap();

        store.import_data(&exported).unwrap();
        assert_eq!(store.document().profiles.len(), 2);
    }

    #[test]
    fn import_rejects_invalid_payloads() {
        let mut store = memory_store();
        assert!(store.import_data("nonsense").is_err());
        assert!(store.import_data(r#"{"settings": {}}"#).is_err());
        assert!(store.document().profiles.is_empty());
    }

    #[test]
    fn change_pin_scenarios() {
        let mut store = memory_store();
        let stored_before = store.document().settings.parent_pin.clone();

        // Non-digit new PIN fails validation.
        let err = store.change_pin("1234", "12a4").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MalformedPin)
        ));

        // Wrong current PIN fails and leaves the hash unchanged.
        let err = store.change_pin("0000", "5555").unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::WrongPin)));
        assert_eq!(store.document().settings.parent_pin, stored_before);

        // Valid change takes effect.
        store.change_pin("1234", "5678").unwrap();
        assert!(store.validate_pin("5678"));
        assert!(!store.validate_pin("1234"));
    }

    #[test]
    fn terms_flag_roundtrip() {
        let mut store = memory_store();
        assert!(!store.terms_accepted());
        store.set_terms_accepted(true).unwrap();
        assert!(store.terms_accepted());
    }

    #[test]
    fn settings_doc_falls_back_to_default() {
        let store = memory_store();
        let settings: crate::timer::TimerSettings =
            store.load_settings_doc(TIMER_SETTINGS_KEY);
        assert_eq!(settings.focus_minutes, 25);
    }
}
