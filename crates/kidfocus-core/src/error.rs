//! Core error types for kidfocus-core.
//!
//! Every public operation reports failures through this hierarchy.
//! Internal helper failures are converted at the operation boundary;
//! nothing propagates as a panic.

use thiserror::Error;

/// Core error type for kidfocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad user input (age, minutes, PIN, text length). No state is
    /// mutated when one of these is returned.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage-related errors (serialization, quota).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A platform capability (speech, audio) is unavailable.
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// A persisted document is malformed beyond repair.
    #[error("Data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    /// Serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context.
    #[error("{0}")]
    Custom(String),
}

/// Validation errors. Reported inline near the offending field; the
/// operation is aborted without mutating state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value for a named field.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// A profile with the same name already exists (case-insensitive).
    #[error("A profile with this name already exists")]
    DuplicateProfileName,

    /// An operation requiring a current profile was called without one.
    #[error("Please select a child profile first")]
    NoProfileSelected,

    /// PIN change attempted with the wrong current PIN.
    #[error("Current PIN is incorrect")]
    WrongPin,

    /// New PIN does not match the required 4-digit form.
    #[error("New PIN must be exactly 4 digits")]
    MalformedPin,
}

impl ValidationError {
    /// Shorthand for the common field/message variant.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Storage-specific errors. Storage is best-effort: callers surface these
/// as transient notifications and may offer a cleanup-and-retry path.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend rejected a write for lack of space.
    #[error("Storage quota exceeded while writing {attempted} bytes")]
    QuotaExceeded { attempted: usize },

    /// Reading a key failed.
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Writing a key failed.
    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },
}

/// A platform capability is missing. These never block the primary
/// task/behavior/timer flows; callers degrade to a no-op and log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Speech synthesis is not available")]
    SpeechUnavailable,

    #[error("Audio output is not available")]
    AudioUnavailable,
}

/// A persisted document failed structural validation. The store resets to
/// defaults rather than surfacing these to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("Persisted document has invalid structure")]
    InvalidStructure,

    #[error("Persisted document could not be parsed: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
