//! Storage backends: the key-value seam beneath the persistence store.
//!
//! The store persists whole string values under flat keys. Backends are
//! best-effort; a quota failure surfaces as a typed error the store can
//! turn into a cleanup-and-retry decision.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::StorageError;

/// Key-value persistence seam. Values are whole serialized documents;
/// writes replace the previous value atomically from the caller's view.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// One file per key under the application data directory.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open the backend rooted at the default data directory.
    pub fn open() -> Result<Self, StorageError> {
        let root = super::data_dir().map_err(|e| StorageError::ReadFailed {
            key: "data_dir".to_string(),
            message: e.to_string(),
        })?;
        Ok(FileBackend { root })
    }

    /// Open the backend rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        FileBackend { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(self.path_for(key), value).map_err(|e| {
            // ENOSPC is the filesystem's quota failure.
            if e.raw_os_error() == Some(28) {
                StorageError::QuotaExceeded {
                    attempted: value.len(),
                }
            } else {
                StorageError::WriteFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    key: "*".to_string(),
                    message: e.to_string(),
                })
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path).map_err(|e| StorageError::WriteFailed {
                    key: path.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}

/// In-memory backend. An optional byte capacity makes quota failures
/// reproducible in tests.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    capacity_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    pub fn with_capacity(capacity_bytes: usize) -> Self {
        MemoryBackend {
            entries: Mutex::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        if let Some(cap) = self.capacity_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > cap {
                return Err(StorageError::QuotaExceeded {
                    attempted: value.len(),
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("missing").unwrap(), None);
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
        backend.remove("k").unwrap();
        assert_eq!(backend.read("k").unwrap(), None);
    }

    #[test]
    fn memory_backend_enforces_capacity() {
        let backend = MemoryBackend::with_capacity(10);
        backend.write("a", "12345").unwrap();
        let err = backend.write("b", "1234567").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { attempted: 7 }));
        // Replacing an existing value counts its old size out first.
        backend.write("a", "1234567890").unwrap();
    }

    #[test]
    fn file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::at(dir.path());
        assert_eq!(backend.read("app_data").unwrap(), None);
        backend.write("app_data", "{}").unwrap();
        assert_eq!(backend.read("app_data").unwrap().as_deref(), Some("{}"));
        backend.clear().unwrap();
        assert_eq!(backend.read("app_data").unwrap(), None);
    }
}
