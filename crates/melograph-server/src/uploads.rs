//! In-memory registry of upload metadata.
//!
//! The registry is built once at startup and owned by `AppState`; its
//! contents live exactly as long as the process. Uploaded files themselves
//! go under the configured upload directory and are served from there; the
//! registry only tracks what was uploaded.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Metadata for one uploaded recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    /// Registry-assigned identifier.
    pub id: Uuid,
    /// File name as stored in the upload directory.
    pub file_name: String,
    /// MIME type reported at upload time.
    pub content_type: String,
    /// Size of the stored file in bytes.
    pub size_bytes: u64,
    /// RFC 3339 timestamp of registration.
    pub recorded_at: String,
}

/// Keyed store of upload records.
///
/// Uses `std::sync::Mutex` intentionally: all lock acquisitions are brief
/// HashMap operations that never span `.await` points, so a synchronous
/// lock is safe here.
#[derive(Clone, Debug, Default)]
pub struct UploadRegistry {
    records: Arc<Mutex<HashMap<Uuid, UploadRecord>>>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, UploadRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // A panicked writer leaves the map intact; keep serving it.
                tracing::error!("upload registry lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Registers a new upload and returns its assigned id.
    pub fn insert(&self, file_name: &str, content_type: &str, size_bytes: u64) -> Uuid {
        let id = Uuid::new_v4();
        let record = UploadRecord {
            id,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
            recorded_at: Utc::now().to_rfc3339(),
        };
        self.lock().insert(id, record);
        id
    }

    /// Looks up one record by id.
    pub fn get(&self, id: &Uuid) -> Option<UploadRecord> {
        self.lock().get(id).cloned()
    }

    /// Replaces the stored file name of an existing record.
    ///
    /// Returns `false` when the id is unknown.
    pub fn rename(&self, id: &Uuid, file_name: &str) -> bool {
        match self.lock().get_mut(id) {
            Some(record) => {
                record.file_name = file_name.to_string();
                true
            }
            None => false,
        }
    }

    /// Removes a record, returning it if it existed.
    pub fn remove(&self, id: &Uuid) -> Option<UploadRecord> {
        self.lock().remove(id)
    }

    /// All records, newest registration first.
    pub fn list(&self) -> Vec<UploadRecord> {
        let mut records: Vec<UploadRecord> = self.lock().values().cloned().collect();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(a.id.cmp(&b.id)));
        records
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips_metadata() {
        let registry = UploadRegistry::new();
        assert!(registry.is_empty());

        let id = registry.insert("utterance-01.wav", "audio/wav", 44_100);

        let record = registry.get(&id).expect("record should exist");
        assert_eq!(record.id, id);
        assert_eq!(record.file_name, "utterance-01.wav");
        assert_eq!(record.content_type, "audio/wav");
        assert_eq!(record.size_bytes, 44_100);
        assert!(!record.recorded_at.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rename_updates_only_existing_records() {
        let registry = UploadRegistry::new();
        let id = registry.insert("draft.wav", "audio/wav", 10);

        assert!(registry.rename(&id, "final.wav"));
        assert_eq!(
            registry.get(&id).expect("record should exist").file_name,
            "final.wav"
        );

        assert!(!registry.rename(&Uuid::new_v4(), "ghost.wav"));
    }

    #[test]
    fn remove_is_final() {
        let registry = UploadRegistry::new();
        let id = registry.insert("gone.wav", "audio/wav", 10);

        let removed = registry.remove(&id).expect("record should exist");
        assert_eq!(removed.file_name, "gone.wav");
        assert!(registry.get(&id).is_none());
        assert!(registry.remove(&id).is_none());
    }

    #[test]
    fn registry_clones_share_state() {
        let registry = UploadRegistry::new();
        let clone = registry.clone();

        let id = clone.insert("shared.wav", "audio/wav", 10);
        assert!(registry.get(&id).is_some());
    }

    #[test]
    fn list_returns_every_record() {
        let registry = UploadRegistry::new();
        for i in 0..3 {
            registry.insert(&format!("take-{i}.wav"), "audio/wav", i);
        }

        let records = registry.list();
        assert_eq!(records.len(), 3);
    }
}
