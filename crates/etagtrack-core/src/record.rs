use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-client state keyed by identifier.
///
/// `last_visit` renders as RFC 3339 with offset when serialized. `note` is
/// untrusted free text — whoever renders it owes the escaping.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRecord {
    pub visits: u64,
    pub last_visit: DateTime<Utc>,
    pub note: String,
}

impl ClientRecord {
    fn new() -> Self {
        Self {
            visits: 0,
            last_visit: Utc::now(),
            note: String::new(),
        }
    }
}

/// In-memory identifier → record map.
///
/// The map is guarded by an internal mutex; every operation locks, mutates,
/// and hands back a clone, so no caller ever holds a reference into the map.
/// Entries are created lazily and never evicted — they live for the process
/// lifetime, which is acceptable for a proof of concept but unbounded.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Mutex<HashMap<String, ClientRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `identifier`, inserting a fresh one on first
    /// contact. The returned value is a snapshot; later mutations through the
    /// store are not reflected in it.
    pub fn get_or_create(&self, identifier: &str) -> ClientRecord {
        let mut records = self.lock();
        records
            .entry(identifier.to_string())
            .or_insert_with(ClientRecord::new)
            .clone()
    }

    /// Count a tracking-resource fetch: bump the visit counter and stamp the
    /// visit time.
    pub fn record_visit(&self, identifier: &str) {
        let mut records = self.lock();
        let record = records
            .entry(identifier.to_string())
            .or_insert_with(ClientRecord::new);
        record.visits += 1;
        record.last_visit = Utc::now();
    }

    /// Replace the stored free-text note. The text is taken verbatim.
    pub fn set_note(&self, identifier: &str, text: String) {
        let mut records = self.lock();
        records
            .entry(identifier.to_string())
            .or_insert_with(ClientRecord::new)
            .note = text;
    }

    /// Number of identifiers seen so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ClientRecord>> {
        // A poisoned lock only means another thread panicked mid-update; the
        // map itself is still usable.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
