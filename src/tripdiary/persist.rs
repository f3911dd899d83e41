//! Versioned persistence envelope and the background write-through worker.
//!
//! The durable record is a single JSON document under [`STORAGE_KEY`]:
//! `{ "version": <u32>, "state": { "trips": [...], "vehicles": [...] } }`.
//!
//! On load, a record older than [`CURRENT_VERSION`] is run through the
//! migration table in order, each step receiving the previous step's output.
//! The one shipped step (target version 3) applies the heavy-payload
//! stripper to scrub inline base64 images persisted by earlier releases. A
//! record that cannot be parsed at all is treated as corrupt and replaced by
//! defaults rather than crashing startup.
//!
//! Writes are fire-and-forget: [`Persister`] owns the [`DualStore`] on a
//! dedicated thread fed by a channel, so a mutation completes and is visible
//! in memory immediately while the durable write happens behind it. A crash
//! between a mutation and its write loses that one mutation; that bounded
//! window is an accepted trade-off of the write-through design.

use crate::error::Result;
use crate::state::StateSnapshot;
use crate::store::adapter::DualStore;
use crate::strip::strip_state;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender, SyncSender};
use std::thread::{self, JoinHandle};

/// The fixed key the whole state is persisted under.
pub const STORAGE_KEY: &str = "trip-storage";

/// Schema version of the persisted envelope.
pub const CURRENT_VERSION: u32 = 3;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    state: StateSnapshot,
}

type MigrationStep = fn(StateSnapshot) -> StateSnapshot;

/// Ordered migration table: `(target_version, step)`. A step runs when the
/// stored version is below its target. Future schema bumps append here.
const MIGRATIONS: &[(u32, MigrationStep)] = &[(3, migrate_strip_heavy)];

/// v3 introduced the rule that inline base64 payloads never persist.
fn migrate_strip_heavy(snapshot: StateSnapshot) -> StateSnapshot {
    strip_state(&snapshot)
}

fn migrate(mut snapshot: StateSnapshot, from_version: u32) -> StateSnapshot {
    for (target, step) in MIGRATIONS {
        if from_version < *target {
            snapshot = step(snapshot);
        }
    }
    snapshot
}

/// Load the persisted snapshot, migrating if needed. Absent or corrupt
/// records hydrate as defaults.
pub fn load(store: &DualStore) -> StateSnapshot {
    let Some(raw) = store.get(STORAGE_KEY) else {
        return StateSnapshot::default();
    };
    match serde_json::from_str::<Envelope>(&raw) {
        Ok(envelope) if envelope.version >= CURRENT_VERSION => envelope.state,
        Ok(envelope) => migrate(envelope.state, envelope.version),
        Err(_) => StateSnapshot::default(),
    }
}

/// Serialize a snapshot into the durable envelope: strip heavy payloads,
/// wrap with the current version.
pub fn encode(snapshot: &StateSnapshot) -> Result<String> {
    let envelope = Envelope {
        version: CURRENT_VERSION,
        state: strip_state(snapshot),
    };
    Ok(serde_json::to_string(&envelope)?)
}

enum Job {
    Save(StateSnapshot),
    Clear,
    Flush(SyncSender<()>),
}

/// Background write-through worker.
///
/// Jobs are processed in order on a dedicated thread that owns the store, so
/// last-write-wins on the durable key without any caller blocking. Dropping
/// the persister drains whatever is still queued.
pub struct Persister {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl Persister {
    pub fn spawn(store: DualStore) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            for job in rx {
                match job {
                    Job::Save(snapshot) => {
                        if let Ok(raw) = encode(&snapshot) {
                            store.set(STORAGE_KEY, &raw);
                        }
                    }
                    Job::Clear => store.remove(STORAGE_KEY),
                    Job::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Enqueue a durable write of `snapshot`. Returns immediately.
    pub fn save(&self, snapshot: StateSnapshot) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Job::Save(snapshot));
        }
    }

    /// Enqueue eviction of the persisted record from both backends.
    pub fn clear(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Job::Clear);
        }
    }

    /// Block until every job enqueued before this call has been processed.
    pub fn flush(&self) {
        if let Some(tx) = &self.tx {
            let (ack_tx, ack_rx) = mpsc::sync_channel(0);
            if tx.send(Job::Flush(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain remaining jobs and exit.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{image_url, ImageRef};
    use crate::store::memory::MemoryBackend;
    use crate::store::StorageBackend;

    fn store_over(backend: MemoryBackend) -> DualStore {
        DualStore::new(Box::new(backend))
    }

    const V1_RECORD: &str = r#"{
        "version": 1,
        "state": {
            "trips": [{
                "id": "t1",
                "name": "Old north loop",
                "coverImage": "data:image/png;base64,AAA",
                "entries": [{
                    "id": "e1",
                    "timestamp": "2021-04-02T08:00:00Z",
                    "description": "Day 1",
                    "images": ["data:image/png;base64,BBB", "https://img.example/a.jpg"]
                }]
            }],
            "vehicles": [{"id": "v1", "name": "Honda Wave", "type": "motorcycle"}]
        }
    }"#;

    #[test]
    fn test_load_absent_gives_defaults() {
        let store = store_over(MemoryBackend::new());
        assert_eq!(load(&store), StateSnapshot::default());
    }

    #[test]
    fn test_load_corrupt_gives_defaults() {
        let backend = MemoryBackend::seeded(STORAGE_KEY, "{not json");
        assert_eq!(load(&store_over(backend)), StateSnapshot::default());

        let backend = MemoryBackend::seeded(STORAGE_KEY, r#"{"version": "three"}"#);
        assert_eq!(load(&store_over(backend)), StateSnapshot::default());
    }

    #[test]
    fn test_load_old_version_runs_strip_migration() {
        let backend = MemoryBackend::seeded(STORAGE_KEY, V1_RECORD);
        let snapshot = load(&store_over(backend));

        let trip = &snapshot.trips[0];
        assert!(trip.cover_image.is_none());
        let images = &trip.entries[0].images;
        assert_eq!(images.len(), 1);
        assert_eq!(image_url(&images[0]), Some("https://img.example/a.jpg"));
        // Legacy vehicle shape normalized on the way in.
        assert_eq!(snapshot.vehicles[0].brand, "Honda Wave");
    }

    #[test]
    fn test_load_current_version_hydrates_as_is() {
        // A version-3 record is trusted; no migration touches it.
        let record = r#"{
            "version": 3,
            "state": {
                "trips": [{"id": "t1", "name": "X", "coverImage": "https://img.example/c.jpg", "entries": []}],
                "vehicles": []
            }
        }"#;
        let backend = MemoryBackend::seeded(STORAGE_KEY, record);
        let snapshot = load(&store_over(backend));
        assert_eq!(
            snapshot.trips[0].cover_image.as_deref(),
            Some("https://img.example/c.jpg")
        );
    }

    #[test]
    fn test_migration_monotonicity() {
        // Loading a v1 record and saving yields a v3 record with no data URIs.
        let backend = MemoryBackend::seeded(STORAGE_KEY, V1_RECORD);
        let store = store_over(backend.clone());

        let snapshot = load(&store);
        store.set(STORAGE_KEY, &encode(&snapshot).unwrap());

        let raw = backend.get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 3);
        assert!(!raw.contains("data:"));
    }

    #[test]
    fn test_encode_strips_before_wrapping() {
        let mut snapshot = StateSnapshot::default();
        let mut trip = crate::model::Trip::new("T".to_string());
        trip.id = "t1".to_string();
        let mut entry = crate::model::DiaryEntry::new("Day".to_string());
        entry
            .images
            .push(ImageRef::Url("data:image/png;base64,AAA".to_string()));
        trip.entries.push(entry);
        snapshot.trips.push(trip);

        let raw = encode(&snapshot).unwrap();
        assert!(!raw.contains("data:"));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], CURRENT_VERSION);
        assert_eq!(value["state"]["trips"][0]["entries"][0]["images"], serde_json::json!([]));
    }

    #[test]
    fn test_persister_writes_through() {
        let backend = MemoryBackend::new();
        let persister = Persister::spawn(store_over(backend.clone()));

        let mut snapshot = StateSnapshot::default();
        snapshot.trips.push(crate::model::Trip::new("T".to_string()));
        persister.save(snapshot);
        persister.flush();

        let raw = backend.get(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"version\":3"));
    }

    #[test]
    fn test_persister_clear_evicts_record() {
        let backend = MemoryBackend::seeded(STORAGE_KEY, "{}");
        let persister = Persister::spawn(store_over(backend.clone()));

        persister.clear();
        persister.flush();
        assert_eq!(backend.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_persister_drains_on_drop() {
        let backend = MemoryBackend::new();
        let persister = Persister::spawn(store_over(backend.clone()));
        persister.save(StateSnapshot::default());
        drop(persister);

        assert!(backend.get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_last_write_wins() {
        let backend = MemoryBackend::new();
        let persister = Persister::spawn(store_over(backend.clone()));

        let mut first = StateSnapshot::default();
        first.trips.push(crate::model::Trip::new("first".to_string()));
        let mut second = StateSnapshot::default();
        second
            .trips
            .push(crate::model::Trip::new("second".to_string()));

        persister.save(first);
        persister.save(second);
        persister.flush();

        let raw = backend.get(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("second"));
        assert!(!raw.contains("first"));
    }
}
