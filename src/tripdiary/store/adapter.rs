use super::StorageBackend;

/// The single storage surface the persistence layer talks to.
///
/// Wraps a primary backend plus an optional legacy backend left behind by an
/// older release. The legacy store is consulted once per key: on a primary
/// miss its value is copied into the primary and deleted from the legacy
/// location, so a second lookup (even a concurrent one) finds nothing left
/// to migrate. The deletion is best-effort; migration correctness only
/// depends on the copy.
///
/// Every backend failure degrades to a no-op read or write instead of
/// surfacing. When no durable storage is available the application simply
/// runs in-memory-only.
pub struct DualStore {
    primary: Box<dyn StorageBackend>,
    legacy: Option<Box<dyn StorageBackend>>,
}

impl DualStore {
    pub fn new(primary: Box<dyn StorageBackend>) -> Self {
        Self {
            primary,
            legacy: None,
        }
    }

    pub fn with_legacy(mut self, legacy: Box<dyn StorageBackend>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Read `key`, migrating a legacy value into the primary on first touch.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.primary.get(key).ok().flatten() {
            return Some(value);
        }

        let legacy = self.legacy.as_ref()?;
        let value = legacy.get(key).ok().flatten()?;

        // Copy first, then delete; a failed delete just means the next miss
        // re-copies the same value.
        let _ = self.primary.set(key, &value);
        let _ = legacy.remove(key);
        Some(value)
    }

    /// Write through to the primary backend only. The legacy store is never
    /// written again after migration.
    pub fn set(&self, key: &str, value: &str) {
        let _ = self.primary.set(key, value);
    }

    /// Delete from both backends, the legacy one opportunistically.
    pub fn remove(&self, key: &str) {
        let _ = self.primary.remove(key);
        if let Some(legacy) = &self.legacy {
            let _ = legacy.remove(key);
        }
    }
}
