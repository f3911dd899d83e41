use super::StorageBackend;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory storage for testing and for running without durable storage.
///
/// Clones share the same map, so a test can keep a handle while the
/// persister thread owns another and observe writes through it.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a value, e.g. a legacy record for migration tests.
    pub fn seeded(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        backend
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
