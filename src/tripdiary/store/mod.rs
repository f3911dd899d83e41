//! # Storage Layer
//!
//! Namespaced key/value storage for the persisted state envelope. The
//! [`StorageBackend`] trait hides where the bytes live so the persistence
//! layer can work with different backends.
//!
//! ## Design Rationale
//!
//! Storage is abstracted behind a trait to:
//! - Enable **testing** with `MemoryBackend` (no filesystem needed)
//! - Allow **future backends** (database, cloud, etc.) without changing core logic
//! - Keep the state container **decoupled** from persistence details
//!
//! ## Implementations
//!
//! - [`fs::FileBackend`]: production file-per-key storage under a data
//!   directory, with atomic tmp-then-rename writes
//! - [`memory::MemoryBackend`]: shared in-memory map for tests and for
//!   running without any durable storage at all
//!
//! ## The adapter
//!
//! The rest of the crate never talks to a backend directly. It goes through
//! [`adapter::DualStore`], which layers two behaviors on top of a primary
//! backend:
//!
//! - a one-time migration of values left behind by an older release in a
//!   legacy location (copied into the primary on first read, then deleted)
//! - fail-soft semantics: a backend error degrades to a no-op read or write,
//!   so the application keeps working in-memory-only when storage is
//!   unavailable
//!
//! ## Storage Format
//!
//! For `FileBackend` each key becomes one file:
//! ```text
//! <data-dir>/
//! └── trip-storage.json    # versioned state envelope (see persist.rs)
//! ```

use crate::error::Result;

pub mod adapter;
pub mod fs;
pub mod memory;

/// Abstract interface for raw key/value storage I/O.
///
/// Values are opaque serialized strings; interpreting them is the
/// persistence layer's job. Implementations use interior mutability where
/// needed so the store can be driven from the persister thread.
pub trait StorageBackend: Send {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, creating or replacing it.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
