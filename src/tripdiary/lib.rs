//! # TripDiary Architecture
//!
//! TripDiary is a **UI-agnostic travel-log library**. This is not a CLI
//! application that happens to have some library code—it's a library that
//! happens to have a CLI client.
//!
//! That distinction drives the architecture: the same core could sit behind
//! a desktop shell or a web front end without changing a line.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs + args.rs)                              │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Facade over the state container                          │
//! │  - Validates inputs, returns structured Result types        │
//! │  - Triggers write-through persistence after each mutation   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  State Layer (state.rs)                                     │
//! │  - In-memory source of truth for trips and vehicles         │
//! │  - Pure functional updates, no I/O assumptions whatsoever   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence Layer (persist.rs, strip.rs, store/)           │
//! │  - Versioned envelope + schema migrations                   │
//! │  - Heavy-payload stripping before every durable write       │
//! │  - Background writer over an abstract StorageBackend        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Durability Model
//!
//! Mutations are synchronous against the in-memory tree and visible
//! immediately; the durable write is enqueued to a background worker and
//! never awaited. A crash between a mutation and its write loses that one
//! mutation—an accepted trade-off, not a bug. When no storage backend is
//! available at all, the application degrades to in-memory-only operation
//! instead of failing.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward (API, state, persistence), code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<CmdResult>`)
//! - **Never** writes to stdout/stderr
//! - **Never** calls `std::process::exit`
//! - **Never** assumes a terminal environment
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade—entry point for all operations
//! - [`state`]: The in-memory state container and its CRUD operations
//! - [`model`]: Core data types (`Trip`, `DiaryEntry`, `Vehicle`) and the
//!   legacy-shape normalization layer
//! - [`strip`]: Removal of inline base64 payloads before persistence
//! - [`persist`]: Versioned persistence envelope, migrations, background writer
//! - [`store`]: Storage abstraction and implementations
//! - [`commands`]: Import/export and shared command-result types
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod persist;
pub mod state;
pub mod store;
pub mod strip;
