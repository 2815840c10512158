//! Core library surface for the gigbook booking directory TUI.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the SQLite-backed directory store, the domain models, and the
//! interactive front end.
pub mod db;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store and
/// preload data.
pub use db::{ensure_schema, fetch_venue_groups};

/// The primary domain types that other layers manipulate.
pub use models::{Artist, Show, Venue};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
