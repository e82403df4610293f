//! Repository layer: the entry gateway contract and its SQLite implementation.
//!
//! # Responsibility
//! - Define the use-case oriented persistence contract (`EntryGateway`).
//! - Isolate SQLite query details from the wizard and read views.
//!
//! # Invariants
//! - Gateway writes enforce `MoodEntry::validate()` before persistence.
//! - Gateway reads return semantic errors (`InvalidData`) for bad rows.

pub mod entry_repo;
