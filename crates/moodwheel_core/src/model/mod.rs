//! Domain model for mood journaling.
//!
//! # Responsibility
//! - Define the static emotion taxonomy and the persisted entry record.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - The taxonomy is immutable process-wide data.
//! - Entries are validated against the taxonomy before persistence.

pub mod entry;
pub mod taxonomy;
