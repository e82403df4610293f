//! Core use-case services.
//!
//! # Responsibility
//! - Drive the mood wizard session over the entry gateway.
//! - Derive the monthly summary and history views from fetched entries.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod history;
pub mod summary;
pub mod wizard;
