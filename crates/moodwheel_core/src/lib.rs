//! Core domain logic for MoodWheel.
//! This crate is the single source of truth for mood journaling invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod wheel;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::entry::{date_key, EntryId, EntryValidationError, MoodEntry};
pub use model::taxonomy::{
    display_label, taxonomy, CoreEmotion, EmotionTaxonomy, SecondaryEmotion, TaxonomyError,
};
pub use repo::entry_repo::{EntryGateway, RepoError, RepoResult, SqliteEntryGateway};
pub use service::history::{
    canonical_date, long_date_label, lookup_entry, utc_date, CalendarDateError, HistoryIndex,
};
pub use service::summary::{summarize_month, CoreCount, MonthlySummary, YearMonth};
pub use service::wizard::{
    Advance, EmotionOption, FetchTicket, WizardError, WizardSelection, WizardSession, WizardStep,
};
pub use wheel::wedge::{layout_wedges, Point, Slice, Wedge, WheelSpec, CORE_WHEEL, SECONDARY_WHEEL};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
