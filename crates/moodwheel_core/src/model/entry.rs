//! Mood entry domain model.
//!
//! # Responsibility
//! - Define the persisted record produced by one completed wizard run.
//! - Validate emotion paths against the taxonomy before persistence.
//!
//! # Invariants
//! - `core/secondary/tertiary` always form a valid taxonomy path.
//! - `date` is a calendar date without time; at most one entry per date.
//! - `created_at` carries millisecond precision so it survives storage.

use crate::model::taxonomy::{taxonomy, TaxonomyError};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one stored entry (the document id).
pub type EntryId = Uuid;

/// Canonical calendar-date key format used for storage and lookups.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Formats a calendar date as its canonical `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Validation failure for entry write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    Taxonomy(TaxonomyError),
    EmptyJournal,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taxonomy(err) => write!(f, "invalid emotion path: {err}"),
            Self::EmptyJournal => write!(f, "journal text must not be empty"),
        }
    }
}

impl Error for EntryValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Taxonomy(err) => Some(err),
            Self::EmptyJournal => None,
        }
    }
}

impl From<TaxonomyError> for EntryValidationError {
    fn from(value: TaxonomyError) -> Self {
        Self::Taxonomy(value)
    }
}

/// One journaled mood for a calendar day.
///
/// Serialized with camelCase names to match the document schema
/// (`coreFeeling`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub core_feeling: String,
    pub secondary_feeling: String,
    pub tertiary_feeling: String,
    pub journal: String,
    pub created_at: DateTime<Utc>,
}

impl MoodEntry {
    /// Creates an entry with a generated id, stamped with the current time.
    pub fn new(
        date: NaiveDate,
        core_feeling: impl Into<String>,
        secondary_feeling: impl Into<String>,
        tertiary_feeling: impl Into<String>,
        journal: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            core_feeling: core_feeling.into(),
            secondary_feeling: secondary_feeling.into(),
            tertiary_feeling: tertiary_feeling.into(),
            journal: journal.into(),
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Replaces the creation stamp (truncated to milliseconds).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at.trunc_subsecs(3);
        self
    }

    /// Canonical `YYYY-MM-DD` key of this entry's date.
    pub fn date_key(&self) -> String {
        date_key(self.date)
    }

    /// Checks the emotion path and journal text.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        taxonomy().validate_path(
            &self.core_feeling,
            &self.secondary_feeling,
            &self.tertiary_feeling,
        )?;
        if self.journal.trim().is_empty() {
            return Err(EntryValidationError::EmptyJournal);
        }
        Ok(())
    }
}
