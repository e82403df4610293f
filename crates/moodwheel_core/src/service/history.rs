//! Calendar-date lookup of stored entries.
//!
//! # Responsibility
//! - Resolve calendar inputs to one canonical `YYYY-MM-DD` key.
//! - Map keys to stored entries for the history view.
//!
//! # Invariants
//! - Canonical dates are UTC calendar dates. Timestamps with an offset are
//!   converted to UTC first; there is no second-format fallback.
//! - A missing entry is `None`, never an error.
//! - On duplicate dates the entry with the latest `created_at` wins.

use crate::model::entry::{date_key, MoodEntry, DATE_KEY_FORMAT};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Calendar input that is neither `YYYY-MM-DD` nor an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDateError(pub String);

impl Display for CalendarDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid calendar date `{}`; expected YYYY-MM-DD or RFC 3339",
            self.0
        )
    }
}

impl Error for CalendarDateError {}

/// Resolves a calendar input string to its canonical UTC date.
pub fn canonical_date(input: &str) -> Result<NaiveDate, CalendarDateError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| utc_date(&instant))
        .map_err(|_| CalendarDateError(trimmed.to_string()))
}

/// UTC calendar date of an instant.
pub fn utc_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&Utc).date_naive()
}

/// Header label such as `Friday, January 5, 2024`.
pub fn long_date_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Date-keyed view over a fetched entry set.
#[derive(Debug, Default)]
pub struct HistoryIndex<'a> {
    by_date: BTreeMap<String, &'a MoodEntry>,
}

impl<'a> HistoryIndex<'a> {
    pub fn build(entries: &'a [MoodEntry]) -> Self {
        let mut by_date: BTreeMap<String, &'a MoodEntry> = BTreeMap::new();
        for entry in entries {
            by_date
                .entry(entry.date_key())
                .and_modify(|current| {
                    if entry.created_at >= current.created_at {
                        *current = entry;
                    }
                })
                .or_insert(entry);
        }
        Self { by_date }
    }

    pub fn lookup(&self, date: NaiveDate) -> Option<&'a MoodEntry> {
        self.by_date.get(&date_key(date)).copied()
    }

    /// Calendar highlight predicate.
    pub fn has_entry(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date_key(date))
    }

    /// Canonical keys with an entry, ascending.
    pub fn date_keys(&self) -> impl Iterator<Item = &str> {
        self.by_date.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// One-shot lookup without keeping the index.
pub fn lookup_entry(entries: &[MoodEntry], date: NaiveDate) -> Option<&MoodEntry> {
    HistoryIndex::build(entries).lookup(date)
}
