//! Entry gateway contract and SQLite document-table implementation.
//!
//! # Responsibility
//! - Define the persistence contract the wizard and views depend on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `MoodEntry::validate()` before SQL mutations.
//! - Listing is ordered by `date DESC, created_at DESC, uuid ASC`.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Date uniqueness is not enforced here; callers check before create.

use crate::db::DbError;
use crate::model::entry::{date_key, EntryId, EntryValidationError, MoodEntry, DATE_KEY_FORMAT};
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    date,
    core_feeling,
    secondary_feeling,
    tertiary_feeling,
    journal,
    created_at
FROM moods";

pub type RepoResult<T> = Result<T, RepoError>;

/// Gateway error for entry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntryValidationError),
    Db(DbError),
    InvalidData(String),
    /// Store reachable but refused the operation.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted mood data: {message}"),
            Self::Unavailable(message) => write!(f, "mood store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence gateway consumed by the wizard and the read views.
pub trait EntryGateway {
    /// Stores one entry. Called at most once per submit action.
    fn create_entry(&self, entry: &MoodEntry) -> RepoResult<EntryId>;
    /// Full scan ordered by date, newest first.
    fn list_entries(&self) -> RepoResult<Vec<MoodEntry>>;
}

impl<G: EntryGateway + ?Sized> EntryGateway for &G {
    fn create_entry(&self, entry: &MoodEntry) -> RepoResult<EntryId> {
        (**self).create_entry(entry)
    }

    fn list_entries(&self) -> RepoResult<Vec<MoodEntry>> {
        (**self).list_entries()
    }
}

/// SQLite-backed entry gateway.
pub struct SqliteEntryGateway<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryGateway<'conn> {
    /// Constructs a gateway from a migrated connection.
    ///
    /// Fails when the `moods` table is missing, i.e. the connection did not
    /// come from `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let ready: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'moods'
            );",
            [],
            |row| row.get(0),
        )?;
        if ready != 1 {
            return Err(RepoError::Unavailable(
                "moods table missing; open the store through open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl EntryGateway for SqliteEntryGateway<'_> {
    fn create_entry(&self, entry: &MoodEntry) -> RepoResult<EntryId> {
        let started_at = Instant::now();
        entry.validate()?;

        let result = self.conn.execute(
            "INSERT INTO moods (
                uuid,
                date,
                core_feeling,
                secondary_feeling,
                tertiary_feeling,
                journal,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.id.to_string(),
                date_key(entry.date),
                entry.core_feeling.as_str(),
                entry.secondary_feeling.as_str(),
                entry.tertiary_feeling.as_str(),
                entry.journal.as_str(),
                entry.created_at.timestamp_millis(),
            ],
        );

        match result {
            Ok(_) => {
                info!(
                    "event=entry_create module=repo status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(entry.id)
            }
            Err(err) => {
                error!(
                    "event=entry_create module=repo status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    fn list_entries(&self) -> RepoResult<Vec<MoodEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} ORDER BY date DESC, created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        info!(
            "event=entry_list module=repo status=ok count={}",
            entries.len()
        );
        Ok(entries)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<MoodEntry> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in moods.uuid"))
    })?;

    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_KEY_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{date_text}` in moods.date"))
    })?;

    let created_ms: i64 = row.get("created_at")?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid created_at value `{created_ms}` in moods.created_at"
        ))
    })?;

    let entry = MoodEntry {
        id,
        date,
        core_feeling: row.get("core_feeling")?,
        secondary_feeling: row.get("secondary_feeling")?,
        tertiary_feeling: row.get("tertiary_feeling")?,
        journal: row.get("journal")?,
        created_at,
    };
    entry.validate()?;
    Ok(entry)
}
