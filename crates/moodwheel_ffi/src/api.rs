//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the mood wizard session to Dart via FRB as an opaque handle.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every intent returns the resulting step and the message line.
//! - Dates cross the boundary as `YYYY-MM-DD` strings (RFC 3339 accepted on
//!   input and resolved to the UTC calendar date).

use chrono::Utc;
use moodwheel_core::db::open_db;
use moodwheel_core::service::wizard::MSG_LOAD_FAILED;
use moodwheel_core::{
    canonical_date, core_version as core_version_inner, date_key,
    init_logging as init_logging_inner, long_date_label, ping as ping_inner, Advance,
    EmotionOption, MoodEntry, SqliteEntryGateway, Wedge, WizardError, WizardSession,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "moodwheel.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking. Never throws.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Outcome of one wizard intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardActionResponse {
    pub ok: bool,
    /// Step number (1-7) after the intent.
    pub step: u8,
    /// Message line to show; empty when there is nothing to say.
    pub message: String,
}

impl WizardActionResponse {
    fn success(step: u8, message: String) -> Self {
        Self {
            ok: true,
            step,
            message,
        }
    }

    fn failure(step: u8, message: String) -> Self {
        Self {
            ok: false,
            step,
            message,
        }
    }
}

/// Stored entry as shown by the history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub entry_id: String,
    pub date: String,
    /// e.g. `Friday, January 5, 2024`.
    pub date_label: String,
    pub core_feeling: String,
    pub secondary_feeling: String,
    pub tertiary_feeling: String,
    pub journal: String,
    pub created_at_ms: i64,
}

/// Result of a history calendar pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryResponse {
    pub ok: bool,
    pub entry: Option<EntryItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionOptionItem {
    pub id: String,
    pub label: String,
    pub color: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WedgeItem {
    pub id: String,
    pub label: String,
    pub color: String,
    pub selected: bool,
    pub path: String,
    pub label_x: f64,
    pub label_y: f64,
    pub label_rotation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub core: String,
    pub color: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResponse {
    /// e.g. `January 2024`.
    pub month_label: String,
    pub year: i32,
    pub month: u32,
    pub total: u32,
    /// One row per core emotion, zero counts included.
    pub rows: Vec<SummaryRow>,
}

/// Render snapshot of the wizard's transient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSnapshot {
    pub step: u8,
    pub date: Option<String>,
    pub core: Option<String>,
    pub secondary: Option<String>,
    pub tertiary: Option<String>,
    pub journal_text: String,
    /// Breadcrumb such as `happy → optimistic → Hopeful`.
    pub path_label: String,
    pub message: String,
    /// Dates with an entry; disabled in the date picker, highlighted in history.
    pub used_dates: Vec<String>,
}

/// One user's wizard session bound to the mood store.
#[flutter_rust_bridge::frb(opaque)]
pub struct MoodWizard {
    session: WizardSession,
    db_path: PathBuf,
}

impl MoodWizard {
    /// Starts a session for today's UTC date using the default store path.
    #[flutter_rust_bridge::frb(sync)]
    pub fn new() -> MoodWizard {
        Self::with_db_path(resolve_db_path())
    }

    #[flutter_rust_bridge::frb(ignore)]
    pub fn with_db_path(db_path: PathBuf) -> MoodWizard {
        let mut wizard = MoodWizard {
            session: WizardSession::new(Utc::now().date_naive()),
            db_path,
        };
        if wizard.refresh_if_needed().is_some() {
            log::warn!("event=ffi_session_start module=ffi status=error stage=refresh");
        }
        wizard
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn snapshot(&self) -> WizardSnapshot {
        let selection = self.session.selection();
        WizardSnapshot {
            step: self.session.step().number(),
            date: selection.date.map(date_key),
            core: selection.core.clone(),
            secondary: selection.secondary.clone(),
            tertiary: selection.tertiary.clone(),
            journal_text: selection.journal_text.clone(),
            path_label: self.session.selection_path_label(),
            message: self.message(),
            used_dates: self.session.used_dates().into_iter().map(date_key).collect(),
        }
    }

    /// Reloads stored entries for the current step.
    #[flutter_rust_bridge::frb(sync)]
    pub fn refresh(&mut self) -> WizardActionResponse {
        let result =
            with_gateway(&self.db_path, |gateway| self.session.refresh_entries(gateway));
        match result {
            Ok(()) => self.respond(Ok(())),
            Err(err) => {
                log::warn!("event=ffi_refresh module=ffi status=error error={err}");
                self.session.note_fetch_failure();
                let step = self.session.step().number();
                WizardActionResponse::failure(step, MSG_LOAD_FAILED.to_string())
            }
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn pick_date(&mut self, date: String) -> WizardActionResponse {
        let result = parse_date(&date).and_then(|date| self.session.pick_date(date));
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn select_core(&mut self, id: String) -> WizardActionResponse {
        let result = self.session.select_core(id.trim());
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn select_secondary(&mut self, id: String) -> WizardActionResponse {
        let result = self.session.select_secondary(id.trim());
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn select_tertiary(&mut self, label: String) -> WizardActionResponse {
        let result = self.session.select_tertiary(label.trim());
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_journal_text(&mut self, text: String) -> WizardActionResponse {
        let result = self.session.set_journal_text(text);
        self.respond(result)
    }

    /// Next step; on the journal step this saves the entry.
    #[flutter_rust_bridge::frb(sync)]
    pub fn advance(&mut self) -> WizardActionResponse {
        match self.session.advance() {
            Ok(Advance::ReadyToSubmit) => self.submit(),
            Ok(Advance::Moved(_)) => self.respond_after_move(),
            Err(err) => self.respond(Err(err)),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn retreat(&mut self) -> WizardActionResponse {
        match self.session.retreat() {
            Ok(_) => self.respond_after_move(),
            Err(err) => self.respond(Err(err)),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn submit(&mut self) -> WizardActionResponse {
        let result = with_gateway(&self.db_path, |gateway| {
            self.session.submit(gateway, Utc::now()).map(|_| ())
        });
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn go_to_summary(&mut self) -> WizardActionResponse {
        self.session.go_to_summary();
        self.respond_after_move()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn go_to_history(&mut self) -> WizardActionResponse {
        self.session.go_to_history();
        self.respond_after_move()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn back_to_tracker(&mut self) -> WizardActionResponse {
        self.session.back_to_tracker();
        self.respond_after_move()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn previous_month(&mut self) -> WizardActionResponse {
        let result = self.session.previous_month().map(|_| ());
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn next_month(&mut self) -> WizardActionResponse {
        let result = self.session.next_month().map(|_| ());
        self.respond(result)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn monthly_summary(&self) -> SummaryResponse {
        let summary = self.session.monthly_summary();
        let rows = summary
            .counts
            .iter()
            .map(|row| SummaryRow {
                core: row.core.to_string(),
                color: row.color.to_string(),
                count: row.count,
                percentage: summary.percentage(row.core),
            })
            .collect();
        SummaryResponse {
            month_label: summary.month.label(),
            year: summary.month.year(),
            month: summary.month.month(),
            total: summary.total,
            rows,
        }
    }

    /// Shows the stored entry for `date`; a miss is not a failure.
    #[flutter_rust_bridge::frb(sync)]
    pub fn pick_history_date(&mut self, date: String) -> HistoryResponse {
        let result = parse_date(&date).and_then(|date| {
            self.session
                .pick_history_date(date)
                .map(|entry| entry.map(to_entry_item))
        });
        match result {
            Ok(entry) => HistoryResponse {
                ok: true,
                entry,
                message: self.message(),
            },
            Err(err) => HistoryResponse {
                ok: false,
                entry: None,
                message: err.user_message(),
            },
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn core_options(&self) -> Vec<EmotionOptionItem> {
        self.session
            .core_options()
            .into_iter()
            .map(to_option_item)
            .collect()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn secondary_options(&self) -> Vec<EmotionOptionItem> {
        self.session
            .secondary_options()
            .into_iter()
            .map(to_option_item)
            .collect()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn tertiary_options(&self) -> Vec<EmotionOptionItem> {
        self.session
            .tertiary_options()
            .into_iter()
            .map(to_option_item)
            .collect()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn core_wheel(&self) -> Vec<WedgeItem> {
        self.session
            .core_wheel()
            .into_iter()
            .map(to_wedge_item)
            .collect()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn secondary_wheel(&self) -> Vec<WedgeItem> {
        self.session
            .secondary_wheel()
            .into_iter()
            .map(to_wedge_item)
            .collect()
    }

    /// Reloads entries when the current step shows them.
    ///
    /// Returns the failure response when the reload failed; the session's
    /// message line already carries the load-failure text.
    fn refresh_if_needed(&mut self) -> Option<WizardActionResponse> {
        if !self.session.needs_entries() {
            return None;
        }
        let response = self.refresh();
        (!response.ok).then_some(response)
    }

    fn respond_after_move(&mut self) -> WizardActionResponse {
        match self.refresh_if_needed() {
            Some(failure) => failure,
            None => self.respond(Ok(())),
        }
    }

    fn message(&self) -> String {
        self.session.message().unwrap_or_default().to_string()
    }

    fn respond(&mut self, result: Result<(), WizardError>) -> WizardActionResponse {
        let step = self.session.step().number();
        match result {
            Ok(()) => WizardActionResponse::success(step, self.message()),
            Err(err) => {
                log::debug!("event=ffi_intent module=ffi status=rejected step={step}");
                WizardActionResponse::failure(step, err.user_message())
            }
        }
    }
}

/// Opens the store for one intent and hands a gateway to `f`.
///
/// Open failures surface as gateway errors so the session keeps its state.
fn with_gateway<T>(
    db_path: &Path,
    f: impl FnOnce(&SqliteEntryGateway<'_>) -> Result<T, WizardError>,
) -> Result<T, WizardError> {
    let conn = open_db(db_path).map_err(|err| {
        log::warn!("event=ffi_db_open module=ffi status=error error={err}");
        WizardError::Gateway(err.into())
    })?;
    let gateway = SqliteEntryGateway::try_new(&conn).map_err(WizardError::Gateway)?;
    f(&gateway)
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate, WizardError> {
    canonical_date(value).map_err(|err| WizardError::Validation(err.to_string()))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MOODWHEEL_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn to_entry_item(entry: &MoodEntry) -> EntryItem {
    EntryItem {
        entry_id: entry.id.to_string(),
        date: entry.date_key(),
        date_label: long_date_label(entry.date),
        core_feeling: entry.core_feeling.clone(),
        secondary_feeling: entry.secondary_feeling.clone(),
        tertiary_feeling: entry.tertiary_feeling.clone(),
        journal: entry.journal.clone(),
        created_at_ms: entry.created_at.timestamp_millis(),
    }
}

fn to_option_item(option: EmotionOption) -> EmotionOptionItem {
    EmotionOptionItem {
        id: option.id.to_string(),
        label: option.label,
        color: option.color.to_string(),
        selected: option.selected,
    }
}

fn to_wedge_item(wedge: Wedge) -> WedgeItem {
    WedgeItem {
        id: wedge.id.to_string(),
        label: wedge.label,
        color: wedge.color.to_string(),
        selected: wedge.selected,
        path: wedge.path,
        label_x: wedge.label_anchor.x,
        label_y: wedge.label_anchor.y,
        label_rotation: wedge.label_rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, init_logging, ping, MoodWizard};
    use moodwheel_core::db::open_db;
    use moodwheel_core::service::wizard::MSG_LOAD_FAILED;

    fn wizard_in(dir: &tempfile::TempDir) -> MoodWizard {
        MoodWizard::with_db_path(dir.path().join("moods.sqlite3"))
    }

    fn record(wizard: &mut MoodWizard, date: &str) {
        assert!(wizard.pick_date(date.to_string()).ok);
        wizard.advance();
        wizard.select_core("happy".to_string());
        wizard.advance();
        wizard.select_secondary("optimistic".to_string());
        wizard.advance();
        wizard.select_tertiary("Hopeful".to_string());
        wizard.advance();
        wizard.set_journal_text("test".to_string());
        let saved = wizard.advance();
        assert!(saved.ok, "{}", saved.message);
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        assert!(!init_logging("verbose".to_string(), "/tmp/moodwheel-logs".to_string()).is_empty());
    }

    #[test]
    fn full_flow_persists_entry_and_returns_to_date_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = wizard_in(&dir);

        assert!(wizard.pick_date("2024-01-05".to_string()).ok);
        assert_eq!(wizard.advance().step, 2);
        assert!(wizard.select_core("happy".to_string()).ok);
        assert_eq!(wizard.advance().step, 3);
        assert!(wizard.select_secondary("optimistic".to_string()).ok);
        assert_eq!(wizard.advance().step, 4);
        assert!(wizard.select_tertiary("Hopeful".to_string()).ok);
        assert_eq!(wizard.advance().step, 5);
        assert!(wizard.set_journal_text("test".to_string()).ok);

        let saved = wizard.advance();
        assert!(saved.ok, "{}", saved.message);
        assert_eq!(saved.step, 1);
        assert_eq!(saved.message, "Mood saved successfully!");

        let conn = open_db(dir.path().join("moods.sqlite3")).expect("open db");
        let (uuid, date, tertiary, journal): (String, String, String, String) = conn
            .query_row(
                "SELECT uuid, date, tertiary_feeling, journal FROM moods",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .expect("query mood row");
        assert!(uuid::Uuid::parse_str(&uuid).is_ok());
        assert_eq!(date, "2024-01-05");
        assert_eq!(tertiary, "Hopeful");
        assert_eq!(journal, "test");
        assert_eq!(wizard.snapshot().used_dates, vec!["2024-01-05".to_string()]);
    }

    #[test]
    fn empty_journal_is_reported_without_saving() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = wizard_in(&dir);
        wizard.pick_date("2024-02-01".to_string());
        wizard.advance();
        wizard.select_core("sad".to_string());
        wizard.advance();
        wizard.select_secondary("lonely".to_string());
        wizard.advance();
        wizard.select_tertiary("Isolated".to_string());
        wizard.advance();

        let response = wizard.submit();
        assert!(!response.ok);
        assert_eq!(response.step, 5);
        assert_eq!(response.message, "Please enter some thoughts about your mood");
    }

    #[test]
    fn second_entry_for_same_date_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = wizard_in(&dir);
        record(&mut wizard, "2024-01-05");

        let response = wizard.pick_date("2024-01-05".to_string());
        assert!(!response.ok);
        assert_eq!(response.step, 1);
        assert_eq!(response.message, "This date already has a mood entry");
    }

    #[test]
    fn unreadable_store_reports_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the database file should be cannot be opened.
        let mut wizard = MoodWizard::with_db_path(dir.path().to_path_buf());

        assert_eq!(wizard.snapshot().message, MSG_LOAD_FAILED);

        let response = wizard.refresh();
        assert!(!response.ok);
        assert_eq!(response.message, MSG_LOAD_FAILED);
    }

    #[test]
    fn view_switches_report_unreadable_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = MoodWizard::with_db_path(dir.path().to_path_buf());

        for (response, step) in [
            (wizard.go_to_summary(), 6),
            (wizard.go_to_history(), 7),
            (wizard.back_to_tracker(), 1),
        ] {
            assert!(!response.ok);
            assert_eq!(response.step, step);
            assert_eq!(response.message, MSG_LOAD_FAILED);
        }
        assert_eq!(wizard.snapshot().message, MSG_LOAD_FAILED);

        // Steps that show no stored data move on regardless.
        assert!(wizard.advance().ok);
        let back = wizard.retreat();
        assert!(!back.ok);
        assert_eq!(back.step, 1);
        assert_eq!(back.message, MSG_LOAD_FAILED);
    }

    #[test]
    fn invalid_date_string_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = wizard_in(&dir);
        let before = wizard.snapshot().date;

        let response = wizard.pick_date("next tuesday".to_string());
        assert!(!response.ok);
        assert_eq!(wizard.snapshot().date, before);
    }

    #[test]
    fn history_miss_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = wizard_in(&dir);
        assert_eq!(wizard.go_to_history().step, 7);

        let response = wizard.pick_history_date("2024-03-03".to_string());
        assert!(response.ok);
        assert!(response.entry.is_none());
        assert_eq!(response.message, "No mood entry for this date");
    }

    #[test]
    fn summary_lists_every_core() {
        let dir = tempfile::tempdir().unwrap();
        let mut wizard = wizard_in(&dir);
        wizard.go_to_summary();

        let summary = wizard.monthly_summary();
        assert_eq!(summary.rows.len(), 7);
        assert_eq!(summary.total, 0);
        assert!(summary.rows.iter().all(|row| row.percentage == 0.0));
    }
}
