//! Mood wizard session state machine.
//!
//! # Responsibility
//! - Own one session's step, selections, journal text and fetched entries.
//! - Enforce step ordering, taxonomy-valid selections and the
//!   one-entry-per-day rule before any write reaches the gateway.
//! - Expose per-step render data (options, colors, message line).
//!
//! # Invariants
//! - A failed intent never changes step or selections.
//! - Selecting a level clears every deeper level.
//! - `submit` checks the date against a fresh gateway listing before create.
//! - Fetch results are applied only when their ticket matches the current
//!   session generation; every step change bumps the generation.
//! - Journal text is never logged.

use crate::model::entry::{EntryValidationError, MoodEntry};
use crate::model::taxonomy::{display_label, taxonomy, TaxonomyError};
use crate::repo::entry_repo::{EntryGateway, RepoError, RepoResult};
use crate::service::history::HistoryIndex;
use crate::service::summary::{summarize_month, MonthlySummary, YearMonth};
use crate::wheel::wedge::{layout_wedges, Slice, Wedge, CORE_WHEEL, SECONDARY_WHEEL};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MSG_SELECT_DATE: &str = "Please select a date";
pub const MSG_SELECT_CORE: &str = "Please select a core feeling";
pub const MSG_SELECT_SECONDARY: &str = "Please select a secondary feeling";
pub const MSG_SELECT_TERTIARY: &str = "Please select a tertiary feeling";
pub const MSG_ENTER_JOURNAL: &str = "Please enter some thoughts about your mood";
pub const MSG_DATE_TAKEN: &str = "This date already has a mood entry";
pub const MSG_SAVED: &str = "Mood saved successfully!";
pub const MSG_SAVE_FAILED: &str = "Error saving mood. Please try again.";
pub const MSG_LOAD_FAILED: &str = "Failed to load mood data";
pub const MSG_NO_ENTRY: &str = "No mood entry for this date";
const MSG_FIRST_STEP: &str = "Already at the first step";

/// Wizard screens. Steps 1-5 form the linear entry flow; 6 and 7 are views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SelectDate,
    SelectCore,
    SelectSecondary,
    SelectTertiary,
    WriteJournal,
    MonthlySummary,
    HistoryLookup,
}

impl WizardStep {
    /// Stable 1-based step number used by the UI.
    pub fn number(self) -> u8 {
        match self {
            Self::SelectDate => 1,
            Self::SelectCore => 2,
            Self::SelectSecondary => 3,
            Self::SelectTertiary => 4,
            Self::WriteJournal => 5,
            Self::MonthlySummary => 6,
            Self::HistoryLookup => 7,
        }
    }

    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SelectDate),
            2 => Some(Self::SelectCore),
            3 => Some(Self::SelectSecondary),
            4 => Some(Self::SelectTertiary),
            5 => Some(Self::WriteJournal),
            6 => Some(Self::MonthlySummary),
            7 => Some(Self::HistoryLookup),
            _ => None,
        }
    }

    /// Whether this step belongs to the linear entry flow.
    pub fn is_linear(self) -> bool {
        self.number() <= 5
    }

    fn next_linear(self) -> Option<Self> {
        match self {
            Self::SelectDate => Some(Self::SelectCore),
            Self::SelectCore => Some(Self::SelectSecondary),
            Self::SelectSecondary => Some(Self::SelectTertiary),
            Self::SelectTertiary => Some(Self::WriteJournal),
            _ => None,
        }
    }

    fn previous_linear(self) -> Option<Self> {
        match self {
            Self::SelectCore => Some(Self::SelectDate),
            Self::SelectSecondary => Some(Self::SelectCore),
            Self::SelectTertiary => Some(Self::SelectSecondary),
            Self::WriteJournal => Some(Self::SelectTertiary),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::SelectDate => "select_date",
            Self::SelectCore => "select_core",
            Self::SelectSecondary => "select_secondary",
            Self::SelectTertiary => "select_tertiary",
            Self::WriteJournal => "write_journal",
            Self::MonthlySummary => "monthly_summary",
            Self::HistoryLookup => "history_lookup",
        }
    }
}

/// Wizard-level error surfaced to the UI.
#[derive(Debug)]
pub enum WizardError {
    /// Missing or misplaced input; state unchanged.
    Validation(String),
    /// The date already has a stored entry.
    DuplicateDate(NaiveDate),
    /// Unknown taxonomy id; indicates a caller defect.
    NotFound(TaxonomyError),
    /// Store failure on fetch or create.
    Gateway(RepoError),
}

impl WizardError {
    fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }

    /// Text for the UI message line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::DuplicateDate(_) => MSG_DATE_TAKEN.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Gateway(_) => MSG_SAVE_FAILED.to_string(),
        }
    }
}

impl Display for WizardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::DuplicateDate(date) => write!(f, "{MSG_DATE_TAKEN}: {date}"),
            Self::NotFound(err) => write!(f, "{err}"),
            Self::Gateway(err) => write!(f, "mood store failure: {err}"),
        }
    }
}

impl Error for WizardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(err) => Some(err),
            Self::Gateway(err) => Some(err),
            Self::Validation(_) | Self::DuplicateDate(_) => None,
        }
    }
}

impl From<TaxonomyError> for WizardError {
    fn from(value: TaxonomyError) -> Self {
        Self::NotFound(value)
    }
}

impl From<RepoError> for WizardError {
    fn from(value: RepoError) -> Self {
        Self::Gateway(value)
    }
}

impl From<EntryValidationError> for WizardError {
    fn from(value: EntryValidationError) -> Self {
        match value {
            EntryValidationError::Taxonomy(err) => Self::NotFound(err),
            EntryValidationError::EmptyJournal => Self::validation(MSG_ENTER_JOURNAL),
        }
    }
}

/// Transient selections of the active session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardSelection {
    pub date: Option<NaiveDate>,
    pub core: Option<String>,
    pub secondary: Option<String>,
    pub tertiary: Option<String>,
    pub journal_text: String,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(WizardStep),
    /// Step 5 with journal text present; the caller should `submit`.
    ReadyToSubmit,
}

/// Tag for an in-flight entry fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    step: WizardStep,
}

impl FetchTicket {
    pub fn step(self) -> WizardStep {
        self.step
    }
}

/// Selectable option at one taxonomy level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionOption {
    pub id: &'static str,
    pub label: String,
    pub color: &'static str,
    pub selected: bool,
}

/// One user's wizard session.
#[derive(Debug, Clone)]
pub struct WizardSession {
    step: WizardStep,
    selection: WizardSelection,
    today: NaiveDate,
    entries: Vec<MoodEntry>,
    message: Option<String>,
    summary_month: YearMonth,
    history_date: Option<NaiveDate>,
    history_entry: Option<MoodEntry>,
    generation: u64,
}

impl WizardSession {
    /// Starts a session on step 1 with `today` preselected.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            step: WizardStep::SelectDate,
            selection: WizardSelection {
                date: Some(today),
                ..WizardSelection::default()
            },
            today,
            entries: Vec::new(),
            message: None,
            summary_month: YearMonth::of(today),
            history_date: None,
            history_entry: None,
            generation: 0,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selection(&self) -> &WizardSelection {
        &self.selection
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Last successfully fetched entries, newest date first.
    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn used_dates(&self) -> BTreeSet<NaiveDate> {
        self.entries.iter().map(|entry| entry.date).collect()
    }

    /// Date-picker predicate: dates with an entry are disabled.
    pub fn is_date_taken(&self, date: NaiveDate) -> bool {
        self.entries.iter().any(|entry| entry.date == date)
    }

    /// Whether the current step displays stored data.
    pub fn needs_entries(&self) -> bool {
        matches!(
            self.step,
            WizardStep::SelectDate | WizardStep::MonthlySummary | WizardStep::HistoryLookup
        )
    }

    // --- fetch protocol ---

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            step: self.step,
        }
    }

    /// Applies a fetch result issued under `ticket`.
    ///
    /// Returns `false` when the ticket is stale and the result was dropped.
    /// On failure the previous entries stay in place.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: RepoResult<Vec<MoodEntry>>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "event=fetch_discard module=wizard ticket_step={} current_step={}",
                ticket.step.name(),
                self.step.name()
            );
            return false;
        }

        match result {
            Ok(entries) => {
                self.entries = entries;
                if let Some(date) = self.selection.date {
                    if self.is_date_taken(date) {
                        self.selection.date = None;
                    }
                }
                if let Some(date) = self.history_date {
                    self.history_entry = HistoryIndex::build(&self.entries)
                        .lookup(date)
                        .cloned();
                }
            }
            Err(err) => {
                warn!("event=fetch_entries module=wizard status=error error={err}");
                self.note_fetch_failure();
            }
        }
        true
    }

    /// Fetches and applies entries synchronously.
    pub fn refresh_entries<G: EntryGateway>(&mut self, gateway: &G) -> Result<(), WizardError> {
        let ticket = self.begin_fetch();
        match gateway.list_entries() {
            Ok(entries) => {
                self.apply_fetch(ticket, Ok(entries));
                Ok(())
            }
            Err(err) => {
                warn!("event=fetch_entries module=wizard status=error error={err}");
                self.note_fetch_failure();
                Err(err.into())
            }
        }
    }

    /// Shows the load-failure message; fetched entries stay as they were.
    ///
    /// For callers whose fetch failed before a listing was attempted, e.g.
    /// when the store could not be opened.
    pub fn note_fetch_failure(&mut self) {
        self.message = Some(MSG_LOAD_FAILED.to_string());
    }

    // --- linear flow ---

    /// Moves to the next linear step when the current one is complete.
    pub fn advance(&mut self) -> Result<Advance, WizardError> {
        let missing = match self.step {
            WizardStep::SelectDate => self.selection.date.is_none().then_some(MSG_SELECT_DATE),
            WizardStep::SelectCore => self.selection.core.is_none().then_some(MSG_SELECT_CORE),
            WizardStep::SelectSecondary => self
                .selection
                .secondary
                .is_none()
                .then_some(MSG_SELECT_SECONDARY),
            WizardStep::SelectTertiary => self
                .selection
                .tertiary
                .is_none()
                .then_some(MSG_SELECT_TERTIARY),
            WizardStep::WriteJournal => self.journal_missing().then_some(MSG_ENTER_JOURNAL),
            WizardStep::MonthlySummary | WizardStep::HistoryLookup => {
                return Err(self.reject(WizardError::validation(
                    "Return to the mood tracker to continue",
                )));
            }
        };
        if let Some(message) = missing {
            return Err(self.reject(WizardError::validation(message)));
        }

        match self.step.next_linear() {
            Some(next) => {
                self.message = None;
                self.set_step(next);
                Ok(Advance::Moved(next))
            }
            None => Ok(Advance::ReadyToSubmit),
        }
    }

    /// Moves back one linear step, clearing the level being left.
    ///
    /// From the summary/history views this returns to step 1.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        if !self.step.is_linear() {
            self.back_to_tracker();
            return Ok(self.step);
        }
        let Some(previous) = self.step.previous_linear() else {
            return Err(self.reject(WizardError::validation(MSG_FIRST_STEP)));
        };

        match self.step {
            WizardStep::SelectSecondary => self.selection.secondary = None,
            WizardStep::SelectTertiary => self.selection.tertiary = None,
            _ => {}
        }
        self.message = None;
        self.set_step(previous);
        Ok(previous)
    }

    pub fn pick_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectDate, "Dates are chosen on the date step")?;
        if self.is_date_taken(date) {
            return Err(self.reject(WizardError::DuplicateDate(date)));
        }
        self.selection.date = Some(date);
        self.message = None;
        Ok(())
    }

    /// Selects a core emotion and clears secondary and tertiary.
    pub fn select_core(&mut self, core: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectCore, "Core feelings are chosen on step 2")?;
        let node = taxonomy().core(core).map_err(|err| self.reject(err.into()))?;
        self.selection.core = Some(node.id.to_string());
        self.selection.secondary = None;
        self.selection.tertiary = None;
        self.message = None;
        Ok(())
    }

    /// Selects a secondary emotion of the current core and clears tertiary.
    pub fn select_secondary(&mut self, secondary: &str) -> Result<(), WizardError> {
        self.require_step(
            WizardStep::SelectSecondary,
            "Secondary feelings are chosen on step 3",
        )?;
        let core = self.required_core()?;
        let node = taxonomy()
            .secondary(&core, secondary)
            .map_err(|err| self.reject(err.into()))?;
        self.selection.secondary = Some(node.id.to_string());
        self.selection.tertiary = None;
        self.message = None;
        Ok(())
    }

    pub fn select_tertiary(&mut self, tertiary: &str) -> Result<(), WizardError> {
        self.require_step(
            WizardStep::SelectTertiary,
            "Tertiary feelings are chosen on step 4",
        )?;
        let core = self.required_core()?;
        let Some(secondary) = self.selection.secondary.clone() else {
            return Err(self.reject(WizardError::validation(MSG_SELECT_SECONDARY)));
        };
        taxonomy()
            .validate_path(&core, &secondary, tertiary)
            .map_err(|err| self.reject(err.into()))?;
        self.selection.tertiary = Some(tertiary.to_string());
        self.message = None;
        Ok(())
    }

    pub fn set_journal_text(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::WriteJournal, "The journal is written on step 5")?;
        self.selection.journal_text = text.into();
        Ok(())
    }

    /// Persists the current selections as one entry.
    ///
    /// On success selections reset and the session returns to step 1. On any
    /// failure step, selections and journal text stay as they were; no retry
    /// is attempted.
    pub fn submit<G: EntryGateway>(
        &mut self,
        gateway: &G,
        now: DateTime<Utc>,
    ) -> Result<MoodEntry, WizardError> {
        self.require_step(WizardStep::WriteJournal, "Entries are saved from step 5")?;
        if self.journal_missing() {
            return Err(self.reject(WizardError::validation(MSG_ENTER_JOURNAL)));
        }
        let entry = self.build_entry(now)?;

        let existing = gateway.list_entries().map_err(|err| {
            warn!("event=mood_submit module=wizard status=error stage=list error={err}");
            self.reject(err.into())
        })?;
        if existing.iter().any(|stored| stored.date == entry.date) {
            return Err(self.reject(WizardError::DuplicateDate(entry.date)));
        }

        if let Err(err) = gateway.create_entry(&entry) {
            warn!("event=mood_submit module=wizard status=error stage=create error={err}");
            return Err(self.reject(err.into()));
        }

        info!(
            "event=mood_submit module=wizard status=ok date={} core={}",
            entry.date_key(),
            entry.core_feeling
        );
        self.entries = existing;
        self.entries.push(entry.clone());
        self.entries
            .sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        self.selection = WizardSelection::default();
        self.set_step(WizardStep::SelectDate);
        self.message = Some(MSG_SAVED.to_string());
        Ok(entry)
    }

    // --- views ---

    pub fn go_to_summary(&mut self) {
        self.summary_month = YearMonth::of(self.selection.date.unwrap_or(self.today));
        self.message = None;
        self.set_step(WizardStep::MonthlySummary);
    }

    pub fn go_to_history(&mut self) {
        self.history_date = None;
        self.history_entry = None;
        self.message = None;
        self.set_step(WizardStep::HistoryLookup);
    }

    /// Leaves a view (or any step) for step 1, keeping selections.
    pub fn back_to_tracker(&mut self) {
        self.message = None;
        self.set_step(WizardStep::SelectDate);
    }

    pub fn summary_month(&self) -> YearMonth {
        self.summary_month
    }

    pub fn previous_month(&mut self) -> Result<YearMonth, WizardError> {
        self.require_step(WizardStep::MonthlySummary, "Month navigation is on the summary")?;
        self.summary_month = self.summary_month.previous();
        Ok(self.summary_month)
    }

    pub fn next_month(&mut self) -> Result<YearMonth, WizardError> {
        self.require_step(WizardStep::MonthlySummary, "Month navigation is on the summary")?;
        self.summary_month = self.summary_month.next();
        Ok(self.summary_month)
    }

    pub fn monthly_summary(&self) -> MonthlySummary {
        summarize_month(&self.entries, self.summary_month)
    }

    /// Shows the entry stored for `date`, if any.
    pub fn pick_history_date(
        &mut self,
        date: NaiveDate,
    ) -> Result<Option<&MoodEntry>, WizardError> {
        self.require_step(WizardStep::HistoryLookup, "History is browsed on the history view")?;
        self.history_date = Some(date);
        self.history_entry = HistoryIndex::build(&self.entries).lookup(date).cloned();
        self.message = match self.history_entry {
            Some(_) => None,
            None => Some(MSG_NO_ENTRY.to_string()),
        };
        Ok(self.history_entry.as_ref())
    }

    pub fn history_entry(&self) -> Option<&MoodEntry> {
        self.history_entry.as_ref()
    }

    // --- render data ---

    pub fn core_options(&self) -> Vec<EmotionOption> {
        let selected = self.selection.core.as_deref();
        taxonomy()
            .cores()
            .iter()
            .map(|core| EmotionOption {
                id: core.id,
                label: display_label(core.id),
                color: core.inner_color,
                selected: selected == Some(core.id),
            })
            .collect()
    }

    /// Secondary options under the selected core; empty without a core.
    pub fn secondary_options(&self) -> Vec<EmotionOption> {
        let Some(core) = self.selection.core.as_deref() else {
            return Vec::new();
        };
        let selected = self.selection.secondary.as_deref();
        taxonomy()
            .core(core)
            .map(|node| {
                node.secondaries
                    .iter()
                    .map(|secondary| EmotionOption {
                        id: secondary.id,
                        label: display_label(secondary.id),
                        color: secondary.color,
                        selected: selected == Some(secondary.id),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tertiary options under the selected secondary; they inherit its color.
    pub fn tertiary_options(&self) -> Vec<EmotionOption> {
        let (Some(core), Some(secondary)) = (
            self.selection.core.as_deref(),
            self.selection.secondary.as_deref(),
        ) else {
            return Vec::new();
        };
        let selected = self.selection.tertiary.as_deref();
        taxonomy()
            .secondary(core, secondary)
            .map(|node| {
                node.tertiaries
                    .iter()
                    .map(|label| EmotionOption {
                        id: *label,
                        label: (*label).to_string(),
                        color: node.color,
                        selected: selected == Some(*label),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn core_wheel(&self) -> Vec<Wedge> {
        layout_wedges(&CORE_WHEEL, &wheel_slices(&self.core_options()))
    }

    /// Secondary ring for the selected core; empty without a core.
    pub fn secondary_wheel(&self) -> Vec<Wedge> {
        layout_wedges(&SECONDARY_WHEEL, &wheel_slices(&self.secondary_options()))
    }

    /// Breadcrumb such as `happy → optimistic → Hopeful`.
    pub fn selection_path_label(&self) -> String {
        [
            self.selection.core.as_deref().map(display_label),
            self.selection.secondary.as_deref().map(display_label),
            self.selection.tertiary.clone(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" → ")
    }

    // --- internals ---

    fn set_step(&mut self, next: WizardStep) {
        if next != self.step {
            debug!(
                "event=wizard_step module=wizard from={} to={}",
                self.step.name(),
                next.name()
            );
            self.step = next;
            self.generation += 1;
        }
    }

    fn require_step(&mut self, expected: WizardStep, message: &str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(self.reject(WizardError::validation(message)))
        }
    }

    fn required_core(&mut self) -> Result<String, WizardError> {
        match self.selection.core.clone() {
            Some(core) => Ok(core),
            None => Err(self.reject(WizardError::validation(MSG_SELECT_CORE))),
        }
    }

    fn journal_missing(&self) -> bool {
        self.selection.journal_text.trim().is_empty()
    }

    fn build_entry(&mut self, now: DateTime<Utc>) -> Result<MoodEntry, WizardError> {
        let selection = &self.selection;
        let parts = (
            selection.date,
            selection.core.as_deref(),
            selection.secondary.as_deref(),
            selection.tertiary.as_deref(),
        );
        let (Some(date), Some(core), Some(secondary), Some(tertiary)) = parts else {
            return Err(self.reject(WizardError::validation(MSG_SELECT_TERTIARY)));
        };
        let entry = MoodEntry::new(
            date,
            core,
            secondary,
            tertiary,
            selection.journal_text.as_str(),
        )
        .with_created_at(now);
        entry.validate().map_err(|err| self.reject(err.into()))?;
        Ok(entry)
    }

    /// Records the user-visible message for a rejected intent.
    fn reject(&mut self, err: WizardError) -> WizardError {
        self.message = Some(err.user_message());
        err
    }
}

fn wheel_slices(options: &[EmotionOption]) -> Vec<Slice<'_>> {
    options
        .iter()
        .map(|option| Slice {
            id: option.id,
            label: &option.label,
            color: option.color,
            selected: option.selected,
        })
        .collect()
}
