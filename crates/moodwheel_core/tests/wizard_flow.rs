use chrono::{DateTime, NaiveDate, Utc};
use moodwheel_core::db::open_db_in_memory;
use moodwheel_core::service::wizard::{
    MSG_DATE_TAKEN, MSG_ENTER_JOURNAL, MSG_LOAD_FAILED, MSG_NO_ENTRY, MSG_SAVED, MSG_SAVE_FAILED,
    MSG_SELECT_CORE,
};
use moodwheel_core::{
    Advance, EntryGateway, EntryId, MoodEntry, RepoError, RepoResult, SqliteEntryGateway,
    WizardError, WizardSession, WizardStep,
};
use std::cell::{Cell, RefCell};

#[derive(Default)]
struct FakeGateway {
    entries: RefCell<Vec<MoodEntry>>,
    creates: Cell<u32>,
    lists: Cell<u32>,
    fail_create: bool,
    fail_list: bool,
}

impl FakeGateway {
    fn with_entries(entries: Vec<MoodEntry>) -> Self {
        Self {
            entries: RefCell::new(entries),
            ..Self::default()
        }
    }
}

impl EntryGateway for FakeGateway {
    fn create_entry(&self, entry: &MoodEntry) -> RepoResult<EntryId> {
        self.creates.set(self.creates.get() + 1);
        if self.fail_create {
            return Err(RepoError::Unavailable("offline".to_string()));
        }
        self.entries.borrow_mut().push(entry.clone());
        Ok(entry.id)
    }

    fn list_entries(&self) -> RepoResult<Vec<MoodEntry>> {
        self.lists.set(self.lists.get() + 1);
        if self.fail_list {
            return Err(RepoError::Unavailable("offline".to_string()));
        }
        let mut entries = self.entries.borrow().clone();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(1_704_844_800_000).unwrap()
}

fn today() -> NaiveDate {
    day(2024, 1, 10)
}

/// Session on step 5 for happy/optimistic/Hopeful on `date`.
fn session_at_journal(date: NaiveDate) -> WizardSession {
    let mut session = WizardSession::new(today());
    session.pick_date(date).unwrap();
    assert_eq!(session.advance().unwrap(), Advance::Moved(WizardStep::SelectCore));
    session.select_core("happy").unwrap();
    session.advance().unwrap();
    session.select_secondary("optimistic").unwrap();
    session.advance().unwrap();
    session.select_tertiary("Hopeful").unwrap();
    assert_eq!(
        session.advance().unwrap(),
        Advance::Moved(WizardStep::WriteJournal)
    );
    session
}

#[test]
fn new_session_starts_on_date_step_with_today() {
    let session = WizardSession::new(today());
    assert_eq!(session.step(), WizardStep::SelectDate);
    assert_eq!(session.selection().date, Some(today()));
    assert!(session.message().is_none());
}

#[test]
fn full_flow_saves_entry_and_resets() {
    let gateway = FakeGateway::default();
    let mut session = session_at_journal(day(2024, 1, 5));
    session.set_journal_text("test").unwrap();
    assert_eq!(session.advance().unwrap(), Advance::ReadyToSubmit);

    let saved = session.submit(&gateway, now()).unwrap();

    assert_eq!(saved.date_key(), "2024-01-05");
    assert_eq!(saved.core_feeling, "happy");
    assert_eq!(saved.secondary_feeling, "optimistic");
    assert_eq!(saved.tertiary_feeling, "Hopeful");
    assert_eq!(saved.journal, "test");
    assert_eq!(saved.created_at, now());
    assert_eq!(gateway.creates.get(), 1);

    assert_eq!(session.step(), WizardStep::SelectDate);
    assert_eq!(session.message(), Some(MSG_SAVED));
    assert!(session.selection().core.is_none());
    assert!(session.selection().journal_text.is_empty());
    assert!(session.is_date_taken(day(2024, 1, 5)));
}

#[test]
fn submitted_entry_roundtrips_through_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let gateway = SqliteEntryGateway::try_new(&conn).unwrap();
    let mut session = session_at_journal(day(2024, 1, 5));
    session.set_journal_text("test").unwrap();

    let saved = session.submit(&gateway, now()).unwrap();

    let listed = gateway.list_entries().unwrap();
    assert_eq!(listed, vec![saved]);
    session.refresh_entries(&gateway).unwrap();
    assert!(session.pick_date(day(2024, 1, 5)).is_err());
}

#[test]
fn blank_journal_never_reaches_gateway() {
    let gateway = FakeGateway::default();
    let mut session = session_at_journal(day(2024, 1, 5));
    session.set_journal_text("   \n").unwrap();

    let err = session.submit(&gateway, now()).unwrap_err();

    assert!(matches!(err, WizardError::Validation(_)));
    assert_eq!(session.message(), Some(MSG_ENTER_JOURNAL));
    assert_eq!(session.step(), WizardStep::WriteJournal);
    assert_eq!(gateway.creates.get(), 0);
    assert_eq!(gateway.lists.get(), 0);
    assert!(session.advance().is_err());
}

#[test]
fn submit_rejects_date_stored_since_last_fetch() {
    let stored = MoodEntry::new(day(2024, 1, 5), "sad", "lonely", "Isolated", "earlier");
    let gateway = FakeGateway::with_entries(vec![stored]);
    let mut session = session_at_journal(day(2024, 1, 5));
    session.set_journal_text("second try").unwrap();

    let err = session.submit(&gateway, now()).unwrap_err();

    assert!(matches!(err, WizardError::DuplicateDate(date) if date == day(2024, 1, 5)));
    assert_eq!(session.message(), Some(MSG_DATE_TAKEN));
    assert_eq!(gateway.creates.get(), 0);
    assert_eq!(session.step(), WizardStep::WriteJournal);
    assert_eq!(session.selection().journal_text, "second try");
}

#[test]
fn taken_dates_cannot_be_picked_after_refresh() {
    let stored = MoodEntry::new(today(), "sad", "lonely", "Isolated", "earlier");
    let gateway = FakeGateway::with_entries(vec![stored]);
    let mut session = WizardSession::new(today());

    session.refresh_entries(&gateway).unwrap();
    // Preselected today is dropped once it turns out to be taken.
    assert_eq!(session.selection().date, None);

    let err = session.pick_date(today()).unwrap_err();
    assert!(matches!(err, WizardError::DuplicateDate(_)));
    assert_eq!(session.selection().date, None);

    session.pick_date(day(2024, 1, 9)).unwrap();
    assert_eq!(session.selection().date, Some(day(2024, 1, 9)));
    assert!(session.message().is_none());
}

#[test]
fn gateway_failure_keeps_step_and_journal() {
    let gateway = FakeGateway {
        fail_create: true,
        ..FakeGateway::default()
    };
    let mut session = session_at_journal(day(2024, 1, 5));
    session.set_journal_text("keep me").unwrap();

    let err = session.submit(&gateway, now()).unwrap_err();

    assert!(matches!(err, WizardError::Gateway(_)));
    assert_eq!(session.message(), Some(MSG_SAVE_FAILED));
    assert_eq!(session.step(), WizardStep::WriteJournal);
    assert_eq!(session.selection().journal_text, "keep me");
    assert_eq!(session.selection().tertiary.as_deref(), Some("Hopeful"));
    assert_eq!(gateway.creates.get(), 1);
}

#[test]
fn fetch_failure_keeps_previous_entries() {
    let stored = MoodEntry::new(day(2024, 1, 2), "sad", "lonely", "Isolated", "earlier");
    let mut gateway = FakeGateway::with_entries(vec![stored]);
    let mut session = WizardSession::new(today());
    session.refresh_entries(&gateway).unwrap();

    gateway.fail_list = true;
    assert!(session.refresh_entries(&gateway).is_err());

    assert_eq!(session.entries().len(), 1);
    assert_eq!(session.message(), Some(MSG_LOAD_FAILED));
}

#[test]
fn advance_requires_current_selection() {
    let mut session = WizardSession::new(today());
    session.advance().unwrap();

    let err = session.advance().unwrap_err();

    assert!(matches!(err, WizardError::Validation(_)));
    assert_eq!(session.message(), Some(MSG_SELECT_CORE));
    assert_eq!(session.step(), WizardStep::SelectCore);
}

#[test]
fn retreat_clears_the_level_being_left() {
    let mut session = session_at_journal(day(2024, 1, 5));

    assert_eq!(session.retreat().unwrap(), WizardStep::SelectTertiary);
    assert_eq!(session.selection().tertiary.as_deref(), Some("Hopeful"));

    assert_eq!(session.retreat().unwrap(), WizardStep::SelectSecondary);
    assert!(session.selection().tertiary.is_none());
    assert_eq!(session.selection().secondary.as_deref(), Some("optimistic"));

    assert_eq!(session.retreat().unwrap(), WizardStep::SelectCore);
    assert!(session.selection().secondary.is_none());
    assert_eq!(session.selection().core.as_deref(), Some("happy"));

    assert_eq!(session.retreat().unwrap(), WizardStep::SelectDate);
    assert_eq!(session.selection().date, Some(day(2024, 1, 5)));
    assert_eq!(session.selection().core.as_deref(), Some("happy"));
}

#[test]
fn retreat_from_views_returns_to_date_step() {
    let mut session = session_at_journal(day(2024, 1, 5));

    session.go_to_summary();
    assert_eq!(session.retreat().unwrap(), WizardStep::SelectDate);

    session.go_to_history();
    assert_eq!(session.retreat().unwrap(), WizardStep::SelectDate);
    assert_eq!(session.selection().tertiary.as_deref(), Some("Hopeful"));
}

#[test]
fn unopened_store_sets_load_failure_message() {
    let mut session = WizardSession::new(today());
    session.go_to_history();

    session.note_fetch_failure();

    assert_eq!(session.message(), Some(MSG_LOAD_FAILED));
    assert_eq!(session.step(), WizardStep::HistoryLookup);
    assert!(session.entries().is_empty());
}

#[test]
fn retreat_from_first_step_is_rejected() {
    let mut session = WizardSession::new(today());
    assert!(session.retreat().is_err());
    assert_eq!(session.step(), WizardStep::SelectDate);
}

#[test]
fn new_core_clears_deeper_levels() {
    let mut session = WizardSession::new(today());
    session.advance().unwrap();
    session.select_core("happy").unwrap();
    session.advance().unwrap();
    session.select_secondary("optimistic").unwrap();
    session.retreat().unwrap();

    session.select_core("sad").unwrap();

    assert_eq!(session.selection().core.as_deref(), Some("sad"));
    assert!(session.selection().secondary.is_none());
    assert!(session.selection().tertiary.is_none());
}

#[test]
fn secondary_outside_core_is_not_found() {
    let mut session = WizardSession::new(today());
    session.advance().unwrap();
    session.select_core("happy").unwrap();
    session.advance().unwrap();

    let err = session.select_secondary("lonely").unwrap_err();

    assert!(matches!(err, WizardError::NotFound(_)));
    assert!(session.selection().secondary.is_none());
    assert_eq!(session.step(), WizardStep::SelectSecondary);
}

#[test]
fn selections_are_limited_to_their_step() {
    let mut session = WizardSession::new(today());
    assert!(session.select_core("happy").is_err());
    assert!(session.set_journal_text("early").is_err());
    assert!(session.selection().core.is_none());
    assert!(session.selection().journal_text.is_empty());
}

#[test]
fn stale_fetch_results_are_discarded() {
    let stored = MoodEntry::new(day(2024, 1, 5), "happy", "optimistic", "Hopeful", "x");
    let mut session = WizardSession::new(today());

    let ticket = session.begin_fetch();
    session.go_to_summary();

    assert!(!session.apply_fetch(ticket, Ok(vec![stored.clone()])));
    assert!(session.entries().is_empty());

    let fresh = session.begin_fetch();
    assert_eq!(fresh.step(), WizardStep::MonthlySummary);
    assert!(session.apply_fetch(fresh, Ok(vec![stored])));
    assert_eq!(session.entries().len(), 1);
}

#[test]
fn summary_view_navigates_months() {
    let gateway = FakeGateway::with_entries(vec![
        MoodEntry::new(day(2024, 1, 5), "happy", "optimistic", "Hopeful", "a"),
        MoodEntry::new(day(2023, 12, 31), "sad", "lonely", "Isolated", "b"),
    ]);
    let mut session = WizardSession::new(today());
    session.go_to_summary();
    session.refresh_entries(&gateway).unwrap();

    let january = session.monthly_summary();
    assert_eq!(january.month.label(), "January 2024");
    assert_eq!(january.total, 1);
    assert_eq!(january.count_of("happy"), 1);

    session.previous_month().unwrap();
    let december = session.monthly_summary();
    assert_eq!(december.total, 1);
    assert_eq!(december.count_of("sad"), 1);

    session.next_month().unwrap();
    session.next_month().unwrap();
    assert!(session.monthly_summary().is_empty());

    assert_eq!(session.retreat().unwrap(), WizardStep::SelectDate);
}

#[test]
fn history_view_shows_entry_or_message() {
    let gateway = FakeGateway::with_entries(vec![MoodEntry::new(
        day(2024, 1, 5),
        "happy",
        "optimistic",
        "Hopeful",
        "sunny",
    )]);
    let mut session = WizardSession::new(today());
    session.go_to_history();
    session.refresh_entries(&gateway).unwrap();

    let found = session.pick_history_date(day(2024, 1, 5)).unwrap().cloned();
    assert_eq!(found.map(|entry| entry.journal), Some("sunny".to_string()));
    assert!(session.message().is_none());

    assert!(session.pick_history_date(day(2024, 1, 6)).unwrap().is_none());
    assert_eq!(session.message(), Some(MSG_NO_ENTRY));

    session.back_to_tracker();
    assert_eq!(session.step(), WizardStep::SelectDate);
    assert!(session.pick_history_date(day(2024, 1, 5)).is_err());
}

#[test]
fn render_data_follows_selection() {
    let mut session = WizardSession::new(today());
    assert_eq!(session.core_options().len(), 7);
    assert_eq!(session.core_wheel().len(), 7);
    assert!(session.secondary_options().is_empty());
    assert!(session.secondary_wheel().is_empty());

    session.advance().unwrap();
    session.select_core("happy").unwrap();
    let secondaries = session.secondary_options();
    assert!(!secondaries.is_empty());
    assert!(secondaries.iter().all(|option| !option.selected));
    assert!(session
        .core_wheel()
        .iter()
        .any(|wedge| wedge.id == "happy" && wedge.selected));

    session.advance().unwrap();
    session.select_secondary("optimistic").unwrap();
    session.advance().unwrap();
    let tertiaries = session.tertiary_options();
    let labels: Vec<&str> = tertiaries.iter().map(|option| option.id).collect();
    assert_eq!(labels, vec!["Inspired", "Hopeful"]);
    assert!(tertiaries.iter().all(|option| option.color == "#FFA500"));

    session.select_tertiary("Hopeful").unwrap();
    assert_eq!(session.selection_path_label(), "happy → optimistic → Hopeful");
}
