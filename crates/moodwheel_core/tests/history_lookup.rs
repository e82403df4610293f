use chrono::{DateTime, NaiveDate, Utc};
use moodwheel_core::{canonical_date, long_date_label, lookup_entry, HistoryIndex, MoodEntry};

fn day(value: &str) -> NaiveDate {
    canonical_date(value).unwrap()
}

fn entry_at(date: &str, tertiary: &str, created_ms: i64) -> MoodEntry {
    MoodEntry::new(day(date), "happy", "optimistic", tertiary, "journal")
        .with_created_at(DateTime::<Utc>::from_timestamp_millis(created_ms).unwrap())
}

#[test]
fn lookup_finds_entry_for_its_date() {
    let entries = vec![
        entry_at("2024-01-05", "Hopeful", 1_000),
        entry_at("2024-01-06", "Inspired", 2_000),
    ];

    let found = lookup_entry(&entries, day("2024-01-05")).unwrap();
    assert_eq!(found.tertiary_feeling, "Hopeful");
    assert_eq!(long_date_label(found.date), "Friday, January 5, 2024");
}

#[test]
fn missing_date_is_none() {
    let entries = vec![entry_at("2024-01-05", "Hopeful", 1_000)];
    assert!(lookup_entry(&entries, day("2024-01-07")).is_none());
    assert!(lookup_entry(&[], day("2024-01-05")).is_none());
}

#[test]
fn timestamp_input_resolves_to_same_key() {
    let entries = vec![entry_at("2024-01-05", "Hopeful", 1_000)];
    let picked = day("2024-01-05T12:00:00Z");
    assert!(lookup_entry(&entries, picked).is_some());
}

#[test]
fn latest_created_entry_wins_for_duplicate_dates() {
    let entries = vec![
        entry_at("2024-01-05", "Inspired", 5_000),
        entry_at("2024-01-05", "Hopeful", 1_000),
    ];
    let index = HistoryIndex::build(&entries);

    assert_eq!(index.len(), 1);
    assert_eq!(
        index.lookup(day("2024-01-05")).unwrap().tertiary_feeling,
        "Inspired"
    );
}

#[test]
fn index_highlights_dates_with_entries() {
    let entries = vec![
        entry_at("2024-02-01", "Hopeful", 1_000),
        entry_at("2024-01-05", "Hopeful", 1_000),
    ];
    let index = HistoryIndex::build(&entries);

    assert!(index.has_entry(day("2024-01-05")));
    assert!(!index.has_entry(day("2024-01-06")));
    assert_eq!(
        index.date_keys().collect::<Vec<_>>(),
        vec!["2024-01-05", "2024-02-01"]
    );
}
