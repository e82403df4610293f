//! Monthly per-core-emotion aggregation.
//!
//! # Responsibility
//! - Count entries per core emotion for one calendar month.
//! - Provide month navigation and percentage helpers for the chart view.
//!
//! # Invariants
//! - Every taxonomy core appears in the result, in taxonomy order, even with
//!   a zero count.
//! - `total` counts every entry in the month; it is the percentage denominator.
//! - An empty month is a valid all-zero result.

use crate::model::entry::MoodEntry;
use crate::model::taxonomy::taxonomy;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Calendar month cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Long label such as `January 2024`.
    pub fn label(self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{:04}-{:02}", self.year, self.month),
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Count for one core emotion within a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreCount {
    pub core: &'static str,
    /// Swatch color (the core's inner color).
    pub color: &'static str,
    pub count: u32,
}

/// Aggregated month view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub month: YearMonth,
    /// One row per taxonomy core, in taxonomy order.
    pub counts: Vec<CoreCount>,
    /// Number of entries dated within `month`.
    pub total: u32,
}

impl MonthlySummary {
    pub fn count_of(&self, core: &str) -> u32 {
        self.counts
            .iter()
            .find(|row| row.core == core)
            .map_or(0, |row| row.count)
    }

    /// Share of the month's entries for `core`, in percent.
    pub fn percentage(&self, core: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.count_of(core)) / f64::from(self.total) * 100.0
    }

    /// Rows with a non-zero count, for chart rendering.
    pub fn nonzero(&self) -> impl Iterator<Item = &CoreCount> {
        self.counts.iter().filter(|row| row.count > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Aggregates `entries` for `month`.
pub fn summarize_month(entries: &[MoodEntry], month: YearMonth) -> MonthlySummary {
    let mut counts: Vec<CoreCount> = taxonomy()
        .cores()
        .iter()
        .map(|core| CoreCount {
            core: core.id,
            color: core.inner_color,
            count: 0,
        })
        .collect();

    let mut total = 0;
    for entry in entries.iter().filter(|entry| month.contains(entry.date)) {
        total += 1;
        if let Some(row) = counts.iter_mut().find(|row| row.core == entry.core_feeling) {
            row.count += 1;
        }
    }

    MonthlySummary {
        month,
        counts,
        total,
    }
}
