//! Stats view projection.
//!
//! Buckets a task snapshot into fixed-size series for the stats charts,
//! plus headline totals. Unlike the calendar grouping, these projections
//! only look at the stored due date: a task whose date is missing or does
//! not parse is excluded, with no creation-date fallback.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::task::{DATE_FORMAT, Task};

const WEEK_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Charted time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The current week, Sunday through Saturday.
    Week,
    /// The current calendar month, as thirty day buckets.
    Month,
    /// The current calendar year, as twelve month buckets.
    Year,
}

/// A labeled count series ready for charting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSeries {
    /// One label per bucket.
    pub labels: Vec<String>,
    /// One task count per bucket, aligned with `labels`.
    pub counts: Vec<u32>,
}

/// Headline counts for the stats screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTotals {
    /// All tasks in the snapshot.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Tasks not yet completed.
    pub pending: usize,
    /// Tasks due on or after the start of the current week. There is no
    /// upper bound, so far-future tasks count too.
    pub this_week: usize,
}

/// Buckets tasks by due date over the given period.
///
/// The week runs Sunday to Saturday around the reference instant. The
/// month series always has thirty buckets, so a task due on the 31st is
/// dropped. Tasks due outside the period, or with no parseable due date,
/// are excluded.
#[must_use]
pub fn bucket_by_period(tasks: &[Task], period: Period, reference: DateTime<Utc>) -> PeriodSeries {
    let reference = reference.date_naive();
    match period {
        Period::Week => {
            let start = week_start(reference);
            let mut counts = vec![0_u32; 7];
            for date in tasks.iter().filter_map(parse_due_date) {
                let offset = (date - start).num_days();
                if let Ok(idx) = usize::try_from(offset)
                    && idx < 7
                {
                    counts[idx] += 1;
                }
            }
            PeriodSeries {
                labels: WEEK_LABELS.iter().map(ToString::to_string).collect(),
                counts,
            }
        }
        Period::Month => {
            let mut counts = vec![0_u32; 30];
            for date in tasks.iter().filter_map(parse_due_date) {
                if date.year() == reference.year()
                    && date.month() == reference.month()
                    && let Ok(day) = usize::try_from(date.day())
                    && (1..=30).contains(&day)
                {
                    counts[day - 1] += 1;
                }
            }
            PeriodSeries {
                labels: (1..=30).map(|day: u32| day.to_string()).collect(),
                counts,
            }
        }
        Period::Year => {
            let mut counts = vec![0_u32; 12];
            for date in tasks.iter().filter_map(parse_due_date) {
                if date.year() == reference.year()
                    && let Ok(month) = usize::try_from(date.month())
                    && (1..=12).contains(&month)
                {
                    counts[month - 1] += 1;
                }
            }
            PeriodSeries {
                labels: MONTH_LABELS.iter().map(ToString::to_string).collect(),
                counts,
            }
        }
    }
}

/// Computes headline totals around the reference instant.
#[must_use]
pub fn task_totals(tasks: &[Task], reference: DateTime<Utc>) -> TaskTotals {
    let start = week_start(reference.date_naive());
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let this_week = tasks
        .iter()
        .filter_map(parse_due_date)
        .filter(|date| *date >= start)
        .count();
    TaskTotals {
        total,
        completed,
        pending: total - completed,
        this_week,
    }
}

/// The Sunday on or before the given day.
fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_sunday());
    day.checked_sub_days(Days::new(offset)).unwrap_or(day)
}

fn parse_due_date(task: &Task) -> Option<NaiveDate> {
    task.date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
}
