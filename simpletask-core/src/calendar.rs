//! Calendar view projection.
//!
//! Groups a task snapshot by due date so a month grid can mark which days
//! carry work and whether that work is finished.

use std::collections::BTreeMap;

use crate::task::{DATE_FORMAT, Task};

/// Completion state of all tasks sharing one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStatus {
    /// Every task on the day is still open.
    Pending,
    /// Every task on the day is completed.
    Done,
    /// The day has both open and completed tasks.
    Mixed,
}

/// Groups tasks by due-date string, keyed `YYYY-MM-DD`.
///
/// A task with no due date is grouped under its creation date instead, so
/// every task lands on some day. The stored date string is used verbatim
/// as the key, whatever its shape; only the fallback is formatted here.
/// Keys iterate in ascending order.
#[must_use]
pub fn group_by_date(tasks: &[Task]) -> BTreeMap<String, Vec<&Task>> {
    let mut groups: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        let key = task.date.clone().unwrap_or_else(|| {
            task.created_at
                .date_naive()
                .format(DATE_FORMAT)
                .to_string()
        });
        groups.entry(key).or_default().push(task);
    }
    groups
}

/// Summarizes the completion state of one day's tasks.
///
/// An empty day reads as [`DateStatus::Pending`]; callers only mark days
/// that actually have tasks.
#[must_use]
pub fn date_status(tasks: &[&Task]) -> DateStatus {
    let completed = tasks.iter().filter(|t| t.completed).count();
    if completed == 0 {
        DateStatus::Pending
    } else if completed == tasks.len() {
        DateStatus::Done
    } else {
        DateStatus::Mixed
    }
}
