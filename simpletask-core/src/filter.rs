//! List filtering for the home view.
//!
//! A pure projection over a cached task snapshot: a completion-status
//! filter combined with a case-insensitive substring search. Input order
//! is preserved, so callers control presentation order upstream.

use crate::task::Task;

/// Completion-status filter for the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Only tasks not yet completed.
    Pending,
    /// Only completed tasks.
    Completed,
}

impl StatusFilter {
    /// Returns `true` when the task passes this filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Applies the status filter, then a substring search over title and
/// description.
///
/// The search is case-insensitive and the query is used verbatim (not
/// trimmed). An empty query skips the search step entirely. Tasks with no
/// description only match on title.
#[must_use]
pub fn filter_and_search<'a>(
    tasks: &'a [Task],
    status: StatusFilter,
    query: &str,
) -> Vec<&'a Task> {
    let needle = if query.is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    };
    tasks
        .iter()
        .filter(|task| status.matches(task))
        .filter(|task| {
            needle.as_ref().is_none_or(|q| {
                task.title.to_lowercase().contains(q)
                    || task
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(q))
            })
        })
        .collect()
}
