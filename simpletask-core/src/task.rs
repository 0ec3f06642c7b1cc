//! Task document model for `SimpleTask`.
//!
//! Tasks live in a schemaless remote document store as string-keyed field
//! maps. This module defines the stored field conventions, the normalized
//! in-memory [`Task`] read model, and the [`TaskDraft`] / [`TaskPatch`]
//! payloads used to create and mutate documents.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document field holding the id of the owning user.
///
/// Task queries filter on this field so that each user only ever sees
/// their own documents.
pub const OWNER_FIELD: &str = "uid";

/// Storage format for due dates (`2026-08-24`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for due times (`14:30`). Stored as a display string;
/// it is never parsed back into a time value.
pub const TIME_FORMAT: &str = "%H:%M";

/// Raw field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// Unique identifier for a task document, assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a `TaskId` from a store-assigned document id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an `OwnerId` from an auth-provider user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Urgent work.
    High,
    /// Everyday work. This is the default, and any unrecognized stored
    /// value normalizes to it on read.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Returns the stored wire form of this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses a stored priority value, falling back to [`Priority::Medium`]
    /// for anything unrecognized.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: its store-assigned id plus its raw field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned document id.
    pub id: String,
    /// The document's fields.
    pub fields: Fields,
}

/// Normalized in-memory view of a stored task document.
///
/// Stored documents are schemaless, so every field is normalized
/// defensively on read:
///
/// - missing, null, empty, or mistyped optional strings become `None`
/// - an unrecognized `priority` becomes [`Priority::Medium`]
/// - a missing or mistyped `completed` becomes `false`
/// - an unparseable `createdAt` becomes the Unix epoch, keeping ordering
///   stable across refreshes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned document id.
    pub id: TaskId,
    /// Id of the owning user.
    pub owner_id: OwnerId,
    /// Task title, stored verbatim (not trimmed).
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Priority level.
    pub priority: Priority,
    /// Due date as stored, nominally [`DATE_FORMAT`]. Kept verbatim;
    /// view projections parse it and skip or fall back when it does not
    /// parse.
    pub date: Option<String>,
    /// Due time display string, nominally [`TIME_FORMAT`].
    pub time: Option<String>,
    /// Whether the task is done.
    pub completed: bool,
    /// When the task was last marked done. Cleared when it is reopened.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the task document was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a normalized `Task` from a stored document's field map.
    #[must_use]
    pub fn from_fields(id: TaskId, fields: &Fields) -> Self {
        let owner_id = OwnerId::new(str_field(fields, OWNER_FIELD).unwrap_or_default());
        let title = str_field(fields, "title").unwrap_or_default().to_string();
        let description = opt_str_field(fields, "description");
        let priority =
            str_field(fields, "priority").map_or_else(Priority::default, Priority::from_wire);
        let date = opt_str_field(fields, "date");
        let time = opt_str_field(fields, "time");
        let completed = fields
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let completed_at = str_field(fields, "completedAt").and_then(parse_timestamp);
        let created_at = str_field(fields, "createdAt")
            .and_then(parse_timestamp)
            .unwrap_or(DateTime::UNIX_EPOCH);
        Self {
            id,
            owner_id,
            title,
            description,
            priority,
            date,
            time,
            completed,
            completed_at,
            created_at,
        }
    }

    /// Builds a normalized `Task` from a fetched [`Document`].
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self::from_fields(TaskId::new(doc.id.clone()), &doc.fields)
    }
}

fn str_field<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn opt_str_field(fields: &Fields, key: &str) -> Option<String> {
    str_field(fields, key)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Payload for creating a new task.
///
/// Only the title is required. The owner id and creation timestamp are
/// stamped at insert time, not carried by the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title, stored verbatim.
    pub title: String,
    /// Optional description. Stored as an empty string when unset.
    pub description: Option<String>,
    /// Priority level, [`Priority::Medium`] unless set.
    pub priority: Priority,
    /// Optional due date.
    pub date: Option<NaiveDate>,
    /// Optional due time, stored as a display string.
    pub time: Option<NaiveTime>,
}

impl TaskDraft {
    /// Creates a draft with the given title and defaults everywhere else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            date: None,
            time: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the due time.
    #[must_use]
    pub const fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Renders the draft into the field map stored for a new document.
    ///
    /// Every field is written, with empty strings standing in for unset
    /// optionals. The owner id and creation timestamp are stamped here,
    /// and `completed` always starts out `false`.
    #[must_use]
    pub fn into_fields(self, owner: &OwnerId, created_at: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), Value::String(self.title));
        fields.insert(
            "description".to_string(),
            Value::String(self.description.unwrap_or_default()),
        );
        fields.insert(
            "priority".to_string(),
            Value::String(self.priority.as_str().to_string()),
        );
        fields.insert(
            "date".to_string(),
            Value::String(
                self.date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
        );
        fields.insert(
            "time".to_string(),
            Value::String(
                self.time
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
        );
        fields.insert("completed".to_string(), Value::Bool(false));
        fields.insert(
            OWNER_FIELD.to_string(),
            Value::String(owner.as_str().to_string()),
        );
        fields.insert(
            "createdAt".to_string(),
            Value::String(created_at.to_rfc3339()),
        );
        fields
    }
}

/// Partial update to an existing task document.
///
/// Outer `None` leaves a field untouched; for doubly-optional fields an
/// inner `None` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date, or `Some(None)` to clear it.
    pub date: Option<Option<NaiveDate>>,
    /// New due time, or `Some(None)` to clear it.
    pub time: Option<Option<NaiveTime>>,
    /// New completion state.
    pub completed: Option<bool>,
    /// New completion timestamp, or `Some(None)` to clear it.
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Returns `true` when the patch touches no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.completed.is_none()
            && self.completed_at.is_none()
    }

    /// Renders the patch into the field map sent to the store.
    ///
    /// Only touched fields appear; cleared fields are written as explicit
    /// nulls, which the store removes from the document.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        if let Some(title) = self.title {
            fields.insert("title".to_string(), Value::String(title));
        }
        if let Some(description) = self.description {
            fields.insert(
                "description".to_string(),
                description.map_or(Value::Null, Value::String),
            );
        }
        if let Some(priority) = self.priority {
            fields.insert(
                "priority".to_string(),
                Value::String(priority.as_str().to_string()),
            );
        }
        if let Some(date) = self.date {
            fields.insert(
                "date".to_string(),
                date.map_or(Value::Null, |d| {
                    Value::String(d.format(DATE_FORMAT).to_string())
                }),
            );
        }
        if let Some(time) = self.time {
            fields.insert(
                "time".to_string(),
                time.map_or(Value::Null, |t| {
                    Value::String(t.format(TIME_FORMAT).to_string())
                }),
            );
        }
        if let Some(completed) = self.completed {
            fields.insert("completed".to_string(), Value::Bool(completed));
        }
        if let Some(completed_at) = self.completed_at {
            fields.insert(
                "completedAt".to_string(),
                completed_at.map_or(Value::Null, |ts| Value::String(ts.to_rfc3339())),
            );
        }
        fields
    }
}
