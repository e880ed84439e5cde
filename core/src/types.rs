//! Domain types for the todo collection.
//!
//! # Design
//! Request payloads (`CreateTodo`, `UpdateTodo`) keep loosely typed fields
//! so that a bad value surfaces as a `ValidationError` naming the field
//! instead of an opaque deserialization failure. `validation` turns them into
//! `NewTodo` / `TodoPatch`, which are the only shapes a store accepts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ValidationError;

pub const DEFAULT_CATEGORY: &str = "general";

/// Priority of a todo. Declaration order is the sort rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::new(
                "priority",
                format!("`{other}` is not one of low, medium, high"),
            )),
        }
    }
}

/// A stored todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Materialize a validated draft under a storage-assigned id.
    pub fn from_draft(id: Uuid, draft: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: draft.text,
            completed: false,
            priority: draft.priority,
            due_date: draft.due_date,
            category: draft.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the present fields of `patch` and refresh `updated_at`.
    ///
    /// `updated_at` never moves behind `created_at`, even if the caller's
    /// clock does.
    pub fn apply(&mut self, patch: &TodoPatch, now: DateTime<Utc>) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Request payload for creating a todo.
///
/// `completed` is accepted for wire compatibility but ignored: new todos
/// always start incomplete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Request payload for a partial update. Only the fields present in the JSON
/// are applied; `"dueDate": null` clears the due date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub text: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub completed: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub priority: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub due_date: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub category: Field<String>,
}

/// A JSON object member that may be missing, explicitly `null`, or set.
///
/// Use with `#[serde(default)]`: a missing key deserializes to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category: String,
}

/// An update request that passed validation. `None` leaves a field alone;
/// `due_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub category: Option<String>,
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}
