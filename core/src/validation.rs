//! Field rules for todo input.
//!
//! Pure functions: nothing here touches storage, so the same rules run
//! before every insert and every update.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;
use crate::types::{CreateTodo, Field, NewTodo, Priority, TodoPatch, UpdateTodo, DEFAULT_CATEGORY};

pub const MAX_TEXT_LEN: usize = 500;

/// Validate a create request, filling in defaults for omitted fields.
pub fn validate_create(input: CreateTodo) -> Result<NewTodo, ValidationError> {
    let text = validate_text(&input.text)?;

    let priority = match input.priority.as_deref() {
        None | Some("") => Priority::default(),
        Some(p) => p.parse()?,
    };

    let category = match input.category.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_CATEGORY.to_string(),
        Some(c) => c.to_string(),
    };

    let due_date = match input.due_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_due_date(raw)?),
    };

    Ok(NewTodo {
        text,
        priority,
        due_date,
        category,
    })
}

/// Validate a partial update. Absent fields stay `None` in the patch.
pub fn validate_update(input: UpdateTodo) -> Result<TodoPatch, ValidationError> {
    let text = match input.text {
        Field::Absent => None,
        Field::Null => return Err(ValidationError::required("text")),
        Field::Value(t) => Some(validate_text(&t)?),
    };

    let completed = match input.completed {
        Field::Absent => None,
        Field::Null => return Err(ValidationError::new("completed", "must be a boolean")),
        Field::Value(c) => Some(c),
    };

    let priority = match input.priority {
        Field::Absent => None,
        Field::Null => return Err(ValidationError::new("priority", "must not be null")),
        Field::Value(p) => Some(p.parse()?),
    };

    let category = match input.category {
        Field::Absent => None,
        Field::Null => return Err(ValidationError::new("category", "must not be null")),
        Field::Value(c) => {
            let c = c.trim();
            if c.is_empty() {
                return Err(ValidationError::new("category", "must not be empty"));
            }
            Some(c.to_string())
        }
    };

    let due_date = match input.due_date {
        Field::Absent => None,
        Field::Null => Some(None),
        Field::Value(raw) if raw.trim().is_empty() => Some(None),
        Field::Value(raw) => Some(Some(parse_due_date(raw.trim())?)),
    };

    Ok(TodoPatch {
        text,
        completed,
        priority,
        due_date,
        category,
    })
}

fn validate_text(raw: &str) -> Result<String, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::required("text"));
    }
    let len = text.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(ValidationError::new(
            "text",
            format!("cannot exceed {MAX_TEXT_LEN} characters (got {len})"),
        ));
    }
    Ok(text.to_string())
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ValidationError::new("dueDate", format!("`{raw}` is not a valid date")))
}
