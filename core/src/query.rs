//! List query construction: request parameters to a filter plus sort spec.
//!
//! # Design
//! Each present parameter adds one predicate and all predicates are ANDed.
//! Text predicates are case-insensitive substring checks, so a search term
//! is never interpreted as a pattern. `sortBy` is checked against
//! `SortField` instead of being handed to storage verbatim.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{Priority, Todo};

/// Raw list parameters as they arrive on the query string. Every field is
/// optional and empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// Conjunctive predicate over todos. `None` fields impose no constraint.
///
/// `category` and `search` are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

impl Filter {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if self.completed.is_some_and(|c| c != todo.completed) {
            return false;
        }
        if self.priority.is_some_and(|p| p != todo.priority) {
            return false;
        }
        if let Some(needle) = &self.category {
            if !todo.category.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            if !todo.text.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Fields a list may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Text,
    Priority,
    DueDate,
    Category,
    Completed,
}

impl SortField {
    pub const ALLOWED: [&'static str; 7] = [
        "createdAt",
        "updatedAt",
        "text",
        "priority",
        "dueDate",
        "category",
        "completed",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Text => "text",
            SortField::Priority => "priority",
            SortField::DueDate => "dueDate",
            SortField::Category => "category",
            SortField::Completed => "completed",
        }
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "text" => Ok(SortField::Text),
            "priority" => Ok(SortField::Priority),
            "dueDate" => Ok(SortField::DueDate),
            "category" => Ok(SortField::Category),
            "completed" => Ok(SortField::Completed),
            other => Err(ValidationError::new(
                "sortBy",
                format!("`{other}` is not one of {}", Self::ALLOWED.join(", ")),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Single field + direction. No secondary key: ties keep whatever order the
/// store yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let ord = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Text => a.text.cmp(&b.text),
            SortField::Priority => a.priority.cmp(&b.priority),
            // None sorts before any date.
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Completed => a.completed.cmp(&b.completed),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// A resolved list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    pub sort: SortSpec,
}

/// Resolve raw list parameters into a filter and sort spec.
pub fn build_query(params: &ListParams) -> Result<Query, ValidationError> {
    let completed = match present(&params.completed) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    let priority = present(&params.priority)
        .map(str::parse::<Priority>)
        .transpose()?;

    let field = present(&params.sort_by)
        .map(str::parse::<SortField>)
        .transpose()?
        .unwrap_or_default();

    let order = match present(&params.order) {
        None | Some("desc") => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some(other) => {
            return Err(ValidationError::new(
                "order",
                format!("`{other}` is not one of asc, desc"),
            ))
        }
    };

    Ok(Query {
        filter: Filter {
            completed,
            category: present(&params.category).map(str::to_lowercase),
            priority,
            search: present(&params.search).map(str::to_lowercase),
        },
        sort: SortSpec { field, order },
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn todo(text: &str, category: &str, priority: Priority, completed: bool) -> Todo {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Todo {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed,
            priority,
            due_date: None,
            category: category.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let qs = serde_urlencoded::to_string(pairs).unwrap();
        serde_urlencoded::from_str(&qs).unwrap()
    }

    #[test]
    fn empty_params_default_to_created_at_desc() {
        let q = build_query(&ListParams::default()).unwrap();
        assert_eq!(q.filter, Filter::default());
        assert_eq!(q.sort.field, SortField::CreatedAt);
        assert_eq!(q.sort.order, SortOrder::Desc);
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("false", Some(false))]
    #[case("yes", None)]
    #[case("1", None)]
    #[case("", None)]
    fn completed_parsing(#[case] raw: &str, #[case] expected: Option<bool>) {
        let q = build_query(&params(&[("completed", raw)])).unwrap();
        assert_eq!(q.filter.completed, expected);
    }

    #[test]
    fn category_and_search_are_case_insensitive_substrings() {
        let q = build_query(&params(&[("category", "WoR"), ("search", "MILK")])).unwrap();
        assert!(q.filter.matches(&todo("Buy milk", "Work", Priority::Low, false)));
        assert!(q.filter.matches(&todo("buy Milkshake", "homework", Priority::Low, false)));
        assert!(!q.filter.matches(&todo("Buy bread", "Work", Priority::Low, false)));
        assert!(!q.filter.matches(&todo("Buy milk", "home", Priority::Low, false)));
    }

    #[test]
    fn search_terms_are_literal() {
        let q = build_query(&params(&[("search", "a.c")])).unwrap();
        assert!(!q.filter.matches(&todo("abc", "general", Priority::Low, false)));
        assert!(q.filter.matches(&todo("xa.cx", "general", Priority::Low, false)));
    }

    #[test]
    fn predicates_are_anded() {
        let q = build_query(&params(&[("completed", "true"), ("priority", "high")])).unwrap();
        assert!(q.filter.matches(&todo("a", "general", Priority::High, true)));
        assert!(!q.filter.matches(&todo("a", "general", Priority::High, false)));
        assert!(!q.filter.matches(&todo("a", "general", Priority::Medium, true)));
    }

    #[rstest]
    #[case("priority", "urgent")]
    #[case("sortBy", "password")]
    #[case("order", "sideways")]
    fn invalid_values_name_their_parameter(#[case] key: &str, #[case] value: &str) {
        let err = build_query(&params(&[(key, value)])).unwrap_err();
        assert_eq!(err.field, key);
    }

    #[test]
    fn sort_by_priority_uses_rank() {
        let low = todo("a", "general", Priority::Low, false);
        let high = todo("b", "general", Priority::High, false);
        let q = build_query(&params(&[("sortBy", "priority"), ("order", "asc")])).unwrap();
        assert_eq!(q.sort.compare(&low, &high), Ordering::Less);

        let q = build_query(&params(&[("sortBy", "priority")])).unwrap();
        assert_eq!(q.sort.compare(&low, &high), Ordering::Greater);
    }

    #[test]
    fn every_allowed_sort_field_parses() {
        for name in SortField::ALLOWED {
            let field: SortField = name.parse().unwrap();
            assert_eq!(field.as_str(), name);
        }
    }
}
