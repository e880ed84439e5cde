//! Aggregate statistics over the whole todo collection.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::query::Filter;
use crate::store::TodoStore;
use crate::types::Todo;

/// Field a `group_by` aggregate buckets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Priority,
    Category,
}

impl GroupField {
    pub fn key_of(self, todo: &Todo) -> String {
        match self {
            GroupField::Priority => todo.priority.as_str().to_string(),
            GroupField::Category => todo.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    /// Percentage with one decimal place; `0.0` for an empty collection.
    pub completion_rate: f64,
    pub by_priority: Vec<GroupCount>,
    /// Sorted by count descending, then key ascending.
    pub by_category: Vec<GroupCount>,
}

impl Stats {
    pub fn new(
        total: u64,
        completed: u64,
        by_priority: Vec<GroupCount>,
        mut by_category: Vec<GroupCount>,
    ) -> Self {
        // Separate reads may straddle a concurrent write.
        let completed = completed.min(total);
        by_category.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate: completion_rate(completed, total),
            by_priority,
            by_category,
        }
    }
}

pub fn completion_rate(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Read counts and group-bys from `store` and assemble `Stats`.
pub async fn compute_stats<S: TodoStore>(store: &S) -> Result<Stats, StoreError> {
    let total = store.count(&Filter::default()).await? as u64;
    let completed = store.count(&Filter::completed(true)).await? as u64;
    let by_priority = store.group_by(GroupField::Priority).await?;
    let by_category = store.group_by(GroupField::Category).await?;
    Ok(Stats::new(total, completed, by_priority, by_category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn group(key: &str, count: u64) -> GroupCount {
        GroupCount {
            key: key.to_string(),
            count,
        }
    }

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(0, 5, 0.0)]
    #[case(1, 3, 33.3)]
    #[case(2, 3, 66.7)]
    #[case(3, 3, 100.0)]
    #[case(1, 8, 12.5)]
    fn completion_rate_rounds_to_one_decimal(
        #[case] completed: u64,
        #[case] total: u64,
        #[case] expected: f64,
    ) {
        assert_eq!(completion_rate(completed, total), expected);
    }

    #[test]
    fn pending_is_total_minus_completed() {
        let stats = Stats::new(5, 2, vec![], vec![]);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.completion_rate, 40.0);
    }

    #[test]
    fn stale_completed_count_is_clamped() {
        let stats = Stats::new(2, 3, vec![], vec![]);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn categories_sorted_by_count_descending() {
        let stats = Stats::new(
            6,
            0,
            vec![],
            vec![group("home", 1), group("work", 3), group("errands", 2)],
        );
        let counts: Vec<u64> = stats.by_category.iter().map(|g| g.count).collect();
        assert_eq!(counts, [3, 2, 1]);

        // Ties fall back to the key.
        let stats = Stats::new(
            7,
            0,
            vec![],
            vec![group("work", 2), group("home", 2), group("errands", 3)],
        );
        let keys: Vec<&str> = stats.by_category.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["errands", "home", "work"]);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let json = serde_json::to_value(Stats::new(1, 1, vec![group("high", 1)], vec![])).unwrap();
        assert_eq!(json["completionRate"], 100.0);
        assert_eq!(json["byPriority"][0]["key"], "high");
        assert!(json["byCategory"].as_array().unwrap().is_empty());
    }
}
