//! Storage collaborator contract and the in-memory implementation.
//!
//! # Design
//! The service only composes these primitives; it never reaches into a
//! store's internals. Methods are declared as `impl Future + Send` so a
//! generic `TodoService<S>` can be driven from multi-threaded handlers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::query::{Filter, SortSpec};
use crate::stats::{GroupCount, GroupField};
use crate::types::{NewTodo, Todo, TodoPatch};

pub trait TodoStore: Send + Sync + 'static {
    /// All todos matching `filter`, ordered by `sort`.
    fn find(
        &self,
        filter: &Filter,
        sort: SortSpec,
    ) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send;

    /// Persist a draft under a freshly generated id.
    fn insert(
        &self,
        draft: NewTodo,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Todo, StoreError>> + Send;

    /// Apply `patch` atomically; `None` if the id does not resolve.
    fn update_by_id(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send;

    /// Returns whether a record was removed.
    fn delete_by_id(&self, id: Uuid) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn count(&self, filter: &Filter) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// One entry per distinct value of `field`, in no particular order.
    fn group_by(
        &self,
        field: GroupField,
    ) -> impl Future<Output = Result<Vec<GroupCount>, StoreError>> + Send;
}

pub type Db = Arc<RwLock<HashMap<Uuid, Todo>>>;

/// `TodoStore` over a shared in-process map. Cloning shares the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    db: Db,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoStore for MemoryStore {
    async fn find(&self, filter: &Filter, sort: SortSpec) -> Result<Vec<Todo>, StoreError> {
        let todos = self.db.read().await;
        let mut found: Vec<Todo> = todos.values().filter(|t| filter.matches(t)).cloned().collect();
        found.sort_by(|a, b| sort.compare(a, b));
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.db.read().await.get(&id).cloned())
    }

    async fn insert(&self, draft: NewTodo, now: DateTime<Utc>) -> Result<Todo, StoreError> {
        let todo = Todo::from_draft(Uuid::new_v4(), draft, now);
        self.db.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.db.write().await;
        Ok(todos.get_mut(&id).map(|todo| {
            todo.apply(patch, now);
            todo.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.db.write().await.remove(&id).is_some())
    }

    async fn count(&self, filter: &Filter) -> Result<usize, StoreError> {
        Ok(self.db.read().await.values().filter(|t| filter.matches(t)).count())
    }

    async fn group_by(&self, field: GroupField) -> Result<Vec<GroupCount>, StoreError> {
        let todos = self.db.read().await;
        let mut groups: HashMap<String, u64> = HashMap::new();
        for todo in todos.values() {
            *groups.entry(field.key_of(todo)).or_default() += 1;
        }
        Ok(groups
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortField, SortOrder};
    use crate::types::Priority;

    fn draft(text: &str, category: &str) -> NewTodo {
        NewTodo {
            text: text.to_string(),
            priority: Priority::Medium,
            due_date: None,
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_unique_ids_and_timestamps() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let a = store.insert(draft("a", "general"), now).await.unwrap();
        let b = store.insert(draft("b", "general"), now).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
        assert_eq!(a.created_at, now);
        assert_eq!(a.updated_at, now);
    }

    #[tokio::test]
    async fn find_sorts_by_requested_field() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for text in ["b", "c", "a"] {
            store.insert(draft(text, "general"), now).await.unwrap();
        }
        let sort = SortSpec {
            field: SortField::Text,
            order: SortOrder::Asc,
        };
        let texts: Vec<String> = store
            .find(&Filter::default(), sort)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let updated = store
            .update_by_id(id, &TodoPatch::completed(true), Utc::now())
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete_by_id(id).await.unwrap());
    }

    #[tokio::test]
    async fn group_by_counts_each_distinct_value() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for category in ["work", "home", "work"] {
            store.insert(draft("x", category), now).await.unwrap();
        }
        let mut groups = store.group_by(GroupField::Category).await.unwrap();
        groups.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(
            groups,
            [
                GroupCount { key: "home".into(), count: 1 },
                GroupCount { key: "work".into(), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.insert(draft("x", "general"), Utc::now()).await.unwrap();
        assert_eq!(other.count(&Filter::default()).await.unwrap(), 1);
    }
}
