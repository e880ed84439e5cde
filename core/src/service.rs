//! CRUD operations over a `TodoStore`.
//!
//! # Design
//! `TodoService` holds no state of its own beyond the store handle; every
//! call is an independent unit of work. Ids arrive as strings straight from
//! the transport and are parsed here, so a malformed id and a missing record
//! both come back as not-found errors.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TodoError;
use crate::query::{build_query, ListParams};
use crate::stats::{compute_stats, Stats};
use crate::store::TodoStore;
use crate::types::{CreateTodo, Todo, TodoPatch, UpdateTodo};
use crate::validation::{validate_create, validate_update};

/// Result of a list query: the matching todos plus their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub count: usize,
    pub data: Vec<Todo>,
}

#[derive(Debug, Clone)]
pub struct TodoService<S> {
    store: S,
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        let draft = validate_create(input)?;
        let todo = self.store.insert(draft, Utc::now()).await?;
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        self.store.find_by_id(id).await?.ok_or(TodoError::NotFound)
    }

    pub async fn list(&self, params: &ListParams) -> Result<TodoList, TodoError> {
        let query = build_query(params)?;
        let data = self.store.find(&query.filter, query.sort).await?;
        tracing::debug!(count = data.len(), ?query, "todos listed");
        Ok(TodoList {
            count: data.len(),
            data,
        })
    }

    pub async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        let patch = validate_update(input)?;
        let todo = self
            .store
            .update_by_id(id, &patch, Utc::now())
            .await?
            .ok_or(TodoError::NotFound)?;
        tracing::debug!(%id, "todo updated");
        Ok(todo)
    }

    /// Flip `completed`. Two concurrent toggles may both read the same
    /// starting value; the last write wins.
    pub async fn toggle_complete(&self, id: &str) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        let current = self.store.find_by_id(id).await?.ok_or(TodoError::NotFound)?;
        let todo = self
            .store
            .update_by_id(id, &TodoPatch::completed(!current.completed), Utc::now())
            .await?
            .ok_or(TodoError::NotFound)?;
        tracing::debug!(%id, completed = todo.completed, "todo toggled");
        Ok(todo)
    }

    pub async fn delete(&self, id: &str) -> Result<(), TodoError> {
        let id = parse_id(id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(TodoError::NotFound);
        }
        tracing::debug!(%id, "todo deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<Stats, TodoError> {
        Ok(compute_stats(&self.store).await?)
    }
}

fn parse_id(raw: &str) -> Result<Uuid, TodoError> {
    Uuid::parse_str(raw).map_err(|_| TodoError::MalformedIdentifier(raw.to_string()))
}
