//! Core of the todo service: entity rules, list queries, statistics and
//! CRUD operations, plus a host-does-IO client for the HTTP API.
//!
//! # Overview
//! `TodoService` composes the primitives of a `TodoStore` (find, insert,
//! update, delete, count, group-by) into the operations the transport
//! exposes. Validation and query construction are pure functions so they can
//! be exercised without any storage at all.
//!
//! # Design
//! - Request payloads are validated into `NewTodo` / `TodoPatch` before a
//!   store ever sees them.
//! - Partial updates use `Field<T>` so an omitted member and an explicit
//!   `null` are distinct.
//! - `TodoClient` is stateless and split into `build_*` / `parse_*`, so the
//!   I/O boundary is explicit.

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

pub use client::TodoClient;
pub use envelope::Envelope;
pub use error::{ApiError, StoreError, TodoError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{build_query, Filter, ListParams, Query, SortField, SortOrder, SortSpec};
pub use service::{TodoList, TodoService};
pub use stats::{compute_stats, GroupCount, GroupField, Stats};
pub use store::{MemoryStore, TodoStore};
pub use types::{CreateTodo, Field, NewTodo, Priority, Todo, TodoPatch, UpdateTodo};
