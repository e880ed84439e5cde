//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::ListParams;
use crate::service::TodoList;
use crate::stats::Stats;
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self, params: &ListParams) -> Result<HttpRequest, ApiError> {
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut path = format!("{}/api/todos", self.base_url);
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }
        Ok(self.request(HttpMethod::Get, path))
    }

    pub fn build_get_todo(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Get, self.todo_path(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, format!("{}/api/todos", self.base_url), input)
    }

    pub fn build_update_todo(&self, id: Uuid, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, self.todo_path(id), input)
    }

    pub fn build_toggle_todo(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Patch, format!("{}/toggle", self.todo_path(id)))
    }

    pub fn build_delete_todo(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Delete, self.todo_path(id))
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("{}/api/todos/stats/overview", self.base_url),
        )
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoList, ApiError> {
        check_status(&response, 200)?;
        let envelope: Envelope<Vec<Todo>> = decode(&response.body)?;
        let data = envelope
            .data
            .ok_or_else(|| ApiError::DeserializationError("missing `data`".to_string()))?;
        Ok(TodoList {
            count: envelope.count.unwrap_or(data.len()),
            data,
        })
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)?;
        Ok(())
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<Stats, ApiError> {
        parse_data(response, 200)
    }

    fn todo_path(&self, id: Uuid) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_data<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    let envelope: Envelope<T> = decode(&response.body)?;
    envelope
        .data
        .ok_or_else(|| ApiError::DeserializationError("missing `data`".to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(&response.body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| response.body.clone());
    Err(ApiError::HttpError {
        status: response.status,
        message,
    })
}
