//! HTTP transport for the todo service.
//!
//! Routes map one-to-one onto `TodoService` operations and wrap every
//! result in the `{ success, message, data }` envelope.

pub mod config;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use todo_core::{
    CreateTodo, Envelope, ListParams, MemoryStore, Stats, Todo, TodoService, TodoStore, UpdateTodo,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, Op};

pub struct AppState<S> {
    pub service: Arc<TodoService<S>>,
    pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: Arc::clone(&self.config),
        }
    }
}

/// Router backed by a fresh in-memory store.
pub fn app(config: ServerConfig) -> Router {
    router(TodoService::new(MemoryStore::new()), config)
}

pub fn router<S: TodoStore>(service: TodoService<S>, config: ServerConfig) -> Router {
    let cors = cors_layer(&config.cors_origins);
    let state = AppState {
        service: Arc::new(service),
        config: Arc::new(config),
    };
    Router::new()
        .route("/", get(welcome))
        .route("/api", get(api_index))
        .route("/api/health", get(health::<S>))
        .route("/api/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route("/api/todos/stats/overview", get(todo_stats::<S>))
        .route(
            "/api/todos/{id}",
            get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>),
        )
        .route("/api/todos/{id}/toggle", patch(toggle_todo::<S>))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn list_todos<S: TodoStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Todo>>>, AppError> {
    let Query(params) = query?;
    let list = state.service.list(&params).await.map_err(AppError::on(Op::List))?;
    Ok(Json(Envelope::ok(list.data).with_count(list.count)))
}

async fn get_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let todo = state.service.get_by_id(&id).await.map_err(AppError::on(Op::Get))?;
    Ok(Json(Envelope::ok(todo)))
}

async fn create_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), AppError> {
    let Json(input) = payload?;
    let todo = state.service.create(input).await.map_err(AppError::on(Op::Create))?;
    tracing::info!(id = %todo.id, "created todo");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(todo).with_message("Todo created successfully")),
    ))
}

async fn update_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let Json(input) = payload?;
    let todo = state
        .service
        .update(&id, input)
        .await
        .map_err(AppError::on(Op::Update))?;
    Ok(Json(Envelope::ok(todo).with_message("Todo updated successfully")))
}

async fn toggle_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let todo = state
        .service
        .toggle_complete(&id)
        .await
        .map_err(AppError::on(Op::Toggle))?;
    let status = if todo.completed { "completed" } else { "incomplete" };
    Ok(Json(
        Envelope::ok(todo).with_message(format!("Todo marked as {status}")),
    ))
}

async fn delete_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, AppError> {
    state.service.delete(&id).await.map_err(AppError::on(Op::Delete))?;
    tracing::info!(%id, "deleted todo");
    Ok(Json(Envelope::done("Todo deleted successfully")))
}

async fn todo_stats<S: TodoStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Envelope<Stats>>, AppError> {
    let stats = state.service.stats().await.map_err(AppError::on(Op::Stats))?;
    Ok(Json(Envelope::ok(stats)))
}

async fn health<S: TodoStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    }))
}

/// Routes listed in the 404 body.
const ENDPOINTS: [&str; 9] = [
    "GET /api",
    "GET /api/health",
    "GET /api/todos",
    "POST /api/todos",
    "GET /api/todos/{id}",
    "PUT /api/todos/{id}",
    "PATCH /api/todos/{id}/toggle",
    "DELETE /api/todos/{id}",
    "GET /api/todos/stats/overview",
];

async fn welcome() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Welcome to the Todo API",
        "documentation": "Visit /api for available endpoints",
    }))
}

async fn api_index() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Todo API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /api/health",
            "todos": {
                "GET /api/todos": "List todos (completed, category, priority, search, sortBy, order)",
                "POST /api/todos": "Create todo",
                "GET /api/todos/{id}": "Get todo",
                "PUT /api/todos/{id}": "Update todo",
                "PATCH /api/todos/{id}/toggle": "Toggle todo status",
                "DELETE /api/todos/{id}": "Delete todo",
                "GET /api/todos/stats/overview": "Statistics",
            }
        }
    }))
}

/// Unknown paths and known paths hit with the wrong method.
async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": format!("Route {uri} not found"),
            "available_endpoints": ENDPOINTS,
        })),
    )
}
