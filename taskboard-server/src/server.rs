//! Board server core: shared state, route handlers, and server startup.
//!
//! Every task route authorizes the caller against the project registry
//! before touching the task store. Session authentication is an external
//! concern; the authenticated user id arrives in the `x-user-id` header.
//! Non-members are answered with the same "project not found" shape as
//! missing projects, so membership is not probeable.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use serde::Serialize;
use taskboard_proto::api::{
    AddMemberRequest, ApiResponse, CreateProjectRequest, CreateTaskRequest, UpdateTaskRequest,
};
use taskboard_proto::project::{MemberInfo, ProjectInfo, Role};
use taskboard_proto::reorder::{ReorderRequest, normalize_batch};
use taskboard_proto::task::TaskId;

use crate::projects::{ProjectError, ProjectRegistry};
use crate::store::{StoreError, TaskStore};

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Default maximum number of entries accepted in one reorder batch.
const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Shared server state holding the task store and project registry.
pub struct ServerState {
    /// Per-project task collections.
    pub store: TaskStore,
    /// Project directory and memberships.
    pub projects: ProjectRegistry,
    /// Maximum number of entries accepted in one reorder batch.
    max_batch_size: usize,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates server state with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: TaskStore::new(),
            projects: ProjectRegistry::new(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Creates server state with a custom reorder batch size limit.
    #[must_use]
    pub fn with_config(max_batch_size: usize) -> Self {
        Self {
            store: TaskStore::new(),
            projects: ProjectRegistry::new(),
            max_batch_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn ok_data<T: Serialize>(data: T, message: &str) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data, message))).into_response()
}

fn created<T: Serialize>(data: T, message: &str) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::ok(data, message))).into_response()
}

fn ok_empty(message: &str) -> Response {
    (StatusCode::OK, Json(ApiResponse::<()>::ok_empty(message))).into_response()
}

fn reject(status: StatusCode, message: &str, code: &str) -> Response {
    (status, Json(ApiResponse::<()>::error(message, code))).into_response()
}

fn store_error_response(err: &StoreError) -> Response {
    match err {
        StoreError::TitleEmpty | StoreError::TitleTooLong => {
            reject(StatusCode::BAD_REQUEST, &err.to_string(), "VALIDATION_ERROR")
        }
        StoreError::TaskNotFound(_) => {
            reject(StatusCode::NOT_FOUND, "Task not found", "NOT_FOUND")
        }
        StoreError::CommitFailed => reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Reorder could not be applied",
            "TRANSACTION_FAILED",
        ),
    }
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

/// Extracts the authenticated caller id from request headers.
fn caller(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Resolves the caller and checks project membership.
///
/// Missing identity is 401; a non-member gets the same 404 as a missing
/// project.
async fn authorize(
    state: &ServerState,
    headers: &HeaderMap,
    project_id: &str,
) -> Result<String, Response> {
    let Some(user_id) = caller(headers) else {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
            "UNAUTHORIZED",
        ));
    };
    if state.projects.is_member(project_id, &user_id).await {
        Ok(user_id)
    } else {
        Err(reject(
            StatusCode::NOT_FOUND,
            "Project not found",
            "NOT_FOUND",
        ))
    }
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

async fn list_tasks(
    Path(project_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, &project_id).await {
        return resp;
    }
    let tasks = state.store.list(&project_id).await;
    ok_data(tasks, "Tasks retrieved successfully")
}

async fn create_task(
    Path(project_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Response {
    let user_id = match authorize(&state, &headers, &project_id).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let Ok(Json(req)) = payload else {
        return reject(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            "VALIDATION_ERROR",
        );
    };
    match state.store.create(&project_id, &user_id, &req).await {
        Ok(task) => {
            tracing::info!(project_id = %project_id, task_id = %task.id, "task created");
            created(task, "Task created successfully")
        }
        Err(e) => store_error_response(&e),
    }
}

async fn update_task(
    Path((project_id, task_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, &project_id).await {
        return resp;
    }
    let Some(task_id) = TaskId::parse(&task_id) else {
        return reject(StatusCode::NOT_FOUND, "Task not found", "NOT_FOUND");
    };
    let Ok(Json(req)) = payload else {
        return reject(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            "VALIDATION_ERROR",
        );
    };
    match state.store.update(&project_id, &task_id, &req).await {
        Ok(task) => ok_data(task, "Task updated successfully"),
        Err(e) => store_error_response(&e),
    }
}

async fn delete_task(
    Path((project_id, task_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let user_id = match authorize(&state, &headers, &project_id).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let Some(task_id) = TaskId::parse(&task_id) else {
        return reject(StatusCode::NOT_FOUND, "Task not found", "NOT_FOUND");
    };
    let Some(task) = state.store.get(&project_id, &task_id).await else {
        return reject(StatusCode::NOT_FOUND, "Task not found", "NOT_FOUND");
    };

    let role = state.projects.member_role(&project_id, &user_id).await;
    let can_delete =
        role.is_some_and(Role::can_delete_any_task) || task.created_by == user_id;
    if !can_delete {
        return reject(
            StatusCode::FORBIDDEN,
            "Insufficient permissions to delete task",
            "FORBIDDEN",
        );
    }

    match state.store.remove(&project_id, &task_id).await {
        Ok(()) => ok_empty("Task deleted successfully"),
        Err(e) => store_error_response(&e),
    }
}

async fn reorder_tasks(
    Path(project_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, &project_id).await {
        return resp;
    }
    let Ok(Json(req)) = payload else {
        return reject(
            StatusCode::BAD_REQUEST,
            "Tasks must be an array",
            "VALIDATION_ERROR",
        );
    };
    if req.tasks.len() > state.max_batch_size {
        return reject(
            StatusCode::BAD_REQUEST,
            "Too many reorder entries",
            "VALIDATION_ERROR",
        );
    }

    let assignments = match normalize_batch(&req.tasks) {
        Ok(batch) => batch,
        Err(e) => {
            return reject(StatusCode::BAD_REQUEST, &e.to_string(), "VALIDATION_ERROR");
        }
    };
    if assignments.is_empty() {
        return ok_empty("Nothing to reorder");
    }

    match state.store.apply_assignments(&project_id, &assignments).await {
        Ok(0) => ok_empty("No matching tasks to update"),
        Ok(applied) => {
            tracing::info!(
                project_id = %project_id,
                applied,
                submitted = req.tasks.len(),
                "reorder batch applied"
            );
            ok_empty("Tasks reordered successfully")
        }
        Err(e) => {
            tracing::warn!(project_id = %project_id, error = %e, "reorder batch failed");
            store_error_response(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// Project handlers
// ---------------------------------------------------------------------------

async fn list_projects(headers: HeaderMap, State(state): State<Arc<ServerState>>) -> Response {
    let Some(user_id) = caller(&headers) else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
            "UNAUTHORIZED",
        );
    };
    let projects = state.projects.list_for(&user_id).await;
    ok_data(projects, "Projects retrieved successfully")
}

async fn create_project(
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Response {
    let Some(user_id) = caller(&headers) else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
            "UNAUTHORIZED",
        );
    };
    let Ok(Json(req)) = payload else {
        return reject(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            "VALIDATION_ERROR",
        );
    };
    if req.name.is_empty() {
        return reject(
            StatusCode::BAD_REQUEST,
            "Project name is required",
            "VALIDATION_ERROR",
        );
    }

    let project_id = uuid::Uuid::now_v7().to_string();
    match state.projects.register(&project_id, &req.name, &user_id).await {
        Ok(()) => {
            tracing::info!(project_id = %project_id, name = %req.name, "project created");
            created(
                ProjectInfo {
                    project_id,
                    name: req.name,
                    member_count: 1,
                },
                "Project created successfully",
            )
        }
        Err(e) => project_error_response(&e),
    }
}

async fn list_members(
    Path(project_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, &project_id).await {
        return resp;
    }
    match state.projects.members(&project_id).await {
        Ok(members) => ok_data(members, "Members retrieved successfully"),
        Err(e) => project_error_response(&e),
    }
}

async fn add_member(
    Path(project_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Response {
    let user_id = match authorize(&state, &headers, &project_id).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_member_management(&state, &project_id, &user_id).await {
        return resp;
    }
    let Ok(Json(req)) = payload else {
        return reject(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            "VALIDATION_ERROR",
        );
    };

    let role = req.role.unwrap_or(Role::Member);
    match state.projects.add_member(&project_id, &req.user_id, role).await {
        Ok(()) => created(
            MemberInfo {
                user_id: req.user_id,
                role,
            },
            "Member added successfully",
        ),
        Err(e) => project_error_response(&e),
    }
}

async fn remove_member(
    Path((project_id, member_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let user_id = match authorize(&state, &headers, &project_id).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_member_management(&state, &project_id, &user_id).await {
        return resp;
    }
    match state.projects.remove_member(&project_id, &member_id).await {
        Ok(()) => ok_empty("Member removed successfully"),
        Err(e) => project_error_response(&e),
    }
}

async fn require_member_management(
    state: &ServerState,
    project_id: &str,
    user_id: &str,
) -> Result<(), Response> {
    let role = state.projects.member_role(project_id, user_id).await;
    if role.is_some_and(Role::can_manage_members) {
        Ok(())
    } else {
        Err(reject(
            StatusCode::FORBIDDEN,
            "Insufficient permissions to manage members",
            "FORBIDDEN",
        ))
    }
}

fn project_error_response(err: &ProjectError) -> Response {
    match err {
        ProjectError::NameConflict | ProjectError::AlreadyMember => {
            reject(StatusCode::CONFLICT, &err.to_string(), "CONFLICT")
        }
        ProjectError::CapacityReached => reject(
            StatusCode::SERVICE_UNAVAILABLE,
            &err.to_string(),
            "REGISTRY_FULL",
        ),
        ProjectError::ProjectNotFound => {
            reject(StatusCode::NOT_FOUND, "Project not found", "NOT_FOUND")
        }
        ProjectError::NotMember => reject(StatusCode::NOT_FOUND, &err.to_string(), "NOT_FOUND"),
        ProjectError::CannotRemoveCreator => {
            reject(StatusCode::FORBIDDEN, &err.to_string(), "FORBIDDEN")
        }
    }
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Builds the router over the given state.
fn router(state: Arc<ServerState>) -> axum::Router {
    axum::Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{project_id}/members",
            get(list_members).post(add_member),
        )
        .route(
            "/api/projects/{project_id}/members/{member_id}",
            axum::routing::delete(remove_member),
        )
        .route("/api/tasks/{project_id}", get(list_tasks).post(create_task))
        .route("/api/tasks/{project_id}/reorder", put(reorder_tasks))
        .route(
            "/api/tasks/{project_id}/{task_id}",
            put(update_task).delete(delete_task),
        )
        .with_state(state)
}

/// Starts the board server on the given address and returns the bound
/// address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(ServerState::new())).await
}

/// Starts the board server with a pre-configured [`ServerState`].
///
/// Use [`ServerState::with_config`] to apply limits from the resolved
/// [`crate::config::ServerConfig`]. This is the primary entry point used by
/// both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "board server error");
        }
    });

    Ok((bound_addr, handle))
}
