//! HTTP API envelope and request bodies.
//!
//! Every response carries the same envelope: `success` plus either `data`
//! or a human-readable `message` with a machine-readable `code`. The client
//! gateway deserializes the same types the server handlers serialize.

use serde::{Deserialize, Serialize};

use crate::project::Role;
use crate::task::ColumnId;

/// The uniform response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Payload on success; may be absent for operations with no result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable outcome description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Builds a success envelope with a payload.
    #[must_use]
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
            code: None,
        }
    }

    /// Builds a success envelope with no payload.
    #[must_use]
    pub fn ok_empty(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
            code: None,
        }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn error(message: &str, code: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            code: Some(code.to_string()),
        }
    }
}

/// Body of `POST /api/tasks/{project_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTaskRequest {
    /// Task title (required, non-empty).
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Target column; defaults to the board's first column.
    pub status: Option<ColumnId>,
    /// Optional assignee user id.
    pub assignee: Option<String>,
    /// Optional due timestamp (milliseconds since epoch).
    pub due_at: Option<u64>,
}

/// Body of `PUT /api/tasks/{project_id}/{task_id}`.
///
/// All fields optional; absent fields are left unchanged. A status change
/// through this route does not renumber column siblings — reordering goes
/// through the reorder route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status column.
    pub status: Option<ColumnId>,
    /// New assignee user id.
    pub assignee: Option<String>,
    /// New due timestamp (milliseconds since epoch).
    pub due_at: Option<u64>,
}

/// Body of `POST /api/projects`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProjectRequest {
    /// Human-readable project name.
    pub name: String,
}

/// Body of `POST /api/projects/{project_id}/members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
    /// User id of the member to add.
    pub user_id: String,
    /// Role to grant; defaults to [`Role::Member`].
    #[serde(default)]
    pub role: Option<Role>,
}
