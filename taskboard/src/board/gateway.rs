//! Persistence gateway abstraction.
//!
//! The board store talks to durable storage only through this trait, so
//! tests can substitute an in-memory gateway (including one that fails on
//! demand) for the HTTP implementation in [`crate::net`].

use taskboard_proto::api::{CreateTaskRequest, UpdateTaskRequest};
use taskboard_proto::reorder::Assignment;
use taskboard_proto::task::{Task, TaskId};
use thiserror::Error;

/// Errors reported by a persistence gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never reached the server, or the response never arrived.
    /// Retryable from the caller's point of view.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server rejected the request.
    #[error("request rejected ({code}): {message}")]
    Rejected {
        /// Machine-readable error code from the response envelope.
        code: String,
        /// Human-readable message from the response envelope.
        message: String,
    },
    /// The server responded with something that is not a valid envelope.
    #[error("malformed server response: {0}")]
    BadResponse(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed without changes.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// The persistence operations the board store depends on.
///
/// `persist_assignments` must be atomic on the server side: either the whole
/// batch is durably applied or none of it is. The store's rollback protocol
/// relies on that.
pub trait TaskGateway {
    /// Fetches the full task list for a project, in canonical order.
    fn fetch_tasks(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Vec<Task>, GatewayError>> + Send;

    /// Persists a batch of assignments as one atomic unit.
    fn persist_assignments(
        &self,
        project_id: &str,
        assignments: &[Assignment],
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Creates a task and returns the stored record.
    fn create_task(
        &self,
        project_id: &str,
        req: &CreateTaskRequest,
    ) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// Applies a partial update to a task and returns the stored record.
    fn update_task(
        &self,
        project_id: &str,
        task_id: &TaskId,
        req: &UpdateTaskRequest,
    ) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// Deletes a task.
    fn delete_task(
        &self,
        project_id: &str,
        task_id: &TaskId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
