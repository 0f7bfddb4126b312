//! The board state container and optimistic update controller.
//!
//! [`BoardStore`] owns the client-held task collection for one project and
//! is the single writer to it. Reorders are applied locally before the
//! persistence call so the UI feels instantaneous; if persistence fails the
//! store re-converges to server truth, so the visible state is never left
//! diverged beyond one round trip.

use taskboard_proto::api::{CreateTaskRequest, UpdateTaskRequest};
use taskboard_proto::ordering::column_sequence;
use taskboard_proto::reorder::{Assignment, MoveIntent};
use taskboard_proto::task::{ColumnId, MAX_TASK_TITLE_LENGTH, Task, TaskId};

use super::gateway::TaskGateway;
use super::{BoardError, planner};

/// Merges an assignment batch into a task list by task id.
///
/// Unaffected tasks retain their prior values; assignments referencing ids
/// not present in the list are ignored.
pub fn apply_assignments(tasks: &mut [Task], assignments: &[Assignment]) {
    for assignment in assignments {
        if let Some(task) = tasks.iter_mut().find(|t| t.id == assignment.id) {
            task.status = assignment.status;
            task.order = assignment.order;
        }
    }
}

/// Client-held board state for a single project.
///
/// Presentation layers hold one of these per open board and read the task
/// collection through [`tasks`](Self::tasks) / [`tasks_by_status`](Self::tasks_by_status).
/// All mutations flow through the gateway; the store keeps the local
/// collection consistent with each call's outcome.
pub struct BoardStore<G> {
    gateway: G,
    project_id: String,
    tasks: Vec<Task>,
}

impl<G: TaskGateway> BoardStore<G> {
    /// Creates an empty store for a project. Call [`hydrate`](Self::hydrate)
    /// to load the task list.
    pub fn new(gateway: G, project_id: impl Into<String>) -> Self {
        Self {
            gateway,
            project_id: project_id.into(),
            tasks: Vec::new(),
        }
    }

    /// The project this store is bound to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The current client-held task collection.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The derived sequence of one column, per the ordering model.
    #[must_use]
    pub fn tasks_by_status(&self, column: ColumnId) -> Vec<&Task> {
        column_sequence(&self.tasks, column)
    }

    /// Replaces the local collection with a fresh fetch from the server.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Gateway`] if the fetch fails; the local
    /// collection is left untouched in that case.
    pub async fn hydrate(&mut self) -> Result<(), BoardError> {
        let fresh = self.gateway.fetch_tasks(&self.project_id).await?;
        self.tasks = fresh;
        Ok(())
    }

    /// Plans a move against the current local state without applying it.
    #[must_use]
    pub fn plan_move(&self, intent: &MoveIntent) -> Vec<Assignment> {
        planner::plan_move(intent, &self.tasks)
    }

    /// Plans, optimistically applies, and persists a move.
    ///
    /// An empty plan (no-op move, stale intent) returns the current state
    /// without any persistence call. Otherwise the plan is applied locally
    /// first, then persisted; on failure the store re-fetches the project's
    /// tasks to re-converge to server truth, falling back to the pre-move
    /// snapshot if the re-fetch itself fails, and the error is surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Gateway`] when persistence fails. The returned
    /// state is never the failed optimistic one.
    pub async fn submit_move(&mut self, intent: &MoveIntent) -> Result<&[Task], BoardError> {
        let plan = planner::plan_move(intent, &self.tasks);
        if plan.is_empty() {
            return Ok(&self.tasks);
        }

        let snapshot = self.tasks.clone();
        apply_assignments(&mut self.tasks, &plan);

        match self
            .gateway
            .persist_assignments(&self.project_id, &plan)
            .await
        {
            Ok(()) => Ok(&self.tasks),
            Err(e) => {
                tracing::warn!(
                    project_id = %self.project_id,
                    error = %e,
                    "reorder persistence failed, rolling back"
                );
                match self.gateway.fetch_tasks(&self.project_id).await {
                    Ok(fresh) => self.tasks = fresh,
                    Err(fetch_err) => {
                        tracing::warn!(
                            project_id = %self.project_id,
                            error = %fetch_err,
                            "rollback re-fetch failed, restoring snapshot"
                        );
                        self.tasks = snapshot;
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Creates a task at the end of its target column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TitleEmpty`] or [`BoardError::TitleTooLong`]
    /// before any network call, or [`BoardError::Gateway`] if persistence
    /// fails.
    pub async fn create_task(&mut self, req: &CreateTaskRequest) -> Result<Task, BoardError> {
        if req.title.is_empty() {
            return Err(BoardError::TitleEmpty);
        }
        if req.title.chars().count() > MAX_TASK_TITLE_LENGTH {
            return Err(BoardError::TitleTooLong);
        }
        let task = self.gateway.create_task(&self.project_id, req).await?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Applies a partial edit to a task.
    ///
    /// A status change through this path deliberately does not renumber
    /// column siblings; reordering goes through [`submit_move`](Self::submit_move).
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Gateway`] if the update fails; local state is
    /// only touched on success.
    pub async fn update_task(
        &mut self,
        task_id: &TaskId,
        req: &UpdateTaskRequest,
    ) -> Result<Task, BoardError> {
        let updated = self
            .gateway
            .update_task(&self.project_id, task_id, req)
            .await?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *task_id) {
            *task = updated.clone();
        }
        Ok(updated)
    }

    /// Deletes a task. Remaining siblings keep their order values; gaps in
    /// the ranking are fine.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Gateway`] if the deletion fails; local state is
    /// only touched on success.
    pub async fn delete_task(&mut self, task_id: &TaskId) -> Result<(), BoardError> {
        self.gateway.delete_task(&self.project_id, task_id).await?;
        self.tasks.retain(|t| t.id != *task_id);
        Ok(())
    }
}
