//! In-memory task store with atomic batch application.
//!
//! Tasks are held per project behind an [`RwLock`]. Reorder batches are the
//! only multi-task write path: entries referencing tasks outside the project
//! are filtered out, and the surviving assignments are staged on a copy that
//! is swapped in only at commit, so a failed commit leaves stored state
//! untouched. The write lock makes the batch the sole serialization point
//! between racing reorder calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use taskboard_proto::api::{CreateTaskRequest, UpdateTaskRequest};
use taskboard_proto::ordering::sort_tasks;
use taskboard_proto::reorder::Assignment;
use taskboard_proto::task::{ColumnId, MAX_TASK_TITLE_LENGTH, Task, TaskId};
use tokio::sync::RwLock;

/// Errors that can occur during task store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max {MAX_TASK_TITLE_LENGTH} characters)")]
    TitleTooLong,
    /// Task with the given ID was not found in the project.
    #[error("task not found: {0}")]
    TaskNotFound(String),
    /// The batch commit failed; no assignment was applied.
    #[error("batch commit failed")]
    CommitFailed,
}

/// In-memory per-project task collection.
///
/// Thread-safe via [`RwLock`]. All writes to task `status`/`order` go
/// through either the single-task edit path or the atomic batch path.
pub struct TaskStore {
    /// Project id -> (Task id -> Task) mapping.
    tasks: RwLock<HashMap<String, HashMap<TaskId, Task>>>,
    /// When set, the next batch commit fails after staging. Lets tests
    /// exercise the rollback guarantee without a storage fault.
    fail_next_commit: AtomicBool,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates a new, empty task store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Returns the current timestamp in milliseconds since epoch.
    fn now_ms() -> u64 {
        u64::try_from(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
        )
        .unwrap_or(u64::MAX)
    }

    /// Returns a project's tasks in canonical listing order.
    ///
    /// Empty for unknown projects.
    pub async fn list(&self, project_id: &str) -> Vec<Task> {
        let projects = self.tasks.read().await;
        let mut out: Vec<Task> = projects
            .get(project_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        sort_tasks(&mut out);
        out
    }

    /// Returns a single task, if it belongs to the project.
    pub async fn get(&self, project_id: &str, task_id: &TaskId) -> Option<Task> {
        let projects = self.tasks.read().await;
        projects.get(project_id)?.get(task_id).cloned()
    }

    /// Creates a task at the end of its target column.
    ///
    /// The new task's `order` is one past the column's current maximum, so
    /// creation never displaces existing tasks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TitleEmpty`] or [`StoreError::TitleTooLong`].
    pub async fn create(
        &self,
        project_id: &str,
        created_by: &str,
        req: &CreateTaskRequest,
    ) -> Result<Task, StoreError> {
        if req.title.is_empty() {
            return Err(StoreError::TitleEmpty);
        }
        if req.title.chars().count() > MAX_TASK_TITLE_LENGTH {
            return Err(StoreError::TitleTooLong);
        }

        let status = req.status.unwrap_or(ColumnId::DEFAULT);
        let mut projects = self.tasks.write().await;
        let project_tasks = projects.entry(project_id.to_string()).or_default();
        let order = project_tasks
            .values()
            .filter(|t| t.status == status)
            .map(|t| t.order)
            .max()
            .map_or(0, |max| max.saturating_add(1));

        let task = Task {
            id: TaskId::new(),
            project_id: project_id.to_string(),
            title: req.title.clone(),
            description: req.description.clone(),
            status,
            order,
            assignee: req.assignee.clone(),
            due_at: req.due_at,
            created_at: Self::now_ms(),
            created_by: created_by.to_string(),
        };
        project_tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Applies a partial edit to a task, returning the updated record.
    ///
    /// A status change through this path does not renumber column siblings;
    /// the reorder batch is the only path that does.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if the task is not in the
    /// project, or a title validation error.
    pub async fn update(
        &self,
        project_id: &str,
        task_id: &TaskId,
        req: &UpdateTaskRequest,
    ) -> Result<Task, StoreError> {
        if let Some(title) = &req.title {
            if title.is_empty() {
                return Err(StoreError::TitleEmpty);
            }
            if title.chars().count() > MAX_TASK_TITLE_LENGTH {
                return Err(StoreError::TitleTooLong);
            }
        }

        let mut projects = self.tasks.write().await;
        let task = projects
            .get_mut(project_id)
            .and_then(|m| m.get_mut(task_id))
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;

        if let Some(title) = &req.title {
            task.title = title.clone();
        }
        if let Some(description) = &req.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = req.status {
            task.status = status;
        }
        if let Some(assignee) = &req.assignee {
            task.assignee = Some(assignee.clone());
        }
        if let Some(due_at) = req.due_at {
            task.due_at = Some(due_at);
        }
        Ok(task.clone())
    }

    /// Deletes a task. Remaining siblings keep their order values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if the task is not in the
    /// project.
    pub async fn remove(&self, project_id: &str, task_id: &TaskId) -> Result<(), StoreError> {
        let mut projects = self.tasks.write().await;
        projects
            .get_mut(project_id)
            .and_then(|m| m.remove(task_id))
            .map(|_| ())
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))
    }

    /// Applies an assignment batch as one atomic unit.
    ///
    /// Entries referencing tasks that do not belong to the project are
    /// silently dropped — the client's optimistic view may be ahead of a
    /// racing deletion. Returns the number of assignments applied; 0 (with
    /// success) when nothing in the batch was persistable.
    ///
    /// All surviving assignments are staged on a copy of the project's task
    /// map and swapped in at commit, under the write lock. Either the whole
    /// batch lands or none of it does.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CommitFailed`] if the commit fails; stored
    /// state is unchanged in that case.
    pub async fn apply_assignments(
        &self,
        project_id: &str,
        assignments: &[Assignment],
    ) -> Result<usize, StoreError> {
        let mut projects = self.tasks.write().await;
        let Some(project_tasks) = projects.get_mut(project_id) else {
            return Ok(0);
        };

        let applicable: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| project_tasks.contains_key(&a.id))
            .collect();
        if applicable.is_empty() {
            return Ok(0);
        }

        let mut staged = project_tasks.clone();
        for assignment in &applicable {
            if let Some(task) = staged.get_mut(&assignment.id) {
                task.status = assignment.status;
                task.order = assignment.order;
            }
        }

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            tracing::warn!(project_id = %project_id, "induced batch commit failure");
            return Err(StoreError::CommitFailed);
        }

        *project_tasks = staged;
        Ok(applicable.len())
    }

    /// Forces the next batch commit to fail. Used to exercise rollback
    /// paths in tests.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}
