//! Core task model for `TaskBoard`.
//!
//! Defines task identity, the closed column enumeration shared by client
//! and server, and the [`Task`] record itself. Positions within a column
//! are ranking keys, not array indexes — see [`crate::ordering`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a `TaskId` from its string form, if it is a valid UUID.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an unknown column identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column: {0}")]
pub struct UnknownColumn(pub String);

/// One of the board's fixed status lanes.
///
/// The column set is a closed enumeration shared by the client planner and
/// the server gateway; a task's `status` is always one of these. The board
/// schema order is given by [`ColumnId::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    /// Not yet started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl ColumnId {
    /// All columns in board display order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// The column new tasks land in when none is requested.
    pub const DEFAULT: Self = Self::Todo;

    /// Returns the canonical string identifier for this column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ColumnId {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(UnknownColumn(other.to_string())),
        }
    }
}

/// A task on the board.
///
/// `order` is a non-negative ranking key giving the task's position within
/// its status column. It is not required to be unique or contiguous; display
/// order is always derived by sorting (see [`crate::ordering`]), never by
/// indexing with the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Project this task belongs to.
    pub project_id: String,
    /// Task title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Column the task currently sits in.
    pub status: ColumnId,
    /// Ranking key within the status column.
    pub order: u32,
    /// Optional assignee user id.
    pub assignee: Option<String>,
    /// Optional due timestamp (milliseconds since epoch).
    pub due_at: Option<u64>,
    /// When this task was created (milliseconds since epoch).
    pub created_at: u64,
    /// User id of the task's creator.
    pub created_by: String,
}
