//! Reorder wire types: move intents, assignments, and payload normalization.
//!
//! An [`Assignment`] is the unit of persistence — one `(task, status, order)`
//! write instruction. The client planner produces a batch of them; the server
//! applies the batch atomically. Incoming payloads are loosely typed
//! ([`RawAssignment`]) and are coerced into strict [`Assignment`] values at
//! the gateway boundary — field types from the caller are never trusted.

use serde::{Deserialize, Serialize};

use crate::task::{ColumnId, TaskId};

/// Where a moved task should be inserted within the destination column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Insert at this index among the destination column's tasks (after
    /// removal of the moved task). Clamped to the valid range.
    Index(usize),
    /// Insert immediately before this task. If the anchor is not in the
    /// destination column, the task is appended to the end instead.
    Before(TaskId),
}

/// An ephemeral description of a requested reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    /// The task being moved.
    pub task_id: TaskId,
    /// The column the task should end up in.
    pub dest: ColumnId,
    /// Where in the destination column it should land.
    pub placement: Placement,
}

/// A concrete `(task, status, order)` write instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The task to update.
    pub id: TaskId,
    /// The column the task is assigned to.
    pub status: ColumnId,
    /// The task's new ranking key within `status`.
    pub order: u32,
}

/// A single loosely-typed entry of an incoming reorder payload.
///
/// `status` and `order` are raw JSON values because the caller's types are
/// not trusted; [`normalize_batch`] coerces them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAssignment {
    /// Task id as sent by the caller. Entries without an id are a
    /// structural error.
    pub id: Option<String>,
    /// Status as sent by the caller, any JSON type.
    pub status: Option<serde_json::Value>,
    /// Order as sent by the caller, any JSON type.
    pub order: Option<serde_json::Value>,
}

impl From<&Assignment> for RawAssignment {
    fn from(a: &Assignment) -> Self {
        Self {
            id: Some(a.id.to_string()),
            status: Some(serde_json::Value::String(a.status.to_string())),
            order: Some(serde_json::Value::from(a.order)),
        }
    }
}

/// Body of a reorder request: the full batch of assignments to persist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorderRequest {
    /// Entries to apply, in no particular order.
    pub tasks: Vec<RawAssignment>,
}

impl ReorderRequest {
    /// Builds a well-typed reorder request from planner output.
    #[must_use]
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        Self {
            tasks: assignments.iter().map(RawAssignment::from).collect(),
        }
    }
}

/// Structural errors in a reorder payload.
///
/// These reject the whole batch before any write; they are distinct from
/// entries that merely reference unknown tasks or columns, which are
/// silently dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderPayloadError {
    /// An entry had no task id at all.
    #[error("reorder entry is missing a task id")]
    EntryMissingId,
}

/// Coerces a raw batch into strict [`Assignment`] values.
///
/// Rules, per entry:
/// - A missing id rejects the whole batch ([`ReorderPayloadError::EntryMissingId`]).
/// - An id that is not a valid task id is dropped — indistinguishable, from
///   the server's point of view, from a task that no longer exists.
/// - `status` is coerced to a string and parsed against the closed column
///   set; entries naming an unknown column are dropped.
/// - `order` is coerced to a finite non-negative integer, defaulting to 0.
///
/// # Errors
///
/// Returns [`ReorderPayloadError`] only for structural problems; an output
/// batch smaller than the input (or empty) is not an error.
pub fn normalize_batch(raw: &[RawAssignment]) -> Result<Vec<Assignment>, ReorderPayloadError> {
    let mut out = Vec::with_capacity(raw.len());
    for entry in raw {
        let Some(id_str) = entry.id.as_deref() else {
            return Err(ReorderPayloadError::EntryMissingId);
        };
        let Some(id) = TaskId::parse(id_str) else {
            continue;
        };
        let Some(status) = coerce_status(entry.status.as_ref()) else {
            continue;
        };
        out.push(Assignment {
            id,
            status,
            order: coerce_order(entry.order.as_ref()),
        });
    }
    Ok(out)
}

/// Coerces a raw status value to a string and parses it as a column.
fn coerce_status(value: Option<&serde_json::Value>) -> Option<ColumnId> {
    let text = match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };
    text.parse().ok()
}

/// Coerces a raw order value to a finite non-negative integer, default 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_order(value: Option<&serde_json::Value>) -> u32 {
    let Some(n) = value.and_then(serde_json::Value::as_f64) else {
        return 0;
    };
    if n.is_finite() && n > 0.0 {
        // Safe: clamped to u32 range before truncation.
        n.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
