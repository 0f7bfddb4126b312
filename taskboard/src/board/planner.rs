//! The reorder planner.
//!
//! Translates a [`MoveIntent`] plus the full current task set into a batch
//! of [`Assignment`] values: one per task in the post-move destination
//! sequence, and — for cross-column moves — one per remaining source-column
//! task, closing the gap left behind. Positions are always derived through
//! the ordering model, never from raw `order` values.

use std::collections::HashMap;

use taskboard_proto::ordering::column_sequence;
use taskboard_proto::reorder::{Assignment, MoveIntent, Placement};
use taskboard_proto::task::{Task, TaskId};

/// Computes the assignment batch realizing a move intent.
///
/// Pure and side-effect free. Malformed intents never error:
/// - an unknown moved task id yields an empty plan (stale client views are
///   legitimate);
/// - an anchor that is not in the destination column falls back to the end
///   position — the explicit destination column wins over the anchor's
///   actual column;
/// - a raw index is clamped to the valid range.
///
/// If the resolved plan would leave every task at its current
/// `(status, order)`, an empty batch is returned and no persistence call
/// is warranted.
#[must_use]
pub fn plan_move(intent: &MoveIntent, tasks: &[Task]) -> Vec<Assignment> {
    let Some(moved) = tasks.iter().find(|t| t.id == intent.task_id) else {
        return Vec::new();
    };
    let source_status = moved.status;
    let dest_status = intent.dest;

    // Dropping a task onto itself within its own column is a no-move.
    if let Placement::Before(anchor) = &intent.placement
        && *anchor == moved.id
        && source_status == dest_status
    {
        return Vec::new();
    }

    let mut dest_sequence: Vec<&Task> = column_sequence(tasks, dest_status)
        .into_iter()
        .filter(|t| t.id != moved.id)
        .collect();

    let insert_at = match &intent.placement {
        Placement::Before(anchor) => dest_sequence
            .iter()
            .position(|t| t.id == *anchor)
            .unwrap_or(dest_sequence.len()),
        Placement::Index(index) => (*index).min(dest_sequence.len()),
    };
    dest_sequence.insert(insert_at, moved);

    let mut plan: Vec<Assignment> = dest_sequence
        .iter()
        .enumerate()
        .map(|(pos, task)| Assignment {
            id: task.id.clone(),
            status: dest_status,
            order: position_key(pos),
        })
        .collect();

    if source_status != dest_status {
        let source_sequence: Vec<&Task> = column_sequence(tasks, source_status)
            .into_iter()
            .filter(|t| t.id != moved.id)
            .collect();
        plan.extend(source_sequence.iter().enumerate().map(|(pos, task)| {
            Assignment {
                id: task.id.clone(),
                status: source_status,
                order: position_key(pos),
            }
        }));
    }

    if is_identity(&plan, tasks) {
        return Vec::new();
    }
    plan
}

/// Converts a 0-based sequence position into an order ranking key.
fn position_key(pos: usize) -> u32 {
    u32::try_from(pos).unwrap_or(u32::MAX)
}

/// Whether every assignment matches its task's current `(status, order)`.
fn is_identity(plan: &[Assignment], tasks: &[Task]) -> bool {
    let by_id: HashMap<&TaskId, &Task> = tasks.iter().map(|t| (&t.id, t)).collect();
    plan.iter().all(|a| {
        by_id
            .get(&a.id)
            .is_some_and(|t| t.status == a.status && t.order == a.order)
    })
}
