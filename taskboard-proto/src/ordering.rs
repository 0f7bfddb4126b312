//! Column ordering model.
//!
//! A task's position within its column is derived from `(order, created_at,
//! id)` ascending. `order` values are not unique — concurrent creators and
//! historical renumbering both produce ties — so the secondary keys make the
//! derived sequence deterministic. Consumers always sort; nothing in the
//! system indexes directly by `order` value.

use crate::task::{ColumnId, Task};

/// The sort key that totally orders tasks within a column.
///
/// Ties on `order` are broken by creation time, then by id, so two tasks
/// sharing an `order` value still render in a stable sequence everywhere.
#[must_use]
pub fn sort_key(task: &Task) -> (u32, u64, uuid::Uuid) {
    (task.order, task.created_at, *task.id.as_uuid())
}

/// Derives a column's displayed sequence from the full task set.
///
/// Filters to tasks in `column` and sorts them by [`sort_key`].
#[must_use]
pub fn column_sequence(tasks: &[Task], column: ColumnId) -> Vec<&Task> {
    let mut seq: Vec<&Task> = tasks.iter().filter(|t| t.status == column).collect();
    seq.sort_by_key(|t| sort_key(t));
    seq
}

/// Sorts a full task list in place by `(status, order, created_at, id)`.
///
/// Gives the canonical listing order used by the server when returning a
/// project's tasks.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| {
        let (order, created_at, id) = sort_key(t);
        (t.status as u8, order, created_at, id)
    });
}

/// Returns the ranking key for a task appended to the end of `column`.
///
/// One past the current maximum `order` in the column, or 0 if the column
/// is empty. Monotonically increasing per column at creation time.
#[must_use]
pub fn next_order(tasks: &[Task], column: ColumnId) -> u32 {
    tasks
        .iter()
        .filter(|t| t.status == column)
        .map(|t| t.order)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}
