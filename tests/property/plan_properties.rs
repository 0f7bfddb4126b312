//! Property-based tests for the reorder planner.
//!
//! Uses proptest to verify, for arbitrary boards and move intents:
//! 1. Applying a plan leaves the destination column contiguously numbered
//!    from zero.
//! 2. Plans only ever reference tasks that exist on the board.
//! 3. The moved task lands at the requested (clamped) position.
//! 4. Re-planning the same intent against the post-move state is a no-op.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use taskboard::board::{apply_assignments, plan_move};
use taskboard_proto::ordering::column_sequence;
use taskboard_proto::reorder::{MoveIntent, Placement};
use taskboard_proto::task::{ColumnId, Task, TaskId};
use uuid::Uuid;

// --- Strategies ---

/// Strategy for generating one of the three board columns.
fn arb_column() -> impl Strategy<Value = ColumnId> {
    (0..ColumnId::ALL.len()).prop_map(|i| ColumnId::ALL[i])
}

/// Strategy for a single task. Ids come from the raw u128 so shrinking
/// stays deterministic; order values are deliberately sparse and may
/// collide.
fn arb_task() -> impl Strategy<Value = Task> {
    (any::<u128>(), arb_column(), 0u32..100, 0u64..10_000).prop_map(
        |(raw_id, status, order, created_at)| Task {
            id: TaskId::from_uuid(Uuid::from_u128(raw_id)),
            project_id: "proj-1".to_string(),
            title: "task".to_string(),
            description: None,
            status,
            order,
            assignee: None,
            due_at: None,
            created_at,
            created_by: "alice".to_string(),
        },
    )
}

/// Strategy for a board of 1 to 12 tasks with distinct ids.
fn arb_board() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_task(), 1..12).prop_map(|mut tasks| {
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        tasks.dedup_by(|a, b| a.id == b.id);
        tasks
    })
}

/// Strategy for a board plus an index-placement intent targeting one of
/// its tasks.
fn arb_board_and_intent() -> impl Strategy<Value = (Vec<Task>, MoveIntent)> {
    (arb_board(), any::<prop::sample::Index>(), arb_column(), 0usize..16).prop_map(
        |(tasks, picker, dest, index)| {
            let task_id = tasks[picker.index(tasks.len())].id.clone();
            let intent = MoveIntent {
                task_id,
                dest,
                placement: Placement::Index(index),
            };
            (tasks, intent)
        },
    )
}

/// The derived order values of one column after sorting.
fn column_orders(tasks: &[Task], column: ColumnId) -> Vec<u32> {
    column_sequence(tasks, column)
        .iter()
        .map(|t| t.order)
        .collect()
}

// --- Properties ---

proptest! {
    /// Applying a non-empty plan leaves the destination column numbered
    /// 0, 1, 2, ... with no gaps or duplicates.
    #[test]
    fn destination_column_is_contiguous_after_apply((mut tasks, intent) in arb_board_and_intent()) {
        let plan = plan_move(&intent, &tasks);
        prop_assume!(!plan.is_empty());

        apply_assignments(&mut tasks, &plan);
        let orders = column_orders(&tasks, intent.dest);
        let expected: Vec<u32> = (0..u32::try_from(orders.len()).unwrap()).collect();
        prop_assert_eq!(orders, expected);
    }

    /// For cross-column moves the vacated source column is renumbered
    /// contiguously as well.
    #[test]
    fn source_column_is_contiguous_after_apply((mut tasks, intent) in arb_board_and_intent()) {
        let source = tasks
            .iter()
            .find(|t| t.id == intent.task_id)
            .map(|t| t.status)
            .unwrap();
        prop_assume!(source != intent.dest);

        let plan = plan_move(&intent, &tasks);
        prop_assume!(!plan.is_empty());

        apply_assignments(&mut tasks, &plan);
        let orders = column_orders(&tasks, source);
        let expected: Vec<u32> = (0..u32::try_from(orders.len()).unwrap()).collect();
        prop_assert_eq!(orders, expected);
    }

    /// A plan never invents task ids and never assigns a column outside
    /// the intent's source and destination.
    #[test]
    fn plan_references_only_known_tasks((tasks, intent) in arb_board_and_intent()) {
        let source = tasks
            .iter()
            .find(|t| t.id == intent.task_id)
            .map(|t| t.status)
            .unwrap();
        let plan = plan_move(&intent, &tasks);

        for assignment in &plan {
            prop_assert!(tasks.iter().any(|t| t.id == assignment.id));
            prop_assert!(assignment.status == source || assignment.status == intent.dest);
        }
    }

    /// The moved task ends up at the requested index, clamped to the
    /// destination column's length.
    #[test]
    fn moved_task_lands_at_clamped_index((mut tasks, intent) in arb_board_and_intent()) {
        let Placement::Index(requested) = intent.placement.clone() else {
            unreachable!();
        };
        let plan = plan_move(&intent, &tasks);
        prop_assume!(!plan.is_empty());

        apply_assignments(&mut tasks, &plan);
        let dest = column_sequence(&tasks, intent.dest);
        let position = dest.iter().position(|t| t.id == intent.task_id).unwrap();
        prop_assert_eq!(position, requested.min(dest.len() - 1));
    }

    /// Once a plan is applied, the same intent plans to nothing: the
    /// state is a fixed point.
    #[test]
    fn replanning_after_apply_is_noop((mut tasks, intent) in arb_board_and_intent()) {
        let plan = plan_move(&intent, &tasks);
        apply_assignments(&mut tasks, &plan);
        prop_assert!(plan_move(&intent, &tasks).is_empty());
    }

    /// Tasks outside the intent's source and destination columns are
    /// never touched.
    #[test]
    fn unrelated_columns_are_untouched((tasks, intent) in arb_board_and_intent()) {
        let source = tasks
            .iter()
            .find(|t| t.id == intent.task_id)
            .map(|t| t.status)
            .unwrap();
        let mut after = tasks.clone();
        let plan = plan_move(&intent, &after);
        apply_assignments(&mut after, &plan);

        for column in ColumnId::ALL {
            if column == source || column == intent.dest {
                continue;
            }
            let before_ids: Vec<&TaskId> =
                column_sequence(&tasks, column).iter().map(|t| &t.id).collect();
            let after_ids: Vec<&TaskId> =
                column_sequence(&after, column).iter().map(|t| &t.id).collect();
            prop_assert_eq!(before_ids, after_ids);
        }
    }
}
