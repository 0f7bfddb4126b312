//! Optimistic update rollback against a real server.
//!
//! The board store applies moves locally before persistence. These tests
//! induce persistence failures at the server and verify the client
//! re-converges to server truth instead of keeping the optimistic state.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use taskboard::board::{BoardError, BoardStore, GatewayError};
use taskboard::net::HttpGateway;
use taskboard_proto::api::CreateTaskRequest;
use taskboard_proto::reorder::{MoveIntent, Placement};
use taskboard_proto::task::ColumnId;
use taskboard_server::server::{ServerState, start_server_with_state};

/// Starts a server seeded with project "proj-1" (creator alice) and
/// returns its base URL plus the shared state for fault injection.
async fn start_board_server() -> (String, Arc<ServerState>) {
    let state = Arc::new(ServerState::new());
    state
        .projects
        .register("proj-1", "Rollback", "alice")
        .await
        .unwrap();
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::clone(&state))
        .await
        .expect("server should start");
    (format!("http://{addr}"), state)
}

async fn open_board(base_url: &str) -> BoardStore<HttpGateway> {
    let mut store = BoardStore::new(HttpGateway::new(base_url, "alice"), "proj-1");
    store.hydrate().await.expect("hydrate should succeed");
    store
}

fn titled(title: &str, status: ColumnId) -> CreateTaskRequest {
    CreateTaskRequest {
        title: title.to_string(),
        status: Some(status),
        ..CreateTaskRequest::default()
    }
}

#[tokio::test]
async fn failed_commit_rolls_client_back_to_server_truth() {
    let (base_url, state) = start_board_server().await;
    let mut board = open_board(&base_url).await;

    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("b", ColumnId::Todo)).await.unwrap();
    let before = board.tasks().to_vec();

    state.store.fail_next_commit();
    let intent = MoveIntent {
        task_id: a.id,
        dest: ColumnId::Done,
        placement: Placement::Index(0),
    };
    let err = board.submit_move(&intent).await.unwrap_err();
    assert!(matches!(
        err,
        BoardError::Gateway(GatewayError::Rejected { .. })
    ));

    // The optimistic move is gone; local state matches the server again.
    assert_eq!(board.tasks(), before.as_slice());
    assert!(board.tasks_by_status(ColumnId::Done).is_empty());
}

#[tokio::test]
async fn move_after_rollback_succeeds() {
    let (base_url, state) = start_board_server().await;
    let mut board = open_board(&base_url).await;

    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("b", ColumnId::Todo)).await.unwrap();

    state.store.fail_next_commit();
    let intent = MoveIntent {
        task_id: a.id.clone(),
        dest: ColumnId::Done,
        placement: Placement::Index(0),
    };
    assert!(board.submit_move(&intent).await.is_err());

    // The induced failure is one-shot; retrying the same move commits.
    board.submit_move(&intent).await.expect("retry should persist");
    let done = board.tasks_by_status(ColumnId::Done);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, a.id);

    // Server agrees after a fresh fetch.
    let other = open_board(&base_url).await;
    assert_eq!(other.tasks_by_status(ColumnId::Done).len(), 1);
    assert_eq!(other.tasks_by_status(ColumnId::Todo).len(), 1);
}

#[tokio::test]
async fn rollback_picks_up_concurrent_server_changes() {
    let (base_url, state) = start_board_server().await;
    let mut board = open_board(&base_url).await;
    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();

    // Another client adds a task this board has not seen yet.
    let mut other = open_board(&base_url).await;
    other.create_task(&titled("late", ColumnId::Todo)).await.unwrap();

    state.store.fail_next_commit();
    let intent = MoveIntent {
        task_id: a.id,
        dest: ColumnId::Done,
        placement: Placement::Index(0),
    };
    assert!(board.submit_move(&intent).await.is_err());

    // Re-convergence is a fresh fetch, so the concurrent task shows up.
    assert_eq!(board.tasks().len(), 2);
    assert!(board.tasks().iter().any(|t| t.title == "late"));
}

#[tokio::test]
async fn noop_move_never_reaches_the_server() {
    let (base_url, state) = start_board_server().await;
    let mut board = open_board(&base_url).await;
    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();

    // Poison the next commit; a no-op move must not consume it.
    state.store.fail_next_commit();
    let intent = MoveIntent {
        task_id: a.id.clone(),
        dest: ColumnId::Todo,
        placement: Placement::Index(0),
    };
    board.submit_move(&intent).await.expect("no-op should succeed");

    // The poisoned commit is still pending, proving no call was made.
    let intent = MoveIntent {
        task_id: a.id,
        dest: ColumnId::Done,
        placement: Placement::Index(0),
    };
    assert!(board.submit_move(&intent).await.is_err());
}
