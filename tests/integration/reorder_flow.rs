//! End-to-end reorder flow: client board store -> HTTP gateway -> server.
//!
//! Starts a real board server in-process and drives it through
//! [`BoardStore`] with the HTTP gateway, verifying that drag-and-drop
//! moves survive the round trip and that a second client sees the same
//! ordering after a fresh fetch.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use taskboard::board::BoardStore;
use taskboard::net::HttpGateway;
use taskboard_proto::api::CreateTaskRequest;
use taskboard_proto::project::Role;
use taskboard_proto::reorder::{MoveIntent, Placement};
use taskboard_proto::task::ColumnId;
use taskboard_server::server::{ServerState, start_server_with_state};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Starts a server seeded with one project ("proj-1") whose members are
/// alice (creator) and bob, and returns its base URL.
async fn start_board_server() -> String {
    let state = Arc::new(ServerState::new());
    state
        .projects
        .register("proj-1", "Integration", "alice")
        .await
        .unwrap();
    state
        .projects
        .add_member("proj-1", "bob", Role::Member)
        .await
        .unwrap();
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", state)
        .await
        .expect("server should start");
    format!("http://{addr}")
}

/// Opens a hydrated board store for `user` against the given server.
async fn open_board(base_url: &str, user: &str) -> BoardStore<HttpGateway> {
    let mut store = BoardStore::new(HttpGateway::new(base_url, user), "proj-1");
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

fn titles(tasks: &[&taskboard_proto::task::Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_tasks_append_to_column_end() {
    let base_url = start_board_server().await;
    let mut board = open_board(&base_url, "alice").await;

    board.create_task(&titled("First", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("Second", ColumnId::Todo)).await.unwrap();
    let third = board
        .create_task(&titled("Third", ColumnId::Todo))
        .await
        .unwrap();

    assert_eq!(third.order, 2);
    let todo = board.tasks_by_status(ColumnId::Todo);
    assert_eq!(titles(&todo), vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn within_column_move_round_trips() {
    let base_url = start_board_server().await;
    let mut board = open_board(&base_url, "alice").await;

    board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("b", ColumnId::Todo)).await.unwrap();
    let c = board.create_task(&titled("c", ColumnId::Todo)).await.unwrap();

    let intent = MoveIntent {
        task_id: c.id,
        dest: ColumnId::Todo,
        placement: Placement::Index(0),
    };
    board.submit_move(&intent).await.expect("move should persist");
    assert_eq!(titles(&board.tasks_by_status(ColumnId::Todo)), vec!["c", "a", "b"]);

    // A second client fetching fresh sees the same order.
    let other = open_board(&base_url, "bob").await;
    assert_eq!(titles(&other.tasks_by_status(ColumnId::Todo)), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn cross_column_move_updates_both_columns() {
    let base_url = start_board_server().await;
    let mut board = open_board(&base_url, "alice").await;

    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("b", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("w", ColumnId::InProgress)).await.unwrap();

    // Move a to the front of in-progress.
    let intent = MoveIntent {
        task_id: a.id,
        dest: ColumnId::InProgress,
        placement: Placement::Index(0),
    };
    board.submit_move(&intent).await.unwrap();

    let other = open_board(&base_url, "bob").await;
    assert_eq!(
        titles(&other.tasks_by_status(ColumnId::InProgress)),
        vec!["a", "w"]
    );
    // Source column gap closed: b renumbered to the front.
    let todo = other.tasks_by_status(ColumnId::Todo);
    assert_eq!(titles(&todo), vec!["b"]);
    assert_eq!(todo[0].order, 0);
}

#[tokio::test]
async fn anchor_move_round_trips() {
    let base_url = start_board_server().await;
    let mut board = open_board(&base_url, "alice").await;

    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("b", ColumnId::Todo)).await.unwrap();
    let c = board.create_task(&titled("c", ColumnId::Todo)).await.unwrap();

    // Drop a just above c: expect [b, a, c].
    let intent = MoveIntent {
        task_id: a.id,
        dest: ColumnId::Todo,
        placement: Placement::Before(c.id),
    };
    board.submit_move(&intent).await.unwrap();

    let other = open_board(&base_url, "alice").await;
    assert_eq!(titles(&other.tasks_by_status(ColumnId::Todo)), vec!["b", "a", "c"]);
}

#[tokio::test]
async fn delete_then_move_keeps_ordering_consistent() {
    let base_url = start_board_server().await;
    let mut board = open_board(&base_url, "alice").await;

    let a = board.create_task(&titled("a", ColumnId::Todo)).await.unwrap();
    let b = board.create_task(&titled("b", ColumnId::Todo)).await.unwrap();
    board.create_task(&titled("c", ColumnId::Todo)).await.unwrap();

    // Deleting b leaves a gap (orders 0 and 2); a later move renumbers.
    board.delete_task(&b.id).await.unwrap();
    let intent = MoveIntent {
        task_id: a.id,
        dest: ColumnId::Todo,
        placement: Placement::Index(1),
    };
    board.submit_move(&intent).await.unwrap();

    let todo = board.tasks_by_status(ColumnId::Todo);
    assert_eq!(titles(&todo), vec!["c", "a"]);
    assert_eq!(todo[0].order, 0);
    assert_eq!(todo[1].order, 1);
}

#[tokio::test]
async fn non_member_gateway_calls_are_rejected() {
    let base_url = start_board_server().await;
    let mut board = BoardStore::new(HttpGateway::new(&base_url, "mallory"), "proj-1");
    assert!(board.hydrate().await.is_err());
}
