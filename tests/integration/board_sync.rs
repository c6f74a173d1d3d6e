//! Integration tests for task operations and cross-device sync.
//!
//! Two boards sharing one [`MemoryRemote`] behave like two devices on
//! the same realtime database: every write on one side is pushed to the
//! other as a full collection snapshot, applied last-write-wins.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use serde_json::json;
use taskboard::board::{Board, BoardError, Notice, NoticeKind, RemoteChange, Tab};
use taskboard::config::BoardConfig;
use taskboard::policy::MovePolicy;
use taskboard::store::memory::{AutoConfirm, MemoryLocal, MemoryRemote};
use taskboard::store::{RemoteStore, paths};
use taskboard::tasks::{NewTask, TaskError};
use taskboard_model::column::StatusId;
use taskboard_model::task::Priority;
use taskboard_model::user::UserId;
use tokio::sync::mpsc;

type TestBoard = Board<MemoryRemote, MemoryLocal, AutoConfirm>;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Builds an initialized board over a shared remote tree.
async fn make_board(
    remote: &MemoryRemote,
) -> (TestBoard, mpsc::Receiver<Notice>, mpsc::Receiver<RemoteChange>) {
    make_board_with(remote, true, MovePolicy::ForwardOnly).await
}

/// Builds an initialized board with explicit confirmation answer and policy.
async fn make_board_with(
    remote: &MemoryRemote,
    confirm: bool,
    policy: MovePolicy,
) -> (TestBoard, mpsc::Receiver<Notice>, mpsc::Receiver<RemoteChange>) {
    let config = BoardConfig {
        move_policy: policy,
        ..BoardConfig::default()
    };
    let (mut board, notices, changes) = Board::new(
        remote.clone(),
        MemoryLocal::new(),
        AutoConfirm(confirm),
        &config,
    );
    board.init().await;
    (board, notices, changes)
}

/// A minimal new-task form targeting the given column.
fn new_task(title: &str, status: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        priority: Priority::Medium,
        status: StatusId::new(status),
    }
}

fn maxim() -> UserId {
    UserId::new("maxim")
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn init_reports_connectivity() {
    let remote = MemoryRemote::new();
    let (_board, mut notices, _changes) = make_board(&remote).await;

    let first = notices.recv().await.unwrap();
    assert_eq!(first.kind, NoticeKind::Success);
    assert!(first.text.contains("Connected"));
}

#[tokio::test]
async fn init_surfaces_connectivity_failure_and_stays_usable() {
    let remote = MemoryRemote::new();
    remote.fail_path(paths::TEST_CONNECTION);
    let (board, mut notices, _changes) = make_board(&remote).await;

    let first = notices.recv().await.unwrap();
    assert_eq!(first.kind, NoticeKind::Error);
    // Built-in users are still seeded.
    assert_eq!(board.users().len(), 2);
}

// ---------------------------------------------------------------------------
// CRUD + form state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_task_persists_full_collection() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote).await;

    let task = board.create_task(new_task("Write docs", "todo")).await.unwrap();

    assert_eq!(board.own_tasks().len(), 1);
    let stored = remote
        .once(&paths::user_tasks(&maxim()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored[task.id.as_str()]["title"], json!("Write docs"));
}

#[tokio::test]
async fn create_task_in_unknown_column_is_rejected() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote).await;

    let result = board.create_task(new_task("Lost", "nope")).await;
    assert!(matches!(
        result,
        Err(BoardError::Task(TaskError::UnknownStatus(_)))
    ));
    assert!(board.own_tasks().is_empty());
}

#[tokio::test]
async fn form_submit_patches_task_under_edit() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote).await;

    let task = board.create_task(new_task("Draft", "todo")).await.unwrap();
    board.begin_edit(task.id.clone());
    let updated = board
        .submit_form(NewTask {
            title: "Final".to_string(),
            description: Some("polished".to_string()),
            priority: Priority::High,
            status: StatusId::new("todo"),
        })
        .await
        .unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.priority, Priority::High);
    assert!(board.editing().is_none());
    assert_eq!(board.own_tasks().len(), 1);
}

#[tokio::test]
async fn editing_another_users_task_is_denied() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote).await;

    let task = board.create_task(new_task("Mine", "todo")).await.unwrap();
    board.switch_user(UserId::new("mark")).await.unwrap();

    let result = board.delete_task(&maxim(), &task.id).await;
    assert!(matches!(result, Err(BoardError::Task(TaskError::NotOwner))));
    assert_eq!(board.all_tasks().len(), 1);
}

#[tokio::test]
async fn declined_delete_keeps_the_task() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) =
        make_board_with(&remote, false, MovePolicy::ForwardOnly).await;

    let task = board.create_task(new_task("Keep me", "todo")).await.unwrap();
    board.delete_task(&maxim(), &task.id).await.unwrap();

    assert_eq!(board.own_tasks().len(), 1);
}

// ---------------------------------------------------------------------------
// Move policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forward_only_denies_jump_and_allows_next_stage() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote).await;
    let task = board.create_task(new_task("Move me", "todo")).await.unwrap();

    let jump = board.move_task(&maxim(), &task.id, StatusId::new("done")).await;
    assert!(matches!(
        jump,
        Err(BoardError::Task(TaskError::MoveDenied { .. }))
    ));
    assert_eq!(board.own_tasks()[0].status, StatusId::new("todo"));

    board
        .move_task(&maxim(), &task.id, StatusId::new("in-progress"))
        .await
        .unwrap();
    assert_eq!(board.own_tasks()[0].status, StatusId::new("in-progress"));
}

#[tokio::test]
async fn unrestricted_policy_allows_arbitrary_moves() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) =
        make_board_with(&remote, true, MovePolicy::Unrestricted).await;
    let task = board.create_task(new_task("Jumper", "todo")).await.unwrap();

    board.move_task(&maxim(), &task.id, StatusId::new("done")).await.unwrap();
    assert_eq!(board.own_tasks()[0].status, StatusId::new("done"));

    board.move_task(&maxim(), &task.id, StatusId::new("review")).await.unwrap();
    assert_eq!(board.own_tasks()[0].status, StatusId::new("review"));
}

#[tokio::test]
async fn moving_another_users_task_writes_only_the_status_field() {
    let remote = MemoryRemote::new();
    let (mut alice, _an, _ac) = make_board(&remote).await;
    let task = alice.create_task(new_task("Handed off", "todo")).await.unwrap();

    // Second device acting as mark; the reload on switch picks up the task.
    let (mut bob, _bn, _bc) = make_board(&remote).await;
    bob.switch_user(UserId::new("mark")).await.unwrap();
    bob.move_task(&maxim(), &task.id, StatusId::new("in-progress"))
        .await
        .unwrap();

    let status = remote
        .once(&paths::task_status(&maxim(), &task.id))
        .await
        .unwrap();
    assert_eq!(status, Some(json!("in-progress")));
    // The rest of the task document is untouched.
    let stored = remote
        .once(&paths::user_tasks(&maxim()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored[task.id.as_str()]["title"], json!("Handed off"));
}

#[tokio::test]
async fn same_status_move_is_denied_under_forward_only() {
    let remote = MemoryRemote::new();
    let (mut board, mut notices, _changes) = make_board(&remote).await;
    let task = board.create_task(new_task("Stay put", "todo")).await.unwrap();
    while notices.try_recv().is_ok() {}

    // Dropping a card back onto its own column still goes through the
    // policy, which treats todo -> todo as a denied transition.
    let result = board.move_task(&maxim(), &task.id, StatusId::new("todo")).await;
    assert!(matches!(
        result,
        Err(BoardError::Task(TaskError::MoveDenied { .. }))
    ));
    assert_eq!(board.own_tasks()[0].status, StatusId::new("todo"));

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
}

// ---------------------------------------------------------------------------
// Cross-device sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_propagates_to_second_device() {
    let remote = MemoryRemote::new();
    let (mut alice, _an, _ac) = make_board(&remote).await;
    let (mut bob, _bn, mut bob_changes) = make_board(&remote).await;

    alice.create_task(new_task("Shared", "todo")).await.unwrap();

    let change = bob_changes.recv().await.unwrap();
    assert_eq!(change.user, maxim());
    bob.apply_remote_change(change).await;

    assert_eq!(bob.own_tasks().len(), 1);
    assert_eq!(bob.own_tasks()[0].title, "Shared");
}

#[tokio::test]
async fn concurrent_writes_resolve_last_write_wins() {
    let remote = MemoryRemote::new();
    let (mut alice, _an, mut alice_changes) = make_board(&remote).await;
    let (mut bob, _bn, _bc) = make_board(&remote).await;

    // Both devices write the same user's collection without seeing each
    // other first; bob's later full-collection write clobbers alice's.
    alice.create_task(new_task("first", "todo")).await.unwrap();
    bob.create_task(new_task("second", "todo")).await.unwrap();

    // Alice receives her own echo, then bob's overwrite.
    for _ in 0..2 {
        let change = alice_changes.recv().await.unwrap();
        alice.apply_remote_change(change).await;
    }

    assert_eq!(alice.own_tasks().len(), 1);
    assert_eq!(alice.own_tasks()[0].title, "second");
}

#[tokio::test]
async fn remote_removal_empties_the_collection() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, mut changes) = make_board(&remote).await;
    board.create_task(new_task("Ephemeral", "todo")).await.unwrap();
    let _echo = changes.recv().await.unwrap();

    remote.remove(&paths::user_tasks(&maxim())).await.unwrap();
    let change = changes.recv().await.unwrap();
    board.apply_remote_change(change).await;

    assert!(board.own_tasks().is_empty());
}

#[tokio::test]
async fn change_for_a_deleted_user_is_dropped() {
    let remote = MemoryRemote::new();
    let (mut board, mut notices, _changes) = make_board(&remote).await;
    board.delete_user(&UserId::new("mark")).await.unwrap();
    while notices.try_recv().is_ok() {}

    // A notification raced with the deletion; it must not resurrect
    // the collection or surface an update notice.
    board
        .apply_remote_change(RemoteChange {
            user: UserId::new("mark"),
            snapshot: json!({"t1": {
                "id": "t1",
                "title": "Ghost",
                "priority": "low",
                "status": "todo",
                "createdAt": "2026-01-01T00:00:00Z"
            }}),
        })
        .await;

    assert!(notices.try_recv().is_err());
    assert!(board.all_tasks().is_empty());
}

#[tokio::test]
async fn per_user_fetch_failure_is_isolated() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote).await;
    board.create_task(new_task("Survivor", "todo")).await.unwrap();

    remote.fail_path(&paths::user_tasks(&UserId::new("mark")));
    board.switch_tab(Tab::All).await;

    // The failing user is skipped; everyone else's tasks still load.
    let merged = board.all_tasks();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].task.title, "Survivor");
    assert_eq!(merged[0].owner, maxim());
}
