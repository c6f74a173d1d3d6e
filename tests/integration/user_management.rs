//! Integration tests for the user directory: built-in seeding, adding
//! and deleting users, cascade semantics, and remote directory merge.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use serde_json::json;
use taskboard::board::{Board, BoardError, Notice, RemoteChange};
use taskboard::config::BoardConfig;
use taskboard::store::memory::{AutoConfirm, MemoryLocal, MemoryRemote};
use taskboard::store::{RemoteStore, paths};
use taskboard::tasks::NewTask;
use taskboard::users::UserError;
use taskboard_model::column::StatusId;
use taskboard_model::task::Priority;
use taskboard_model::user::UserId;
use tokio::sync::mpsc;

type TestBoard = Board<MemoryRemote, MemoryLocal, AutoConfirm>;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn make_board(
    remote: &MemoryRemote,
    confirm: bool,
) -> (TestBoard, mpsc::Receiver<Notice>, mpsc::Receiver<RemoteChange>) {
    let config = BoardConfig::default();
    let (mut board, notices, changes) = Board::new(
        remote.clone(),
        MemoryLocal::new(),
        AutoConfirm(confirm),
        &config,
    );
    board.init().await;
    (board, notices, changes)
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        priority: Priority::Medium,
        status: StatusId::new("todo"),
    }
}

fn maxim() -> UserId {
    UserId::new("maxim")
}

fn mark() -> UserId {
    UserId::new("mark")
}

// ---------------------------------------------------------------------------
// Seeding and adding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn builtin_users_are_seeded() {
    let remote = MemoryRemote::new();
    let (board, _notices, _changes) = make_board(&remote, true).await;

    assert_eq!(board.users().len(), 2);
    assert!(board.users().contains(&maxim()));
    assert!(board.users().contains(&mark()));
    assert_eq!(board.active_user(), &maxim());
}

#[tokio::test]
async fn added_user_becomes_active_and_is_persisted() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;

    let id = board.add_user("Ольга Петрова", "👩").await.unwrap();
    assert_eq!(id.as_str(), "ольга-петр"); // slug stem capped at 10 chars
    assert_eq!(board.active_user(), &id);

    let directory = remote.once(paths::USERS).await.unwrap().unwrap();
    assert_eq!(directory[id.as_str()]["name"], json!("Ольга Петрова"));
    assert_eq!(directory[id.as_str()]["avatar"], json!("👩"));
}

#[tokio::test]
async fn duplicate_name_is_rejected_case_insensitive() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;

    let result = board.add_user("марк", "🙂").await;
    assert!(matches!(result, Err(BoardError::User(UserError::NameTaken(_)))));
    assert_eq!(board.users().len(), 2);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;

    let result = board.add_user("   ", "🙂").await;
    assert!(matches!(result, Err(BoardError::User(UserError::NameEmpty))));
}

#[tokio::test]
async fn adding_a_user_preserves_existing_remote_tasks() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;
    let task = board.create_task(new_task("Survives the add")).await.unwrap();

    let ivan = board.add_user("Ivan", "🧑").await.unwrap();

    // Profile fields land without clobbering sibling task collections.
    let name = remote.once(&paths::user_name(&ivan)).await.unwrap();
    assert_eq!(name, Some(json!("Ivan")));
    let stored = remote
        .once(&paths::user_tasks(&maxim()))
        .await
        .unwrap()
        .expect("maxim's remote tasks must survive a directory write");
    assert_eq!(stored[task.id.as_str()]["title"], json!("Survives the add"));
}

// ---------------------------------------------------------------------------
// Switching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn switch_user_changes_the_personal_view() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;
    board.create_task(new_task("Maxim's task")).await.unwrap();

    board.switch_user(mark()).await.unwrap();
    assert!(board.own_tasks().is_empty());
    assert_eq!(board.all_tasks().len(), 1);

    board.switch_user(maxim()).await.unwrap();
    assert_eq!(board.own_tasks().len(), 1);
}

#[tokio::test]
async fn switch_to_unknown_user_fails() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;

    let result = board.switch_user(UserId::new("ghost")).await;
    assert!(matches!(result, Err(BoardError::User(UserError::NotFound(_)))));
    assert_eq!(board.active_user(), &maxim());
}

#[tokio::test]
async fn active_user_is_restored_across_restarts() {
    let remote = MemoryRemote::new();
    let local = MemoryLocal::new();
    let config = BoardConfig::default();

    let (mut board, _n, _c) = Board::new(remote.clone(), local.clone(), AutoConfirm(true), &config);
    board.init().await;
    board.switch_user(mark()).await.unwrap();
    drop(board);

    // Same device (local store), fresh board.
    let (mut board, _n, _c) = Board::new(remote.clone(), local, AutoConfirm(true), &config);
    board.init().await;
    assert_eq!(board.active_user(), &mark());
}

// ---------------------------------------------------------------------------
// Deletion and cascade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_a_user_cascades_to_their_tasks() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;
    board.create_task(new_task("One")).await.unwrap();
    board.create_task(new_task("Two")).await.unwrap();

    board.delete_user(&maxim()).await.unwrap();

    assert!(!board.users().contains(&maxim()));
    assert_eq!(remote.once(&paths::user_tasks(&maxim())).await.unwrap(), None);
    // The remaining user becomes active.
    assert_eq!(board.active_user(), &mark());
    assert!(board.all_tasks().is_empty());
}

#[tokio::test]
async fn deleting_a_user_preserves_other_users_tasks() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;
    let task = board.create_task(new_task("Survives the delete")).await.unwrap();

    board.delete_user(&mark()).await.unwrap();

    assert_eq!(remote.once(&paths::user_tasks(&mark())).await.unwrap(), None);
    let stored = remote
        .once(&paths::user_tasks(&maxim()))
        .await
        .unwrap()
        .expect("maxim's remote tasks must survive deleting another user");
    assert_eq!(stored[task.id.as_str()]["title"], json!("Survives the delete"));
}

#[tokio::test]
async fn cascade_confirmation_counts_remote_tasks() {
    let remote = MemoryRemote::new();
    remote
        .set(
            &paths::user_tasks(&mark()),
            json!({
                "t1": {
                    "id": "t1",
                    "title": "Remote only",
                    "priority": "low",
                    "status": "todo",
                    "createdAt": "2026-01-01T00:00:00Z"
                }
            }),
        )
        .await
        .unwrap();

    // Mark's collection fails to load at startup, so the cached count
    // is zero even though tasks exist remotely.
    remote.fail_path(&paths::user_tasks(&mark()));
    let (mut board, _notices, _changes) = make_board(&remote, false).await;
    assert!(board.all_tasks().is_empty());
    remote.heal_path(&paths::user_tasks(&mark()));

    // The declined prompt proves the count came from the remote store.
    board.delete_user(&mark()).await.unwrap();
    assert!(board.users().contains(&mark()));
    assert!(remote.once(&paths::user_tasks(&mark())).await.unwrap().is_some());
}

#[tokio::test]
async fn declined_cascade_keeps_user_and_tasks() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, false).await;
    board.create_task(new_task("Precious")).await.unwrap();

    board.delete_user(&maxim()).await.unwrap();

    assert!(board.users().contains(&maxim()));
    assert_eq!(board.own_tasks().len(), 1);
    assert!(remote.once(&paths::user_tasks(&maxim())).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_the_last_user_inserts_a_placeholder() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;

    board.delete_user(&mark()).await.unwrap();
    board.delete_user(&maxim()).await.unwrap();

    assert_eq!(board.users().len(), 1);
    assert_eq!(board.active_user().as_str(), "user");
}

#[tokio::test]
async fn deleting_an_unknown_user_fails() {
    let remote = MemoryRemote::new();
    let (mut board, _notices, _changes) = make_board(&remote, true).await;

    let result = board.delete_user(&UserId::new("ghost")).await;
    assert!(matches!(result, Err(BoardError::User(UserError::NotFound(_)))));
}

// ---------------------------------------------------------------------------
// Remote directory merge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_directory_merges_on_startup() {
    let remote = MemoryRemote::new();
    remote
        .set(
            paths::USERS,
            json!({
                "olga": {"name": "Ольга", "avatar": "👩"},
                "broken": {"name": "", "avatar": ""},
            }),
        )
        .await
        .unwrap();

    let (board, _notices, _changes) = make_board(&remote, true).await;

    // Well-formed remote entries merge in; incomplete ones are dropped.
    assert!(board.users().contains(&UserId::new("olga")));
    assert!(!board.users().contains(&UserId::new("broken")));
    // Built-ins survive the merge.
    assert_eq!(board.users().len(), 3);
}

#[tokio::test]
async fn profile_less_user_nodes_are_skipped_on_merge() {
    let remote = MemoryRemote::new();
    remote
        .set(&paths::user_name(&UserId::new("olga")), json!("Ольга"))
        .await
        .unwrap();
    remote
        .set(&paths::user_avatar(&UserId::new("olga")), json!("👩"))
        .await
        .unwrap();
    // A node holding only a task collection, e.g. written by a device
    // that never persisted a profile for it.
    remote
        .set(
            &paths::user_tasks(&UserId::new("lonely")),
            json!({"t1": {
                "id": "t1",
                "title": "Orphan",
                "priority": "low",
                "status": "todo",
                "createdAt": "2026-01-01T00:00:00Z"
            }}),
        )
        .await
        .unwrap();

    let (board, _notices, _changes) = make_board(&remote, true).await;

    // One undecodable entry must not take the rest of the directory down.
    assert!(board.users().contains(&UserId::new("olga")));
    assert!(!board.users().contains(&UserId::new("lonely")));
    assert_eq!(board.users().len(), 3);
}

#[tokio::test]
async fn added_user_syncs_to_a_second_device() {
    let remote = MemoryRemote::new();
    let (mut alice, _an, _ac) = make_board(&remote, true).await;
    alice.add_user("Ivan", "🧑").await.unwrap();

    // A device starting later picks the new user up from the directory.
    let (bob, _bn, _bc) = make_board(&remote, true).await;
    assert!(bob.users().contains(&UserId::new("ivan")));
    assert_eq!(bob.users().len(), 3);
}
