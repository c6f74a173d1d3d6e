//! `TaskBoard` engine demo binary.
//!
//! Runs the board headless over the in-memory backends: seeds a few
//! tasks, exercises the move policy, and prints the merged board.
//!
//! # Usage
//!
//! ```bash
//! # Run with the default forward-only policy
//! cargo run --bin taskboard
//!
//! # Allow arbitrary moves
//! cargo run --bin taskboard -- --move-policy unrestricted
//!
//! # Or via environment variable
//! TASKBOARD_POLICY=unrestricted cargo run --bin taskboard
//! ```

use clap::Parser;
use taskboard::board::{Board, Tab};
use taskboard::config::{BoardCliArgs, BoardConfig};
use taskboard::store::memory::{AutoConfirm, MemoryLocal, MemoryRemote};
use taskboard::tasks::NewTask;
use taskboard_model::column::StatusId;
use taskboard_model::task::Priority;

#[tokio::main]
async fn main() {
    let cli = BoardCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match BoardConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(policy = %config.move_policy, "starting task board engine");

    let remote = MemoryRemote::new();
    let local = MemoryLocal::new();
    let (mut board, mut notices, mut changes) =
        Board::new(remote, local, AutoConfirm(true), &config);
    board.init().await;

    let created = board
        .create_task(NewTask {
            title: "Draft the release notes".to_string(),
            description: Some("Cover the sync changes".to_string()),
            priority: Priority::High,
            status: StatusId::new("todo"),
        })
        .await;
    let task = match created {
        Ok(task) => task,
        Err(e) => {
            tracing::error!(error = %e, "failed to seed task");
            std::process::exit(1);
        }
    };

    // A jump straight to done is denied under forward-only.
    let owner = board.active_user().clone();
    if let Err(e) = board.move_task(&owner, &task.id, StatusId::new("done")).await {
        tracing::info!(error = %e, "move rejected");
    }
    if let Err(e) = board
        .move_task(&owner, &task.id, StatusId::new("in-progress"))
        .await
    {
        tracing::error!(error = %e, "unexpected rejection");
    }

    // Drain remote pushes triggered by our own writes.
    while let Ok(change) = changes.try_recv() {
        board.apply_remote_change(change).await;
    }

    board.switch_tab(Tab::All).await;
    for column in board.columns() {
        println!("{} {}", column.icon, column.name);
        for owned in board.all_tasks() {
            if owned.task.status == column.status {
                println!(
                    "  [{}] {} ({} {})",
                    owned.task.priority, owned.task.title, owned.owner_avatar, owned.owner_name
                );
            }
        }
    }

    while let Ok(notice) = notices.try_recv() {
        tracing::info!(kind = ?notice.kind, "{}", notice.text);
    }
}
