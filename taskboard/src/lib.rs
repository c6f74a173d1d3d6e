//! `TaskBoard` — realtime multi-user kanban board engine library.

pub mod board;
pub mod columns;
pub mod config;
pub mod policy;
pub mod store;
pub mod tasks;
pub mod users;
