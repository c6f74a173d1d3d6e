//! `TaskBoard` — data model for the realtime kanban board engine.

pub mod column;
pub mod slug;
pub mod task;
pub mod user;
