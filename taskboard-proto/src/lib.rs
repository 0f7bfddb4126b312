//! Shared data model and wire types for `TaskBoard`.

pub mod api;
pub mod ordering;
pub mod project;
pub mod reorder;
pub mod task;
