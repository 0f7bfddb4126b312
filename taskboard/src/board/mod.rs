//! Board state, reorder planning, and the optimistic update protocol.
//!
//! [`planner::plan_move`] is a pure function from a move intent and the
//! current task set to a batch of assignments. [`store::BoardStore`] owns
//! the client-held task collection, applies plans optimistically, and rolls
//! back to server truth when persistence fails.

pub mod gateway;
pub mod planner;
pub mod store;

pub use gateway::{GatewayError, TaskGateway};
pub use planner::plan_move;
pub use store::{BoardStore, apply_assignments};

use thiserror::Error;

/// Errors surfaced by board operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max 256 characters)")]
    TitleTooLong,
    /// The persistence gateway reported a failure; any optimistic state has
    /// already been rolled back.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
