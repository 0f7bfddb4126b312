//! `TaskBoard` — client-side board library.
//!
//! Owns the board state container, the pure reorder planner, and the
//! optimistic update protocol against a persistence gateway.

pub mod board;
pub mod config;
pub mod net;
