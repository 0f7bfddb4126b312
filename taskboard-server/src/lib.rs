//! `TaskBoard` board server library.
//!
//! Exposes the HTTP server for use in tests and embedding. The server
//! authorizes callers against the project registry, serves task CRUD, and
//! applies reorder batches atomically against the task store.

pub mod config;
pub mod projects;
pub mod server;
pub mod store;
