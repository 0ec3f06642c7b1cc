//! `SimpleTask` document server library.
//!
//! Exposes the HTTP document store for use in tests and embedding.
//! The server keeps free-form JSON documents in named collections and
//! serves the insert/query/fetch/update/delete API the client's task
//! and profile repositories are built on.

pub mod config;
pub mod server;
pub mod store;
