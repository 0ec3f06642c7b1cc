//! `SimpleTask` client library: session-scoped task sync against a remote
//! document store, with a snapshot cache feeding pure derived views.

pub mod config;
pub mod profile;
pub mod session;
pub mod store;
pub mod sync;
pub mod tasks;
