//! Domain types and pure view projections for `SimpleTask`.

pub mod calendar;
pub mod filter;
pub mod stats;
pub mod task;
