//! CLI command implementations.

pub mod common;
pub mod config;
pub mod nodes;
pub mod snapshot;
