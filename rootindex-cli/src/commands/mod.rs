//! CLI command implementations.

pub mod classify;
pub mod common;
pub mod config;
pub mod entries;
pub mod iterate;
pub mod namespace;
pub mod roots;
