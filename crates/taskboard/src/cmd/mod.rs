//! Command implementations for the Taskboard CLI

pub mod serve;
pub mod user;
