//! Utility modules shared by the dispatcher, watcher and CLI.

pub mod date;
pub mod exec;
pub mod path;
