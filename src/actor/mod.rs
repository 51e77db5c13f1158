//! Actor System for Project Sync
//!
//! Message-passing concurrency for watch mode, one pipeline per project:
//!
//! ```text
//! FsWatcher --Change--> DispatcherActor --spawn_blocking--> Invoker
//!  (notify)              (coalesce)                     (sync command)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Mailbox message types
//! - `invoker` - Runs the external sync command once
//! - `dispatcher` - Single-flight, coalescing dispatcher per project
//! - `fs` - File system watcher with debouncing
//! - `coordinator` - Wires up and runs everything

pub mod coordinator;
pub mod dispatcher;
pub mod fs;
pub mod invoker;
pub mod messages;

pub use coordinator::Coordinator;
