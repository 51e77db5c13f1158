//! Actor Message Definitions
//!
//! Message types for the per-project dispatcher mailbox.
//!
//! ```text
//! FsWatcher --Change--> DispatcherActor --spawn--> Invoker
//!                             ^                       |
//!                             +-------Completed-------+
//! ```

use std::sync::Arc;

use crate::project::ProjectToWatch;

// =============================================================================
// Payloads
// =============================================================================

/// One notification that files of a project changed.
///
/// Carries no file list: the sync command works out what changed since the
/// watermark on its own.
#[derive(Debug, Clone, Default)]
pub struct ChangeEvent {
    /// Known timestamp for the project (ms), `0` = no new information.
    pub timestamp: i64,
    /// Latest watch configuration; only consumed in mock mode.
    pub snapshot: Option<Arc<ProjectToWatch>>,
}

/// Outcome of exactly one sync command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Process exit code; `-1` when unknown or the process never started.
    pub exit_code: i32,
    /// Combined stdout and stderr.
    pub output: String,
    /// Wall-clock ms taken right before spawning.
    pub spawn_time: i64,
}

impl InvocationResult {
    pub fn success(output: String, spawn_time: i64) -> Self {
        Self {
            exit_code: 0,
            output,
            spawn_time,
        }
    }

    pub fn failure(exit_code: Option<i32>, output: String, spawn_time: i64) -> Self {
        Self {
            exit_code: exit_code.filter(|c| *c != 0).unwrap_or(-1),
            output,
            spawn_time,
        }
    }

    pub const fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

// =============================================================================
// DispatcherActor Messages
// =============================================================================

/// Messages to a Dispatcher Actor
#[derive(Debug)]
pub enum DispatchMsg {
    /// Files changed (from any producer)
    Change(ChangeEvent),
    /// The in-flight invocation finished (only from the worker task)
    Completed(InvocationResult),
}
