//! `[sync]` section configuration.
//!
//! Describes the external command that is run for every coalesced batch of
//! file changes.
//!
//! # Example
//!
//! ```toml
//! [sync]
//! command = "~/.codewind/cwctl"   # Invoked as `project sync -p .. -i .. -t ..`
//! mock_command = ""               # Runnable jar used instead (automated tests)
//! loader = "java"                 # Runtime that loads `mock_command`
//! debounce_ms = 300               # Quiet window before a burst is submitted
//! ```

use serde::{Deserialize, Serialize};

/// Sync command settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Path to the sync command executable.
    pub command: String,

    /// Mock command for automated tests. Blank = normal mode.
    pub mock_command: String,

    /// Program that runs `mock_command` (`<loader> -jar <mock_command> ..`).
    pub loader: String,

    /// Milliseconds without new file events before a burst is submitted.
    pub debounce_ms: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            command: String::new(),
            mock_command: String::new(),
            loader: "java".to_string(),
            debounce_ms: 300,
        }
    }
}

impl SyncSection {
    /// Mock command, if one is configured (blank counts as unset).
    pub fn mock(&self) -> Option<&str> {
        let trimmed = self.mock_command.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
