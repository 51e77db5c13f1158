//! `syncwatch sync` - run the sync command once, without watching.

use anyhow::{Result, ensure};

use crate::actor::dispatcher::SubmitError;
use crate::actor::invoker::{CommandInvoker, Invoker};
use crate::config::{ProjectSection, SyncConfig};
use crate::log;
use crate::utils::date::timestamp_to_string;

/// Run one invocation for `id` at `path`. Returns the process exit code.
///
/// The watch snapshot comes from the config when the project is listed
/// there; otherwise mock mode sends an empty project.
pub fn sync_once(config: &SyncConfig, id: &str, path: &str, timestamp: i64) -> Result<i32> {
    ensure!(!path.trim().is_empty(), SubmitError::EmptyProjectPath);

    let invoker = CommandInvoker::new(config.sync_command(id, path))?;
    let snapshot = config.project(id).map(ProjectSection::to_watch);

    let result = invoker.execute(timestamp, snapshot.as_ref());
    if result.is_success() {
        log!("sync"; "[{}] next watermark: {}", id, timestamp_to_string(result.spawn_time));
        Ok(0)
    } else {
        log!("error"; "[{}] sync command exited with {}: {}", id, result.exit_code, result.output.trim_end());
        Ok(1)
    }
}
