//! Invoker - runs the external sync command once.
//!
//! [`Invoker::execute`] blocks until the process exits; the dispatcher
//! calls it from a `spawn_blocking` worker, never from its own loop.
//!
//! Two command lines are supported:
//!
//! ```text
//! normal: <command> project sync -p <path> -i <id> -t <watermark>
//! mock:   <loader> -jar <jar> -p <path> -i <id> -t <watermark> -projectJson <base64>
//! ```
//!
//! The working directory is the directory containing `<command>` (or
//! `<jar>` in mock mode).

use std::path::{Path, PathBuf};

use super::messages::InvocationResult;
use crate::config::ConfigError;
use crate::logger::log_block;
use crate::project::ProjectToWatch;
use crate::utils::date::now_millis;
use crate::utils::exec::{Cmd, EMPTY_FILTER};
use crate::{debug, log};

/// Runs one sync invocation and reports its outcome.
///
/// Implementations must not panic or return early without a result: every
/// failure is folded into the returned [`InvocationResult`].
pub trait Invoker: Send + Sync + 'static {
    fn execute(&self, watermark: i64, snapshot: Option<&ProjectToWatch>) -> InvocationResult;
}

/// Mock sync command used by automated tests of the whole tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCommand {
    /// Runnable jar standing in for the sync command.
    pub jar: PathBuf,
    /// Program that loads the jar.
    pub loader: String,
}

/// Everything needed to build the sync command line for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pub project_id: String,
    pub project_path: String,
    pub command_path: PathBuf,
    pub mock: Option<MockCommand>,
}

impl SyncCommand {
    /// Build the command line for `watermark`.
    ///
    /// In mock mode a missing snapshot is sent as an empty project.
    pub fn build(&self, watermark: i64, snapshot: Option<&ProjectToWatch>) -> Cmd {
        let watermark = watermark.to_string();

        match &self.mock {
            None => Cmd::new(&self.command_path)
                .args(["project", "sync", "-p"])
                .arg(&self.project_path)
                .arg("-i")
                .arg(&self.project_id)
                .arg("-t")
                .arg(&watermark)
                .cwd(command_dir(&self.command_path)),
            Some(mock) => {
                let encoded = snapshot
                    .map(ProjectToWatch::simplified)
                    .unwrap_or_default()
                    .encode();

                Cmd::new(&mock.loader)
                    .arg("-jar")
                    .arg(&mock.jar)
                    .arg("-p")
                    .arg(&self.project_path)
                    .arg("-i")
                    .arg(&self.project_id)
                    .arg("-t")
                    .arg(&watermark)
                    .arg("-projectJson")
                    .arg(encoded)
                    .cwd(command_dir(&mock.jar))
            }
        }
    }
}

/// Directory that contains `path`, `.` if it has none.
fn command_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// [`Invoker`] that spawns the real (or mock) sync command.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    command: SyncCommand,
}

impl CommandInvoker {
    /// Fails if the command path is blank.
    pub fn new(command: SyncCommand) -> Result<Self, ConfigError> {
        if command.command_path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ConfigError::EmptyCommandPath);
        }
        Ok(Self { command })
    }
}

impl Invoker for CommandInvoker {
    fn execute(&self, watermark: i64, snapshot: Option<&ProjectToWatch>) -> InvocationResult {
        let id = &self.command.project_id;
        let cmd = self.command.build(watermark, snapshot);
        let display = cmd.display_args();

        log!("sync"; "calling project sync with: [{}] {{ {}}}", id, display);

        let spawn_time = now_millis();
        let outcome = cmd.output();
        debug!("sync"; "[{}] sync call completed in {}ms", id, now_millis() - spawn_time);

        match outcome {
            Ok(output) if output.success() => {
                log!("sync"; "[{}] successfully ran sync command", id);
                debug_do_output(&output.combined);
                InvocationResult::success(output.combined, spawn_time)
            }
            Ok(output) => {
                log!("error"; "[{}] error running sync command: {}", id, display);
                InvocationResult::failure(output.code, output.combined, spawn_time)
            }
            Err(e) => {
                log!("error"; "[{}] unable to run sync command: {:#}", id, e);
                InvocationResult::failure(None, format!("{e:#}"), spawn_time)
            }
        }
    }
}

fn debug_do_output(output: &str) {
    if crate::logger::is_verbose() {
        let lines = EMPTY_FILTER.apply(output);
        if !lines.is_empty() {
            log_block("sync", "output:", &lines.join("\n"));
        }
    }
}
