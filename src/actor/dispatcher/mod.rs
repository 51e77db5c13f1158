//! Dispatcher Actor - coalescing, single-flight sync per project
//!
//! ```text
//! submit() ──Change──┐
//! submit() ──Change──┼──> mailbox ──> DispatcherState::handle ──Launch──> worker
//!                    │                                                    │
//!                    └──────────────────── Completed ─────────────────────┘
//! ```
//!
//! The actor loop is the only owner of [`DispatcherState`]; producers and
//! the worker talk to it through one unbounded mailbox. Changes that arrive
//! while a sync runs collapse into a single follow-up run.

mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::invoker::{CommandInvoker, Invoker, SyncCommand};
use super::messages::{ChangeEvent, DispatchMsg, InvocationResult};
use crate::config::ConfigError;
use crate::project::ProjectToWatch;
use crate::utils::date::now_millis;
use crate::{debug, log};

pub use state::{DispatcherState, Launch};

/// Error returned by [`DispatcherHandle::submit`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("project path is empty, ignoring file change event")]
    EmptyProjectPath,
    #[error("dispatcher has stopped")]
    Closed,
}

/// Entry point for creating dispatchers.
pub struct Dispatcher;

impl Dispatcher {
    /// Start a dispatcher that runs the configured sync command.
    ///
    /// Must be called within a Tokio runtime.
    pub fn spawn(command: SyncCommand) -> Result<DispatcherHandle, ConfigError> {
        let project_id = command.project_id.clone();
        let project_path = command.project_path.clone();
        let invoker = CommandInvoker::new(command)?;

        Ok(Self::with_invoker(&project_id, &project_path, Arc::new(invoker)))
    }

    /// Start a dispatcher driven by an arbitrary [`Invoker`].
    ///
    /// Must be called within a Tokio runtime.
    pub fn with_invoker(
        project_id: &str,
        project_path: &str,
        invoker: Arc<dyn Invoker>,
    ) -> DispatcherHandle {
        let project_id: Arc<str> = Arc::from(project_id);
        let (tx, rx) = mpsc::unbounded_channel();

        let actor = DispatcherActor::new(Arc::clone(&project_id), rx, tx.downgrade(), invoker);
        tokio::spawn(actor.run());

        DispatcherHandle {
            project_id,
            project_path: Arc::from(project_path),
            tx,
        }
    }
}

/// Cloneable producer side of one dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    project_id: Arc<str>,
    project_path: Arc<str>,
    tx: mpsc::UnboundedSender<DispatchMsg>,
}

impl DispatcherHandle {
    /// Report that files of the project changed. Never blocks.
    ///
    /// `timestamp` is a known timestamp for the project (ms), usually its
    /// creation time, or `0` if there is none.
    pub fn submit(
        &self,
        timestamp: i64,
        snapshot: Option<Arc<ProjectToWatch>>,
    ) -> Result<(), SubmitError> {
        if self.project_path.trim().is_empty() {
            log!("error"; "[{}] project path is empty, ignoring file change event", self.project_id);
            return Err(SubmitError::EmptyProjectPath);
        }

        self.tx
            .send(DispatchMsg::Change(ChangeEvent {
                timestamp,
                snapshot,
            }))
            .map_err(|_| SubmitError::Closed)
    }
}

/// Single consumer of a dispatcher mailbox.
pub struct DispatcherActor {
    rx: mpsc::UnboundedReceiver<DispatchMsg>,
    /// Handed to workers; weak so the loop ends once every handle is gone.
    tx: mpsc::WeakUnboundedSender<DispatchMsg>,
    invoker: Arc<dyn Invoker>,
    state: DispatcherState,
}

impl DispatcherActor {
    pub fn new(
        project_id: Arc<str>,
        rx: mpsc::UnboundedReceiver<DispatchMsg>,
        tx: mpsc::WeakUnboundedSender<DispatchMsg>,
        invoker: Arc<dyn Invoker>,
    ) -> Self {
        Self {
            rx,
            tx,
            invoker,
            state: DispatcherState::new(project_id),
        }
    }

    /// Process messages one at a time until every sender is dropped.
    ///
    /// An in-flight worker holds a sender, so a running sync always reports
    /// back before the loop ends.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            if let Some(launch) = self.state.handle(msg) {
                self.launch(launch);
            }
        }

        debug!(
            "sync";
            "[{}] dispatcher stopped at watermark {}",
            self.state.project_id(),
            self.state.last_watermark()
        );
    }

    /// Run the invoker off the loop; the worker only reports back.
    fn launch(&self, launch: Launch) {
        let project_id = self.state.project_id().to_string();
        // No handle left, so nobody can read the outcome
        let Some(reply) = self.tx.upgrade() else {
            debug!("sync"; "[{}] every handle dropped, skipping sync", project_id);
            return;
        };
        let invoker = Arc::clone(&self.invoker);

        debug!("sync"; "[{}] starting sync at watermark {}", project_id, launch.watermark);

        tokio::spawn(async move {
            let Launch {
                watermark,
                snapshot,
            } = launch;

            let result = match tokio::task::spawn_blocking(move || {
                invoker.execute(watermark, snapshot.as_deref())
            })
            .await
            {
                Ok(result) => result,
                Err(e) => {
                    log!("error"; "[{}] sync worker failed: {}", project_id, e);
                    InvocationResult::failure(None, e.to_string(), now_millis())
                }
            };

            let _ = reply.send(DispatchMsg::Completed(result));
        });
    }
}
