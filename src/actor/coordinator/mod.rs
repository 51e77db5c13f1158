//! Coordinator - wires projects to dispatchers and watchers
//!
//! For every configured project:
//! - one [`Dispatcher`] (single-flight is per project)
//! - one [`FsWatcher`] feeding it
//! - one initial change carrying the project's creation time, so changes
//!   made while nothing was watching are synced at startup

mod runtime;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;

use super::dispatcher::Dispatcher;
use super::fs::FsWatcher;
use crate::config::{ProjectSection, SyncConfig};

/// Coordinator - builds and runs one dispatcher/watcher pair per project.
pub struct Coordinator {
    config: Arc<SyncConfig>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<SyncConfig>) -> Self {
        Self {
            config,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Start every project, then run until shutdown.
    ///
    /// Must be called within a Tokio runtime.
    pub async fn run(mut self) -> Result<()> {
        let debounce = Duration::from_millis(self.config.sync.debounce_ms);

        let mut watchers = Vec::with_capacity(self.config.projects.len());
        for project in &self.config.projects {
            let watcher = self
                .start_project(project, debounce)
                .with_context(|| format!("failed to start project `{}`", project.id))?;
            watchers.push(watcher);
        }

        crate::log!("watch"; "watching {} project(s), press Ctrl+C to stop", watchers.len());
        runtime::run_watchers(watchers, self.shutdown_rx.take()).await;
        crate::debug!("watch"; "stopped");
        Ok(())
    }

    fn start_project(&self, project: &ProjectSection, debounce: Duration) -> Result<FsWatcher> {
        let dispatcher = Dispatcher::spawn(self.config.sync_command(&project.id, &project.path))?;
        let snapshot = Arc::new(project.to_watch());

        // Watch first so nothing slips between the initial sync and the watch
        let watcher = FsWatcher::new(
            project.watch_paths(),
            &project.root(),
            Arc::clone(&snapshot),
            dispatcher.clone(),
            debounce,
        )
        .context("watcher failed")?;

        dispatcher.submit(project.creation_time, Some(snapshot))?;
        crate::debug!("watch"; "[{}] started: {}", project.id, project.path);

        Ok(watcher)
    }
}
