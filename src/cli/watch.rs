//! `syncwatch watch` - watch every configured project until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::actor::Coordinator;
use crate::config::SyncConfig;
use crate::core::register_shutdown;

/// How long exit waits for running sync commands.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub fn watch_projects(config: Arc<SyncConfig>) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
    register_shutdown(shutdown_tx);

    let result = rt.block_on(
        Coordinator::with_config(config)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    );

    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
