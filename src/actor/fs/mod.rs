//! FileSystem Watcher
//!
//! Watches one project's roots and submits a change to its dispatcher once
//! per settled burst of file events.
//!
//! ```text
//! notify → Debouncer (quiet window) → ignore rules → DispatcherHandle::submit(0, snapshot)
//! ```
//!
//! The watcher only says *that* something changed. The sync command works
//! out *what* changed since the watermark on its own.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;

use super::dispatcher::{DispatcherHandle, SubmitError};
use crate::project::{ProjectToWatch, is_ignored};
use crate::utils::path::normalize_path;

mod debouncer;
mod types;
mod watch_roots;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
use types::ChangeKind;
use watch_roots::WatchRoots;

/// How often missing or vanished roots are checked, busy or idle.
const REATTACH_INTERVAL: Duration = Duration::from_secs(1);

/// File watcher for a single project.
pub struct FsWatcher {
    /// notify callback channel (sync side)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow
    watcher: RecommendedWatcher,
    roots: WatchRoots,
    debouncer: Debouncer,
    /// Normalized project root, base for `ignored_paths`
    root: PathBuf,
    project: Arc<ProjectToWatch>,
    dispatcher: DispatcherHandle,
}

impl FsWatcher {
    /// Start watching right away; events buffer until [`FsWatcher::run`].
    pub fn new(
        paths: Vec<PathBuf>,
        root: &Path,
        project: Arc<ProjectToWatch>,
        dispatcher: DispatcherHandle,
        debounce: Duration,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut roots = WatchRoots::new(paths);
        roots.attach(&mut watcher)?;
        for path in roots.missing() {
            crate::log!("watch"; "[{}] not found yet, will attach later: {}", project.project_id, path.display());
        }
        crate::debug!("watch"; "[{}] {} root(s) attached", project.project_id, roots.attached());

        Ok(Self {
            notify_rx,
            watcher,
            roots,
            debouncer: Debouncer::new(debounce),
            root: normalize_path(root),
            project,
            dispatcher,
        })
    }

    /// Run until the dispatcher goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut roots,
            mut debouncer,
            root,
            project,
            dispatcher,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // notify delivers on its own thread; bridge into the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut reattach = tokio::time::interval(REATTACH_INTERVAL);
        reattach.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = reattach.tick() => {
                    match roots.attach(&mut watcher) {
                        Ok(0) => {}
                        Ok(n) => crate::debug!("watch"; "[{}] {} root(s) re-attached", project.project_id, n),
                        Err(e) => crate::log!("watch"; "[{}] unable to re-attach watch: {}", project.project_id, e),
                    }
                }
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    if flush(changes, &root, &project, &dispatcher) == Err(SubmitError::Closed) {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "[{}] watcher stopped", project.project_id);
    }
}

/// Submit one settled burst, unless every change in it is ignored.
fn flush(
    changes: Vec<(PathBuf, ChangeKind)>,
    root: &Path,
    project: &Arc<ProjectToWatch>,
    dispatcher: &DispatcherHandle,
) -> Result<(), SubmitError> {
    let relevant = relevant_changes(changes, root, project);
    if relevant.is_empty() {
        return Ok(());
    }

    crate::log!(
        "watch";
        "[{}] {} file change(s), first: {} {}",
        project.project_id,
        relevant.len(),
        relevant[0].1.label(),
        relevant[0].0.display()
    );

    dispatcher.submit(0, Some(Arc::clone(project)))
}

/// Drop changes matched by the project's ignore rules; sorted by path.
fn relevant_changes(
    changes: Vec<(PathBuf, ChangeKind)>,
    root: &Path,
    project: &ProjectToWatch,
) -> Vec<(PathBuf, ChangeKind)> {
    let mut relevant: Vec<_> = changes
        .into_iter()
        .filter(|(path, _)| !is_ignored(path, root, project))
        .collect();
    relevant.sort_by(|a, b| a.0.cmp(&b.0));
    relevant
}
