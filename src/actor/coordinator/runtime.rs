use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::actor::fs::FsWatcher;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Run all watchers until the shutdown signal (or until they all stop).
///
/// Running sync commands are not cancelled; they finish on their own
/// blocking threads.
pub(super) async fn run_watchers(watchers: Vec<FsWatcher>, shutdown_rx: Option<Receiver<()>>) {
    let mut handles: Vec<_> = watchers
        .into_iter()
        .map(|watcher| tokio::spawn(watcher.run()))
        .collect();

    match shutdown_rx {
        Some(rx) => loop {
            if rx.try_recv().is_ok() {
                crate::debug!("watch"; "shutdown signal received");
                break;
            }
            if handles.iter().all(|h| h.is_finished()) {
                break;
            }
            tokio::time::sleep(SHUTDOWN_POLL).await;
        },
        None => {
            for handle in &mut handles {
                let _ = handle.await;
            }
        }
    }

    for handle in handles {
        handle.abort();
    }
}
