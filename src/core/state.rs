//! Process-wide shutdown state.
//!
//! `watch` runs until Ctrl+C. The handler is installed once at startup;
//! the coordinator registers a channel to be told when to stop.

use std::sync::OnceLock;

use crossbeam::channel::Sender;

/// Shutdown signal sender for the watch coordinator
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// Before [`register_shutdown`] the process exits right away; afterwards
/// the registered coordinator is asked to stop.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if !request_shutdown() {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the channel notified on Ctrl+C. Only the first call wins.
pub fn register_shutdown(tx: Sender<()>) {
    let _ = SHUTDOWN_TX.set(tx);
}

/// Signal the registered listener; `false` if nobody is listening.
fn request_shutdown() -> bool {
    match SHUTDOWN_TX.get() {
        Some(tx) => {
            crate::log!("watch"; "shutting down...");
            // A pending signal is as good as a new one
            let _ = tx.try_send(());
            true
        }
        None => false,
    }
}
