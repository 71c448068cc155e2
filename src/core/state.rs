//! Process-wide shutdown state for watch mode.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{Receiver, Sender, bounded};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Wakes the watch loop when shutdown is requested
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// Before `register_shutdown()` the handler exits immediately, since a
/// one-shot build has nothing to wind down. Afterwards it sets the flag and
/// wakes the registered receiver so the current pass can finish.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        match SHUTDOWN_TX.get() {
            Some(tx) => {
                crate::log!("watch"; "shutting down...");
                let _ = tx.try_send(());
            }
            None => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register interest in shutdown and get the receiving end of the signal.
///
/// Only the first call creates the channel; later calls get `None`.
pub fn register_shutdown() -> Option<Receiver<()>> {
    let (tx, rx) = bounded(1);
    SHUTDOWN_TX.set(tx).ok().map(|_| rx)
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
