// Graceful shutdown handling for signal trapping
//
// Signal handlers flip a shared flag that the server polls. Research runs
// hold a `RunGuard` while they execute so shutdown can report what is still
// in flight.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared shutdown state across the application
#[derive(Clone, Default)]
pub struct ShutdownState {
    /// Flag indicating shutdown has been requested
    shutdown_requested: Arc<AtomicBool>,
    /// Research runs currently executing
    active_runs: Arc<AtomicUsize>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a shutdown
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        log::info!("Shutdown requested");
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Track a research run until the returned guard is dropped
    pub fn begin_run(&self) -> RunGuard {
        self.active_runs.fetch_add(1, Ordering::SeqCst);
        RunGuard {
            active_runs: self.active_runs.clone(),
        }
    }

    /// Number of research runs currently executing
    pub fn active_runs(&self) -> usize {
        self.active_runs.load(Ordering::SeqCst)
    }
}

/// Marks one in-flight research run
pub struct RunGuard {
    active_runs: Arc<AtomicUsize>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.active_runs.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Register signal handlers for graceful shutdown
/// This sets up handlers for SIGINT (Ctrl+C), SIGTERM, and SIGHUP
#[cfg(unix)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
        .map_err(|e| anyhow::anyhow!("Failed to register signal handlers: {}", e))?;

    thread::spawn(move || {
        for signal in signals.forever() {
            let name = match signal {
                SIGINT => "SIGINT (Ctrl+C)",
                SIGTERM => "SIGTERM",
                SIGHUP => "SIGHUP",
                _ => continue,
            };
            log::info!(
                "Received {} with {} research run(s) in flight",
                name,
                state.active_runs()
            );
            state.request_shutdown();
        }
    });

    log::info!("Signal handlers registered (SIGINT, SIGTERM, SIGHUP)");
    Ok(())
}

/// Register signal handlers for Windows
#[cfg(windows)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!(
            "Received Ctrl+C with {} research run(s) in flight",
            state.active_runs()
        );
        state.request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("Failed to register Ctrl+C handler: {}", e))?;

    log::info!("Signal handler registered (Ctrl+C)");
    Ok(())
}
