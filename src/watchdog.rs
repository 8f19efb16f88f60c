//! Visibility Watchdog — periodic backstop for the anchoring invariant.
//!
//! Global "show desktop" or "minimize all" gestures can hide the widget
//! without ever changing the foreground window in a way the poller would
//! catch. This timer re-runs the shared restore/anchor path on its own
//! schedule so the window always heals within one tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tauri::AppHandle;

use crate::mode;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the watchdog thread. Runs until the shutdown flag is set.
pub fn start(app: AppHandle, shutdown: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        info!(
            "Visibility watchdog started ({}s period)",
            TICK_INTERVAL.as_secs()
        );

        while !shutdown.load(Ordering::SeqCst) {
            std::thread::sleep(TICK_INTERVAL);
            let handle = app.clone();
            let _ = app.run_on_main_thread(move || mode::enforce_widget_visibility(&handle));
        }

        info!("Visibility watchdog stopped");
    });
}
