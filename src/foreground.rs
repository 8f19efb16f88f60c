//! Foreground Poller — detects when the user reveals the desktop.
//!
//! A background thread samples the focused window's class name at a fixed
//! interval and classifies it against a small allow-list of desktop-shell
//! classes. Matches fire the shared restore/anchor path as a fire-and-forget
//! closure marshaled onto the main thread; the poller itself never mutates
//! window state. Repeated matches while the user dwells on the desktop are
//! expected and handled idempotently downstream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tauri::AppHandle;

/// Fixed sampling interval for the foreground window class.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Native window classes used by the Windows desktop background/icon layer.
pub const DESKTOP_SHELL_CLASSES: [&str; 3] = ["WorkerW", "Progman", "SysListView32"];

/// Classify a window class name as desktop shell. Exact, case-sensitive.
pub fn is_desktop_shell_class(class: &str) -> bool {
    DESKTOP_SHELL_CLASSES.contains(&class)
}

#[cfg(target_os = "windows")]
fn foreground_window_class() -> Option<String> {
    use windows::Win32::UI::WindowsAndMessaging::{GetClassNameW, GetForegroundWindow};

    unsafe {
        let foreground = GetForegroundWindow();
        if foreground.is_invalid() {
            return None;
        }
        let mut buf = [0u16; 256];
        let len = GetClassNameW(foreground, &mut buf);
        if len > 0 {
            Some(String::from_utf16_lossy(&buf[..len as usize]))
        } else {
            None
        }
    }
}

#[cfg(target_os = "windows")]
fn poll_once(app: &AppHandle) {
    if let Some(class) = foreground_window_class() {
        if is_desktop_shell_class(&class) {
            let handle = app.clone();
            let _ =
                app.run_on_main_thread(move || crate::mode::enforce_widget_visibility(&handle));
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn poll_once(_app: &AppHandle) {}

/// Spawn the poller thread. Runs from startup until the shutdown flag is
/// set. If the thread dies, detection signals simply stop and the visibility
/// watchdog remains the sole backstop.
pub fn start(app: AppHandle, shutdown: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        info!(
            "Foreground poller started ({}ms interval)",
            POLL_INTERVAL.as_millis()
        );

        while !shutdown.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);
            poll_once(&app);
        }

        info!("Foreground poller stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_shell_classes_match() {
        assert!(is_desktop_shell_class("WorkerW"));
        assert!(is_desktop_shell_class("Progman"));
        assert!(is_desktop_shell_class("SysListView32"));
    }

    #[test]
    fn application_classes_do_not_match() {
        assert!(!is_desktop_shell_class("Chrome_WidgetWin_1"));
        assert!(!is_desktop_shell_class("CabinetWClass"));
        assert!(!is_desktop_shell_class("Notepad"));
        assert!(!is_desktop_shell_class(""));
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert!(!is_desktop_shell_class("workerw"));
        assert!(!is_desktop_shell_class("PROGMAN"));
    }
}
