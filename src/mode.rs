//! Mode Controller — owns the widget/overlay mode flag and the window
//! lifecycle.
//!
//! The two modes need incompatible native window configurations (anchored
//! child vs. always-on-top top-level), so switching destroys and recreates
//! the window instead of patching styles in place.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tauri::{
    AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder, WindowEvent,
};

use crate::settings::{self, WindowBounds};
use crate::tray;
#[cfg(target_os = "windows")]
use crate::window_anchor;

pub const MAIN_WINDOW: &str = "main";
pub const WINDOW_TITLE: &str = "Sticky Widget";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Anchored to the desktop background, never minimized, never on top.
    #[default]
    Widget,
    /// Ordinary top-level window floating above everything, no anchoring.
    Overlay,
}

impl WindowMode {
    pub fn always_on_top(self) -> bool {
        matches!(self, WindowMode::Overlay)
    }
}

/// Shared application context: mode flag, settings location, poller shutdown
/// flag. Managed by Tauri state; lifecycle tied to app start/stop.
pub struct AppContext {
    pub mode: Mutex<WindowMode>,
    pub settings_path: PathBuf,
    pub poller_shutdown: Arc<AtomicBool>,
}

impl AppContext {
    pub fn current_mode(&self) -> WindowMode {
        *self.mode.lock().unwrap()
    }
}

/// Create the widget window configured for `mode` and wire up its event
/// handlers. In widget mode the window is anchored immediately after showing.
pub fn create_main_window(
    app: &AppHandle,
    mode: WindowMode,
    bounds: WindowBounds,
) -> tauri::Result<WebviewWindow> {
    info!(
        "Creating main window: mode={:?} {}x{} at ({}, {})",
        mode, bounds.w, bounds.h, bounds.x, bounds.y
    );

    let window = WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::App("index.html".into()))
        .title(WINDOW_TITLE)
        .inner_size(bounds.w as f64, bounds.h as f64)
        .position(bounds.x as f64, bounds.y as f64)
        .decorations(false)
        .transparent(true)
        .skip_taskbar(true)
        .always_on_top(mode.always_on_top())
        .visible(false)
        .build()?;

    let handle = app.clone();
    let event_window = window.clone();
    window.on_window_event(move |event| handle_window_event(&handle, &event_window, event));

    let _ = window.show();

    if mode == WindowMode::Widget {
        enforce_widget_visibility(app);
    }

    Ok(window)
}

/// Persist bounds on move/resize and veto minimize attempts in widget mode.
/// `window` is the window the event was delivered for; a lookup by label
/// would race against the recreated window during a mode switch.
fn handle_window_event(app: &AppHandle, window: &WebviewWindow, event: &WindowEvent) {
    let ctx = app.state::<AppContext>();
    let minimized = window.is_minimized().unwrap_or(false);

    match event {
        WindowEvent::Moved(position) if !minimized => {
            let (x, y) = (position.x, position.y);
            settings::update(&ctx.settings_path, |s| {
                s.bounds.x = x;
                s.bounds.y = y;
            });
        }
        WindowEvent::Resized(size) => {
            if minimized {
                // The widget is never allowed to minimize away: restore it
                // without focus and re-assert the anchor.
                if ctx.current_mode() == WindowMode::Widget {
                    debug!("Minimize attempt vetoed in widget mode");
                    enforce_widget_visibility(app);
                }
            } else if size.width > 0 && size.height > 0 {
                let (w, h) = (size.width, size.height);
                settings::update(&ctx.settings_path, |s| {
                    s.bounds.w = w;
                    s.bounds.h = h;
                });
            }
        }
        _ => {}
    }
}

/// Switch modes: persist the new mode, then destroy and recreate the window
/// with the target configuration. No-op when the mode is unchanged.
pub fn set_mode(app: &AppHandle, new_mode: WindowMode) {
    let ctx = app.state::<AppContext>();
    {
        let mut mode = ctx.mode.lock().unwrap();
        if *mode == new_mode {
            // A click on the already-active menu item still flips the native
            // checkmark; put it back.
            tray::sync_mode_checkmarks(app, new_mode);
            return;
        }
        *mode = new_mode;
    }
    tray::sync_mode_checkmarks(app, new_mode);

    info!("Switching window mode to {:?}", new_mode);
    let saved = settings::update(&ctx.settings_path, |s| s.window_mode = new_mode);

    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        if let Err(e) = window.destroy() {
            warn!("Failed to destroy window for mode switch: {}", e);
        }
    }
    if let Err(e) = create_main_window(app, new_mode, saved.bounds) {
        warn!("Failed to recreate window in {:?} mode: {}", new_mode, e);
    }
}

/// Restore-and-anchor path shared by the foreground poller, the visibility
/// watchdog and the minimize veto. Must run on the main thread; every step
/// is idempotent, so redundant back-to-back invocations are harmless.
pub fn enforce_widget_visibility(app: &AppHandle) {
    let ctx = app.state::<AppContext>();
    if ctx.current_mode() != WindowMode::Widget {
        return;
    }
    let Some(window) = app.get_webview_window(MAIN_WINDOW) else {
        return;
    };

    #[cfg(target_os = "windows")]
    {
        use windows::Win32::Foundation::HWND;

        let own = match window.hwnd() {
            Ok(hwnd) => HWND(hwnd.0 as *mut core::ffi::c_void),
            Err(_) => match window_anchor::find_own_window(WINDOW_TITLE) {
                Some(hwnd) => hwnd,
                None => {
                    warn!("Own window handle not found; skipping anchor this cycle");
                    return;
                }
            },
        };

        if window_anchor::is_minimized_or_hidden(own) {
            window_anchor::show_without_activating(own);
        }

        match window_anchor::find_desktop_container() {
            Some(container) => {
                if let Err(e) = window_anchor::anchor(own, container) {
                    warn!("Anchor failed, will retry next cycle: {}", e);
                }
            }
            None => debug!("Desktop container not found; skipping anchor this cycle"),
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        // No desktop layer to anchor to; just keep the window visible.
        if window.is_minimized().unwrap_or(false) {
            let _ = window.unminimize();
            let _ = window.show();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_widget() {
        assert_eq!(WindowMode::default(), WindowMode::Widget);
    }

    #[test]
    fn only_overlay_is_always_on_top() {
        assert!(!WindowMode::Widget.always_on_top());
        assert!(WindowMode::Overlay.always_on_top());
    }

    #[test]
    fn context_reports_current_mode() {
        let ctx = AppContext {
            mode: Mutex::new(WindowMode::Overlay),
            settings_path: std::env::temp_dir().join("sticky-widget-ctx-test.json"),
            poller_shutdown: Arc::new(AtomicBool::new(false)),
        };
        assert_eq!(ctx.current_mode(), WindowMode::Overlay);
        *ctx.mode.lock().unwrap() = WindowMode::Widget;
        assert_eq!(ctx.current_mode(), WindowMode::Widget);
    }
}
