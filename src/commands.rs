//! Tauri command handlers
//!
//! Invoked from the embedded content surface via `window.__TAURI__.invoke()`.
//! The surface is a plain value-passing boundary: it receives the persisted
//! target URL and a `load-url` event whenever it changes.

use std::sync::atomic::Ordering;

use log::{error, info};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

use crate::mode::{self, AppContext, WindowMode};
use crate::settings;

/// Configuration snapshot handed to the webview on startup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub target_url: Option<String>,
    pub window_mode: WindowMode,
}

/// A target URL must be a well-formed http(s) URL.
pub fn validate_target_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("Invalid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("Unsupported URL scheme: {}", other)),
    }
}

#[tauri::command]
pub fn get_config(app: AppHandle) -> WidgetConfig {
    let ctx = app.state::<AppContext>();
    let settings = settings::load(&ctx.settings_path);
    WidgetConfig {
        target_url: settings.target_url,
        window_mode: settings.window_mode,
    }
}

#[tauri::command]
pub fn save_target_url(app: AppHandle, url: String) -> Result<(), String> {
    info!("[command:save_target_url] {}", url);
    validate_target_url(&url)?;

    let ctx = app.state::<AppContext>();
    settings::update(&ctx.settings_path, |s| s.target_url = Some(url.clone()));

    if let Some(window) = app.get_webview_window(mode::MAIN_WINDOW) {
        window.emit("load-url", Some(url)).map_err(|e| {
            error!("[command:save_target_url] Failed to emit load-url: {}", e);
            format!("Failed to emit load-url: {}", e)
        })?;
    }
    Ok(())
}

/// Drop the persisted target URL and tell the webview to fall back to the
/// setup screen. Shared by the `clear_target_url` command and the tray's
/// Reset Workspace entry.
pub fn reset_workspace(app: &AppHandle) {
    let ctx = app.state::<AppContext>();
    settings::update(&ctx.settings_path, |s| s.target_url = None);
    if let Some(window) = app.get_webview_window(mode::MAIN_WINDOW) {
        let _ = window.emit("load-url", Option::<String>::None);
    }
}

#[tauri::command]
pub fn clear_target_url(app: AppHandle) {
    info!("[command:clear_target_url] Resetting workspace");
    reset_workspace(&app);
}

#[tauri::command]
pub fn set_window_mode(app: AppHandle, new_mode: WindowMode) {
    info!("[command:set_window_mode] {:?}", new_mode);
    mode::set_mode(&app, new_mode);
}

#[tauri::command]
pub fn close_app(app: AppHandle) {
    info!("[command:close_app] Quit requested from frontend");
    app.state::<AppContext>()
        .poller_shutdown
        .store(true, Ordering::SeqCst);
    app.exit(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_target_url() {
        assert!(validate_target_url("https://example.com").is_ok());
        assert!(validate_target_url("http://example.com/board?id=1").is_ok());
        assert!(validate_target_url("ftp://example.com").is_err());
        assert!(validate_target_url("javascript:alert(1)").is_err());
        assert!(validate_target_url("not a url").is_err());
    }
}
