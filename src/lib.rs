//! Sticky Widget
//!
//! Tauri backend for a persistent desktop companion widget. Keeps the widget
//! window pinned to the desktop wallpaper layer (widget mode) or floating
//! above all windows (overlay mode), with a tray menu to switch between the
//! two. The anchoring core lives in `window_anchor`; `foreground` and
//! `watchdog` keep the anchor invariant alive against the shell.

#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

mod commands;
mod foreground;
mod mode;
mod settings;
mod tray;
mod watchdog;
mod window_anchor;

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use log::info;
use tauri::Manager;

pub use commands::*;
pub use mode::{AppContext, WindowMode};

/// Main entry point
pub fn main() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, args, _cwd| {
            info!("Second launch detected (args: {:?}); showing existing window", args);
            if let Some(window) = app.get_webview_window(mode::MAIN_WINDOW) {
                let _ = window.show();
            }
            // Heal through the same restore/anchor path the poller and
            // watchdog use, in case the widget was minimized or de-anchored.
            let handle = app.clone();
            let _ = app.run_on_main_thread(move || mode::enforce_widget_visibility(&handle));
        }))
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(if cfg!(debug_assertions) {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                })
                .build(),
        )
        .setup(|app| {
            info!("Starting Sticky Widget v{}", env!("CARGO_PKG_VERSION"));
            let handle = app.handle().clone();

            let settings_path = settings::settings_path(&handle)?;
            let persisted = settings::load(&settings_path);
            info!(
                "Loaded settings: mode={:?} bounds={:?} url={:?}",
                persisted.window_mode, persisted.bounds, persisted.target_url
            );

            let poller_shutdown = Arc::new(AtomicBool::new(false));
            app.manage(AppContext {
                mode: Mutex::new(persisted.window_mode),
                settings_path,
                poller_shutdown: poller_shutdown.clone(),
            });

            if let Err(e) = tray::setup_tray(&handle) {
                log::error!("Failed to setup system tray: {}", e);
            }

            mode::create_main_window(&handle, persisted.window_mode, persisted.bounds)?;

            // Both loops run for the lifetime of the app; each checks the
            // current mode before touching the window.
            foreground::start(handle.clone(), poller_shutdown.clone());
            watchdog::start(handle, poller_shutdown);

            info!("Application setup complete");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_config,
            commands::save_target_url,
            commands::clear_target_url,
            commands::set_window_mode,
            commands::close_app,
        ])
        .run(tauri::generate_context!())
        .expect("Error while running Sticky Widget");
}
