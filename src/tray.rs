//! System tray — mode selection, workspace reset, quit.

use std::sync::atomic::Ordering;

use log::{debug, info};
use tauri::{
    image::Image,
    menu::{CheckMenuItem, CheckMenuItemBuilder, MenuBuilder, MenuItemBuilder},
    tray::{TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager, Wry,
};

use crate::commands;
use crate::mode::{self, AppContext, WindowMode};

/// Handles to the mode check items, kept in managed state so every mode
/// transition path can update the menu, not just clicks on the menu itself.
pub struct TrayMenu {
    widget_item: CheckMenuItem<Wry>,
    overlay_item: CheckMenuItem<Wry>,
}

fn checked_states(mode: WindowMode) -> (bool, bool) {
    (mode == WindowMode::Widget, mode == WindowMode::Overlay)
}

/// Set both mode checkmarks to reflect `mode`. No-op before the tray exists.
pub fn sync_mode_checkmarks(app: &AppHandle, mode: WindowMode) {
    if let Some(tray_menu) = app.try_state::<TrayMenu>() {
        let (widget, overlay) = checked_states(mode);
        let _ = tray_menu.widget_item.set_checked(widget);
        let _ = tray_menu.overlay_item.set_checked(overlay);
    }
}

/// Setup the system tray with icon, mode toggles, reset, and quit.
pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    info!("Setting up system tray...");

    let current = app.state::<AppContext>().current_mode();
    let (widget_checked, overlay_checked) = checked_states(current);

    let icon = Image::from_bytes(include_bytes!("../icons/32x32.png"))
        .unwrap_or_else(|_| Image::new_owned(vec![255u8; 32 * 32 * 4], 32, 32));

    let widget_item =
        CheckMenuItemBuilder::with_id("mode_widget", "Stick to Wallpaper (Widget Mode)")
            .checked(widget_checked)
            .build(app)?;
    let overlay_item = CheckMenuItemBuilder::with_id("mode_overlay", "Float Above (Overlay Mode)")
        .checked(overlay_checked)
        .build(app)?;
    let reset_item = MenuItemBuilder::with_id("reset", "Reset Workspace").build(app)?;
    let quit_item = MenuItemBuilder::with_id("quit", "Quit").build(app)?;

    let menu = MenuBuilder::new(app)
        .item(&widget_item)
        .item(&overlay_item)
        .separator()
        .item(&reset_item)
        .separator()
        .item(&quit_item)
        .build()?;

    app.manage(TrayMenu {
        widget_item,
        overlay_item,
    });

    let _tray = TrayIconBuilder::new()
        .icon(icon)
        .tooltip("Sticky Widget")
        .menu(&menu)
        .on_menu_event(move |app, event| match event.id().as_ref() {
            "mode_widget" => mode::set_mode(app, WindowMode::Widget),
            "mode_overlay" => mode::set_mode(app, WindowMode::Overlay),
            "reset" => {
                info!("Tray: resetting workspace");
                commands::reset_workspace(app);
            }
            "quit" => {
                info!("Quit triggered from tray");
                app.state::<AppContext>()
                    .poller_shutdown
                    .store(true, Ordering::SeqCst);
                app.exit(0);
            }
            _ => {}
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click { button, .. } = event {
                if button == tauri::tray::MouseButton::Left {
                    debug!("Tray icon clicked");
                    let app = tray.app_handle();
                    if let Some(window) = app.get_webview_window(mode::MAIN_WINDOW) {
                        let _ = window.show();
                    }
                    mode::enforce_widget_visibility(app);
                }
            }
        })
        .build(app)?;

    info!("System tray setup complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkmarks_follow_mode() {
        assert_eq!(checked_states(WindowMode::Widget), (true, false));
        assert_eq!(checked_states(WindowMode::Overlay), (false, true));
    }
}
