//! Desktop anchoring — Win32 handle resolver and anchor operator.
//!
//! Reparents the widget window under the desktop's bare background container
//! (the WorkerW behind SHELLDLL_DefView) so it renders beneath other
//! application windows without joining the icon layer. Same family of
//! technique as Wallpaper Engine and Lively. The shell can rebuild its
//! hierarchy at any time, so callers re-assert the anchor on every cycle
//! rather than setting it once.
#![cfg(target_os = "windows")]

use log::debug;
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, FindWindowExW, FindWindowW, GetParent, GetWindowLongW, IsIconic, IsWindowVisible,
    SendMessageTimeoutW, SetParent, SetWindowLongW, SetWindowPos, ShowWindow, GWL_EXSTYLE,
    GWL_STYLE, SMTO_NORMAL, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    SW_SHOWNOACTIVATE, WS_CHILD, WS_CLIPSIBLINGS, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_POPUP,
};

/// Undocumented Progman message that forces creation of the wallpaper WorkerW.
const WM_SPAWN_WORKERW: u32 = 0x052C;

/// Locate our own top-level window by title. Fallback for when the webview
/// handle is not directly available.
pub fn find_own_window(title: &str) -> Option<HWND> {
    unsafe {
        FindWindowW(PCWSTR::null(), &HSTRING::from(title))
            .ok()
            .filter(|hwnd| !hwnd.is_invalid())
    }
}

struct LegacySearch {
    bare_worker: HWND,
}

/// EnumWindows callback for the pre-24H2 layout: the icon host owns
/// SHELLDLL_DefView, and the bare background layer is the WorkerW sibling
/// directly after it in the z-order.
unsafe extern "system" fn legacy_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let search = &mut *(lparam.0 as *mut LegacySearch);
    if let Ok(shell_view) = FindWindowExW(hwnd, HWND::default(), w!("SHELLDLL_DefView"), None) {
        if !shell_view.is_invalid() {
            if let Ok(worker) = FindWindowExW(HWND::default(), hwnd, w!("WorkerW"), None) {
                if !worker.is_invalid() && !has_shell_view(worker) {
                    search.bare_worker = worker;
                }
            }
            return BOOL(0);
        }
    }
    BOOL(1)
}

unsafe fn has_shell_view(hwnd: HWND) -> bool {
    FindWindowExW(hwnd, HWND::default(), w!("SHELLDLL_DefView"), None)
        .map(|child| !child.is_invalid())
        .unwrap_or(false)
}

/// Resolve the desktop's bare background container.
///
/// Sends the WorkerW spawn message to Progman, then probes the 24H2 layout
/// (icon layer and WorkerW both nested in Progman) before walking the legacy
/// sibling chain. Falls back to Progman itself; `None` means "skip anchoring
/// this cycle".
pub fn find_desktop_container() -> Option<HWND> {
    unsafe {
        let progman = FindWindowW(w!("Progman"), None)
            .ok()
            .filter(|hwnd| !hwnd.is_invalid())?;

        // Different Windows builds react to different wParam/lParam pairs;
        // send all three known variants.
        let mut msg_result: usize = 0;
        for (wparam, lparam) in [(0usize, 0isize), (0x0D, 0), (0x0D, 1)] {
            let _ = SendMessageTimeoutW(
                progman,
                WM_SPAWN_WORKERW,
                WPARAM(wparam),
                LPARAM(lparam),
                SMTO_NORMAL,
                1000,
                Some(&mut msg_result),
            );
        }

        let shell_view = FindWindowExW(progman, HWND::default(), w!("SHELLDLL_DefView"), None)
            .unwrap_or(HWND::default());
        let nested_worker =
            FindWindowExW(progman, HWND::default(), w!("WorkerW"), None).unwrap_or(HWND::default());
        if !shell_view.is_invalid() && !nested_worker.is_invalid() {
            debug!("Desktop container: WorkerW nested in Progman (24H2 layout)");
            return Some(nested_worker);
        }

        let mut search = LegacySearch {
            bare_worker: HWND::default(),
        };
        let _ = EnumWindows(
            Some(legacy_cb),
            LPARAM(&mut search as *mut LegacySearch as isize),
        );
        if !search.bare_worker.is_invalid() {
            debug!("Desktop container: WorkerW sibling of icon host (legacy layout)");
            return Some(search.bare_worker);
        }

        debug!("Desktop container: falling back to Progman");
        Some(progman)
    }
}

/// Anchor the window under the desktop background container.
///
/// Applied in strict order: child/clip style bits, tool-window/no-activate
/// extended bits, reparent, then a no-op move that re-asserts the stacking
/// order. Idempotent; repeated calls on a correctly anchored window leave
/// its observable state unchanged.
pub fn anchor(own: HWND, container: HWND) -> Result<(), String> {
    unsafe {
        // DWM rule: a reparented window must be a clipped child window.
        let style = GetWindowLongW(own, GWL_STYLE);
        let new_style =
            (style & !(WS_POPUP.0 as i32)) | WS_CHILD.0 as i32 | WS_CLIPSIBLINGS.0 as i32;
        if new_style != style {
            SetWindowLongW(own, GWL_STYLE, new_style);
        }

        let ex_style = GetWindowLongW(own, GWL_EXSTYLE);
        let new_ex = ex_style | WS_EX_TOOLWINDOW.0 as i32 | WS_EX_NOACTIVATE.0 as i32;
        if new_ex != ex_style {
            SetWindowLongW(own, GWL_EXSTYLE, new_ex);
        }

        if GetParent(own) != Ok(container) {
            SetParent(own, container).map_err(|e| format!("SetParent failed: {}", e))?;
        }

        SetWindowPos(
            own,
            HWND::default(),
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_FRAMECHANGED,
        )
        .map_err(|e| format!("SetWindowPos failed: {}", e))?;
    }
    Ok(())
}

pub fn is_minimized_or_hidden(own: HWND) -> bool {
    unsafe { IsIconic(own).as_bool() || !IsWindowVisible(own).as_bool() }
}

/// Restore and show the window without stealing input focus.
pub fn show_without_activating(own: HWND) {
    unsafe {
        let _ = ShowWindow(own, SW_SHOWNOACTIVATE);
    }
}
