// Prevents additional console window on Windows in release
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

fn main() {
    // Keep WebView2 rendering while parented behind the desktop icon layer:
    // Chromium otherwise treats the occluded window as invisible and
    // suspends painting and event delivery.
    std::env::set_var(
        "WEBVIEW2_ADDITIONAL_BROWSER_ARGUMENTS",
        "--disable-features=CalculateNativeWinOcclusion,CalculateWindowOcclusion --disable-backgrounding-occluded-windows"
    );

    sticky_widget_lib::main();
}
