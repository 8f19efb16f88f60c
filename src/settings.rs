//! Persisted settings — window mode, bounds, target URL.
//!
//! One JSON record under the app config dir, read fully at startup and
//! read-modify-written on every change. Last writer wins. A failed read
//! falls back to defaults; a failed write is logged and dropped.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tauri::Manager;
use thiserror::Error;

use crate::mode::WindowMode;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Widget window geometry, restored at next launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            x: 50,
            y: 100,
            w: 1200,
            h: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub window_mode: WindowMode,
    pub bounds: WindowBounds,
    pub target_url: Option<String>,
}

/// Resolve the settings file path under the app config dir.
pub fn settings_path(app: &tauri::AppHandle) -> tauri::Result<PathBuf> {
    let dir = app.path().app_config_dir()?;
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!("Could not create config dir {}: {}", dir.display(), e);
    }
    Ok(dir.join("settings.json"))
}

/// Load settings, falling back to defaults on any failure.
pub fn load(path: &Path) -> Settings {
    match read(path) {
        Ok(settings) => settings,
        Err(e) => {
            debug!("Using default settings ({})", e);
            Settings::default()
        }
    }
}

fn read(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path)?;
    let mut value: Value = serde_json::from_str(&raw)?;
    migrate_legacy_url(&mut value);
    Ok(serde_json::from_value(value)?)
}

/// Best-effort migration of the deprecated `url` field to `targetUrl`.
fn migrate_legacy_url(value: &mut Value) {
    let Some(record) = value.as_object_mut() else {
        return;
    };
    if record.get("targetUrl").map_or(true, Value::is_null) {
        if let Some(legacy @ Value::String(_)) = record.remove("url") {
            record.insert("targetUrl".to_string(), legacy);
        }
    } else {
        record.remove("url");
    }
}

/// Read-modify-write: apply `change` to the current on-disk record and
/// persist the result. Returns the updated record.
pub fn update(path: &Path, change: impl FnOnce(&mut Settings)) -> Settings {
    let mut settings = load(path);
    change(&mut settings);
    save(path, &settings);
    settings
}

/// Persist the full record, best-effort.
pub fn save(path: &Path, settings: &Settings) {
    let json = match serde_json::to_string_pretty(settings) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize settings: {}", e);
            return;
        }
    };
    if let Err(e) = fs::write(path, json) {
        warn!("Failed to write settings to {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn temp_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "sticky-widget-test-{}-{}-{}.json",
            std::process::id(),
            tag,
            n
        ))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load(Path::new("/nonexistent/sticky-widget-settings.json"));
        assert_eq!(settings.window_mode, WindowMode::Widget);
        assert_eq!(
            settings.bounds,
            WindowBounds {
                x: 50,
                y: 100,
                w: 1200,
                h: 600
            }
        );
        assert_eq!(settings.target_url, None);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(load(&path), Settings::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn round_trip() {
        let path = temp_path("roundtrip");
        let original = Settings {
            window_mode: WindowMode::Overlay,
            bounds: WindowBounds {
                x: 10,
                y: 20,
                w: 800,
                h: 400,
            },
            target_url: Some("https://example.com/board".to_string()),
        };
        save(&path, &original);
        assert_eq!(load(&path), original);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn legacy_url_field_is_migrated() {
        let path = temp_path("legacy");
        fs::write(&path, r#"{"url": "https://example.com/legacy"}"#).unwrap();
        let settings = load(&path);
        assert_eq!(
            settings.target_url.as_deref(),
            Some("https://example.com/legacy")
        );
        assert_eq!(settings.window_mode, WindowMode::Widget);
        assert_eq!(settings.bounds, WindowBounds::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn current_field_wins_over_legacy() {
        let path = temp_path("both-fields");
        fs::write(
            &path,
            r#"{"targetUrl": "https://example.com/new", "url": "https://example.com/old"}"#,
        )
        .unwrap();
        assert_eq!(
            load(&path).target_url.as_deref(),
            Some("https://example.com/new")
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn update_preserves_other_fields() {
        let path = temp_path("update");
        save(
            &path,
            &Settings {
                window_mode: WindowMode::Overlay,
                bounds: WindowBounds {
                    x: 1,
                    y: 2,
                    w: 300,
                    h: 400,
                },
                target_url: Some("https://example.com".to_string()),
            },
        );
        update(&path, |s| s.bounds.x = 42);
        let settings = load(&path);
        assert_eq!(settings.bounds.x, 42);
        assert_eq!(settings.bounds.h, 400);
        assert_eq!(settings.window_mode, WindowMode::Overlay);
        assert_eq!(settings.target_url.as_deref(), Some("https://example.com"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&WindowMode::Widget).unwrap(),
            "\"widget\""
        );
        assert_eq!(
            serde_json::to_string(&WindowMode::Overlay).unwrap(),
            "\"overlay\""
        );
    }
}
