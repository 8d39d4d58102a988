// Calm Browsing Buddy platform paths
// Resolves where the persisted state file lives on Windows, macOS, and Linux.

use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Overrides the directory holding `state.json`.
pub const DATA_DIR_ENV: &str = "CALM_BUDDY_DATA_DIR";
/// File name of the persisted settings, whitelist and stats.
pub const STATE_FILE_NAME: &str = "state.json";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/calm-buddy` (or `$XDG_CONFIG_HOME/calm-buddy`)
/// - **macOS**: `~/Library/Application Support/CalmBuddy`
/// - **Windows**: `%APPDATA%/CalmBuddy`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Path of the state file: `$CALM_BUDDY_DATA_DIR/state.json` when set,
/// otherwise inside [`get_config_dir`].
pub fn state_file_path() -> PathBuf {
    state_file_in(std::env::var(DATA_DIR_ENV).ok().as_deref())
}

fn state_file_in(data_dir: Option<&str>) -> PathBuf {
    match data_dir {
        Some(dir) if !dir.is_empty() => Path::new(dir).join(STATE_FILE_NAME),
        _ => get_config_dir().join(STATE_FILE_NAME),
    }
}
