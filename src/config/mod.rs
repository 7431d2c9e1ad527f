pub mod settings;

use std::path::PathBuf;

const APP_DIR: &str = "com.codesage.app";

/// Platform-specific application data directory.
/// `CODESAGE_DATA_DIR` takes precedence when set.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("CODESAGE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_DIR);
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_DIR);
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_DIR);
            return dir;
        }
    }

    // Fallback
    PathBuf::from("data")
}
