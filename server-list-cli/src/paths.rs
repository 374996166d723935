//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "server-list";
const APPLICATION: &str = "server-list";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Cache directory, where logs go.
///
/// - Linux: `$XDG_CACHE_HOME/server-list` or `~/.cache/server-list`
/// - macOS: `~/Library/Caches/dev.server-list.server-list`
/// - Windows: `C:\Users\<User>\AppData\Local\server-list\server-list\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the current log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}

/// Keeps the log of the previous run as `previous.log`.
///
/// Call at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    let latest = cache.join("latest.log");
    if latest.exists() {
        let _ = fs::rename(&latest, cache.join("previous.log"));
    }
}
