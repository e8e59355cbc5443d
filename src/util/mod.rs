//! Utility module
//!
//! Platform path resolution and file-system helpers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Application subdirectory under the config and data directories
pub const DIR_NAME: &str = "sidplayfp";

/// Configuration file name
pub const FILE_NAME: &str = "sidplayfp.ini";

/// Song length database looked up in the data directory
pub const SONGLENGTH_DB: &str = "Songlengths.txt";

/// Source of the base directories the configuration lives in.
pub trait PathResolver {
    /// Per-user configuration directory
    fn config_dir(&self) -> Option<PathBuf>;

    /// Per-user data directory
    fn data_dir(&self) -> Option<PathBuf>;

    /// Directory probed for a config file before the per-user one
    fn portable_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// Platform conventions: the roaming application data folder on Windows,
/// XDG base directories everywhere else (macOS included).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPaths;

#[cfg(target_os = "windows")]
impl PathResolver for SystemPaths {
    fn config_dir(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }

    fn data_dir(&self) -> Option<PathBuf> {
        dirs::data_dir()
    }

    fn portable_dir(&self) -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }
}

#[cfg(not(target_os = "windows"))]
impl PathResolver for SystemPaths {
    fn config_dir(&self) -> Option<PathBuf> {
        xdg_dir(
            std::env::var_os("XDG_CONFIG_HOME"),
            dirs::home_dir(),
            ".config",
        )
    }

    fn data_dir(&self) -> Option<PathBuf> {
        xdg_dir(
            std::env::var_os("XDG_DATA_HOME"),
            dirs::home_dir(),
            ".local/share",
        )
    }
}

/// `$XDG_*_HOME` if set and non-empty, else `fallback` under the home directory
#[cfg_attr(target_os = "windows", allow(dead_code))]
fn xdg_dir(var: Option<OsString>, home: Option<PathBuf>, fallback: &str) -> Option<PathBuf> {
    match var {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home.map(|h| h.join(fallback)),
    }
}

/// Explicit directories, used for overrides
#[derive(Debug, Default, Clone)]
pub struct FixedPaths {
    pub config_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub portable_dir: Option<PathBuf>,
}

impl PathResolver for FixedPaths {
    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir.clone()
    }

    fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone()
    }

    fn portable_dir(&self) -> Option<PathBuf> {
        self.portable_dir.clone()
    }
}

/// Create `path` if it does not exist yet
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.is_dir() {
        tracing::debug!("Creating directory {:?}", path);
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Regular file readable by owner, group and others
#[cfg(unix)]
pub fn is_world_readable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o444 == 0o444,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_world_readable_file(path: &Path) -> bool {
    path.is_file()
}
