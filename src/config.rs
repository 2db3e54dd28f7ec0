//! Configuration for better-rm
//!
//! Locates the configuration sources feeding the protected registry and
//! resolves the active trash directory.
//!
//! Example source (`/etc/better-rm.conf` or `~/.config/better-rm/config`):
//! ```text
//! # Databases
//! protect=/var/lib/mysql
//! protect=/opt/prod
//! ```

use crate::protected::ProtectedPaths;
use std::path::{Path, PathBuf};

/// System-wide configuration source
pub const SYSTEM_CONFIG: &str = "/etc/better-rm.conf";

/// Environment variable overriding the trash directory
pub const TRASH_DIR_ENV: &str = "BETTER_RM_TRASH";

/// Trash directory name under the home directory
pub const DEFAULT_TRASH_DIR: &str = ".Trash";

/// Trash directory used when no home directory is known
pub const FALLBACK_TRASH_DIR: &str = "/tmp/.Trash";

/// The ordered configuration sources for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    /// System-scope source, loaded first
    pub system: PathBuf,
    /// User-scope source candidates; the first one that exists is loaded
    pub user_candidates: Vec<PathBuf>,
}

impl ConfigSources {
    /// Sources derived from the process environment
    pub fn discover() -> Self {
        let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        Self::from_dirs(xdg.as_deref(), dirs::home_dir().as_deref())
    }

    /// Sources for the given XDG config home and home directory
    pub fn from_dirs(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Self {
        let mut user_candidates = Vec::new();
        if let Some(xdg) = xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
            user_candidates.push(xdg.join("better-rm").join("config"));
        }
        if let Some(home) = home {
            user_candidates.push(home.join(".config").join("better-rm").join("config"));
            user_candidates.push(home.join(".better-rm.conf"));
        }

        Self {
            system: PathBuf::from(SYSTEM_CONFIG),
            user_candidates,
        }
    }

    /// The user-scope source that will actually be read, if any
    pub fn user_source(&self) -> Option<&Path> {
        self.user_candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|p| p.is_file())
    }

    /// Build the registry: defaults, then system source, then user source
    pub fn load(&self) -> ProtectedPaths {
        let mut registry = ProtectedPaths::with_defaults();
        registry.load_file(&self.system);
        if let Some(user) = self.user_source() {
            registry.load_file(user);
        }
        tracing::debug!(entries = registry.len(), "protected registry ready");
        registry
    }
}

/// Resolve the active trash directory from the environment
pub fn trash_dir(cli_override: Option<&Path>) -> PathBuf {
    let env = std::env::var_os(TRASH_DIR_ENV).map(PathBuf::from);
    resolve_trash_dir(cli_override, env.as_deref(), dirs::home_dir().as_deref())
}

/// Trash directory precedence: command line, environment, home, fallback
pub fn resolve_trash_dir(
    cli_override: Option<&Path>,
    env_override: Option<&Path>,
    home: Option<&Path>,
) -> PathBuf {
    if let Some(dir) = cli_override {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_override.filter(|p| !p.as_os_str().is_empty()) {
        return dir.to_path_buf();
    }
    match home {
        Some(home) => home.join(DEFAULT_TRASH_DIR),
        None => PathBuf::from(FALLBACK_TRASH_DIR),
    }
}
