//! Path resolution for better-rm
//!
//! Produces the canonical absolute form of a target, used only for protection
//! and root-preservation decisions. The literal path is what gets removed.

use crate::options::Options;
use std::path::{Path, PathBuf};

/// Path resolver
pub struct PathChecker;

impl PathChecker {
    /// Resolve `path` to an absolute, symlink-resolved form
    ///
    /// A symlink in the final component is followed too; the caller still
    /// removes the literal path, so only the link itself is ever touched.
    ///
    /// # Returns
    /// * the canonical path if the OS can produce one
    /// * `cwd/path` for an unresolvable relative path (no symlink resolution)
    /// * `path` unchanged for an unresolvable absolute path
    pub fn resolve(path: &Path) -> PathBuf {
        match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => Self::to_absolute(path),
        }
    }

    /// Join a relative path onto the working directory
    fn to_absolute(path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    }

    /// True iff `path` resolves to `/` and root preservation is in force
    pub fn is_root_blocked(path: &Path, opts: &Options) -> bool {
        if !opts.preserve_root || opts.no_preserve_root {
            return false;
        }
        Self::resolve(path).as_os_str() == "/"
    }
}
