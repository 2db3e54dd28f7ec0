//! Error types for better-rm
//!
//! Defines RemoveError, the per-target failure taxonomy of the deletion engine.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Render an OS error the way `strerror` would, without Rust's
/// `" (os error N)"` suffix.
pub fn os_error_text(err: &io::Error) -> String {
    let text = err.to_string();
    match text.find(" (os error ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

/// better-rm error type
#[derive(Debug)]
pub enum RemoveError {
    // Protection violations (never overridden by --force)
    /// Target exactly matches a protected directory
    Protected(PathBuf),
    /// Target resolves to `/` while --preserve-root is active
    RootPreserved(PathBuf),

    // Target/operation mismatch
    /// Target does not exist
    NotFound(PathBuf),
    /// Directory given without -r
    IsDirectory(PathBuf),

    // Syscall failures
    /// unlink/rmdir/lstat/readdir failure
    Io {
        verb: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// rename into the trash failed (cross-device, permissions, ...)
    Trash {
        path: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },

    // Trash directory setup (fatal for the whole invocation)
    /// Trash path exists but is not a directory
    TrashDirNotDirectory(PathBuf),
    /// Trash directory could not be created
    TrashDirCreate { path: PathBuf, source: io::Error },
}

impl RemoveError {
    /// Build the error for a failed `lstat` on a target.
    pub fn from_stat(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io {
                verb: "remove",
                path,
                source,
            }
        }
    }

    /// Exit code contribution of this error
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// True for the errors `--force` must never suppress
    pub fn is_protection_violation(&self) -> bool {
        matches!(self, Self::Protected(_) | Self::RootPreserved(_))
    }

    /// Underlying OS error, if the failure came from a syscall
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. }
            | Self::Trash { source, .. }
            | Self::TrashDirCreate { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The path the error refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::Protected(path)
            | Self::RootPreserved(path)
            | Self::NotFound(path)
            | Self::IsDirectory(path)
            | Self::TrashDirNotDirectory(path) => path,
            Self::Io { path, .. } | Self::Trash { path, .. } | Self::TrashDirCreate { path, .. } => {
                path
            }
        }
    }

    /// Diagnostic line shown to the user (without the program prefix)
    pub fn user_message(&self) -> String {
        match self {
            Self::Protected(path) => {
                format!(
                    "cannot remove '{}': Protected system directory",
                    path.display()
                )
            }
            Self::RootPreserved(path) => {
                format!(
                    "cannot remove '{}': --preserve-root is active",
                    path.display()
                )
            }
            Self::NotFound(path) => {
                format!(
                    "cannot remove '{}': No such file or directory",
                    path.display()
                )
            }
            Self::IsDirectory(path) => {
                format!("cannot remove '{}': Is a directory", path.display())
            }
            Self::Io { verb, path, source } => {
                format!(
                    "cannot {} '{}': {}",
                    verb,
                    path.display(),
                    os_error_text(source)
                )
            }
            Self::Trash { path, dest, source } => {
                format!(
                    "cannot trash '{}' (to '{}'): {}",
                    path.display(),
                    dest.display(),
                    os_error_text(source)
                )
            }
            Self::TrashDirNotDirectory(path) => {
                format!(
                    "trash path exists but is not directory: {}",
                    path.display()
                )
            }
            Self::TrashDirCreate { path, source } => {
                format!(
                    "cannot create trash directory '{}': {}",
                    path.display(),
                    os_error_text(source)
                )
            }
        }
    }
}

impl fmt::Display for RemoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for RemoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.io_error()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
