//! Trash diversion
//!
//! Moves an entry into the trash directory with a single `rename`. A
//! directory travels whole, with its contents. There is no copy-and-delete
//! fallback: a cross-device move fails with [`RemoveError::Trash`].

use crate::error::RemoveError;
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

/// Timestamp format embedded in trash entry names (second resolution)
pub const TRASH_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Upper bound on the `.N` disambiguator before giving up
const MAX_DISAMBIGUATOR: u32 = 10_000;

/// A trash directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashBin {
    dir: PathBuf,
}

impl TrashBin {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Make sure the trash directory exists, creating it owner-only (0700).
    ///
    /// An existing non-directory at that path is a fatal error.
    pub fn ensure(&self) -> Result<(), RemoveError> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(RemoveError::TrashDirNotDirectory(self.dir.clone())),
            Err(_) => {
                fs::DirBuilder::new()
                    .mode(0o700)
                    .create(&self.dir)
                    .map_err(|source| RemoveError::TrashDirCreate {
                        path: self.dir.clone(),
                        source,
                    })?;
                tracing::debug!(dir = %self.dir.display(), "created trash directory");
                Ok(())
            }
        }
    }

    /// `basename.YYYYMMDD_HHMMSS.pid` for `path` at time `now`
    pub fn entry_name(path: &Path, now: &DateTime<Local>, pid: u32) -> OsString {
        let mut name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(path.as_os_str()));
        name.push(format!(".{}.{}", now.format(TRASH_TIME_FORMAT), pid));
        name
    }

    /// Destination for `path`, disambiguated with `.N` if the canonical
    /// name is already taken.
    pub fn destination(&self, path: &Path, now: &DateTime<Local>) -> PathBuf {
        let base = Self::entry_name(path, now, std::process::id());
        let candidate = self.dir.join(&base);
        if !exists(&candidate) {
            return candidate;
        }

        for n in 1..MAX_DISAMBIGUATOR {
            let mut name = base.clone();
            name.push(format!(".{}", n));
            let candidate = self.dir.join(name);
            if !exists(&candidate) {
                return candidate;
            }
        }
        candidate
    }

    /// Rename `path` into the trash, returning the new location
    pub fn divert(&self, path: &Path) -> Result<PathBuf, RemoveError> {
        let dest = self.destination(path, &Local::now());
        match fs::rename(path, &dest) {
            Ok(()) => {
                tracing::debug!(from = %path.display(), to = %dest.display(), "moved to trash");
                Ok(dest)
            }
            Err(source) => Err(RemoveError::Trash {
                path: path.to_path_buf(),
                dest,
                source,
            }),
        }
    }
}

fn exists(path: &Path) -> bool {
    !matches!(fs::symlink_metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}
