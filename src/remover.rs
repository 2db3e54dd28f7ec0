//! Removal of single entries and whole directory trees
//!
//! Traversal is post-order over `read_dir` results in whatever order the
//! filesystem yields them. Entries are inspected with `lstat` only, so
//! symlinks are removed, never followed.

use crate::audit::{Action, AuditRecord, AuditSink, Identity};
use crate::config;
use crate::error::RemoveError;
use crate::options::Options;
use crate::trash::TrashBin;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Device id of an entry, given its path and metadata
pub type DeviceLookup = fn(&Path, &fs::Metadata) -> u64;

fn device_of(_path: &Path, meta: &fs::Metadata) -> u64 {
    meta.dev()
}

/// Applies the configured removal policy to filesystem entries
pub struct Remover<'a> {
    opts: &'a Options,
    trash: Option<TrashBin>,
    audit: &'a dyn AuditSink,
    identity: Identity,
    device_of: DeviceLookup,
}

impl<'a> Remover<'a> {
    pub fn new(opts: &'a Options, audit: &'a dyn AuditSink) -> Self {
        let trash = opts.use_trash.then(|| match &opts.trash_dir {
            Some(dir) => TrashBin::new(dir),
            None => TrashBin::new(config::trash_dir(None)),
        });
        Self {
            opts,
            trash,
            audit,
            identity: Identity::current(),
            device_of,
        }
    }

    /// Replace how device ids are read for `--one-file-system`
    pub fn with_device_lookup(mut self, lookup: DeviceLookup) -> Self {
        self.device_of = lookup;
        self
    }

    pub fn options(&self) -> &Options {
        self.opts
    }

    pub fn trash(&self) -> Option<&TrashBin> {
        self.trash.as_ref()
    }

    /// Remove (or trash) one entry without descending into it.
    ///
    /// Prints progress, honours dry-run and records the attempt.
    pub fn remove_entry(&self, path: &Path, is_dir: bool) -> Result<(), RemoveError> {
        if self.opts.reports_progress() {
            println!(
                "{}{}{} '{}'",
                self.opts.progress_prefix(),
                self.opts.verb(),
                if is_dir { " directory" } else { "" },
                path.display()
            );
        }
        if self.opts.dry_run {
            return Ok(());
        }

        let action = Action::for_entry(self.trash.is_some(), is_dir);
        let result = match &self.trash {
            Some(bin) => bin.divert(path).map(|_| ()),
            None if is_dir => fs::remove_dir(path).map_err(|source| RemoveError::Io {
                verb: "remove",
                path: path.to_path_buf(),
                source,
            }),
            None => fs::remove_file(path).map_err(|source| RemoveError::Io {
                verb: "remove",
                path: path.to_path_buf(),
                source,
            }),
        };

        self.audit.record(&AuditRecord {
            action,
            path,
            identity: &self.identity,
            error: result.as_ref().err().and_then(RemoveError::io_error),
        });
        result
    }

    /// Remove a directory and everything below it.
    ///
    /// A child failure without `force` stops processing of the remaining
    /// siblings and leaves this directory in place. With `force` failures are
    /// swallowed (they are still audited) and the walk carries on.
    pub fn remove_tree(&self, dir: &Path) -> Result<(), RemoveError> {
        let dir_dev = if self.opts.one_file_system {
            fs::metadata(dir).ok().map(|m| (self.device_of)(dir, &m))
        } else {
            None
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                return self.suppress_if_forced(RemoveError::Io {
                    verb: "remove",
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    self.suppress_if_forced(RemoveError::Io {
                        verb: "remove",
                        path: dir.to_path_buf(),
                        source,
                    })?;
                    continue;
                }
            };
            let path = entry.path();

            // vanished since listing
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };

            let foreign = dir_dev
                .is_some_and(|dev| is_foreign_device(dev, (self.device_of)(&path, &meta)));
            if foreign {
                if self.opts.reports_progress() {
                    println!("skipping '{}': different filesystem", path.display());
                }
                tracing::debug!(path = %path.display(), "one-file-system skip");
                continue;
            }

            let result = if meta.is_dir() {
                self.remove_tree(&path)
            } else {
                self.remove_entry(&path, false)
            };
            if let Err(err) = result {
                self.suppress_if_forced(err)?;
            }
        }

        self.remove_entry(dir, true)
            .or_else(|err| self.suppress_if_forced(err))
    }

    fn suppress_if_forced(&self, err: RemoveError) -> Result<(), RemoveError> {
        if self.opts.force {
            tracing::debug!(error = %err, "failure suppressed by --force");
            Ok(())
        } else {
            Err(err)
        }
    }
}

/// True when an entry lives on a different device than its parent directory
pub fn is_foreign_device(dir_dev: u64, entry_dev: u64) -> bool {
    dir_dev != entry_dev
}
