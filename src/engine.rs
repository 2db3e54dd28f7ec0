//! Safe-remove orchestration
//!
//! Runs the per-target gates in order: protection, root preservation,
//! existence, confirmation, type check, then hands off to the [`Remover`].

use crate::audit::AuditSink;
use crate::error::RemoveError;
use crate::options::Options;
use crate::path_checker::PathChecker;
use crate::protected::ProtectedPaths;
use crate::remover::Remover;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Per-invocation deletion engine
pub struct Engine<'a> {
    registry: &'a ProtectedPaths,
    remover: Remover<'a>,
    input: Box<dyn BufRead + 'a>,
}

impl<'a> Engine<'a> {
    /// Engine reading confirmations from standard input
    pub fn new(registry: &'a ProtectedPaths, opts: &'a Options, audit: &'a dyn AuditSink) -> Self {
        Self {
            registry,
            remover: Remover::new(opts, audit),
            input: Box::new(BufReader::new(io::stdin())),
        }
    }

    /// Replace the stream interactive confirmations are read from
    pub fn with_input(mut self, input: impl BufRead + 'a) -> Self {
        self.input = Box::new(input);
        self
    }

    fn opts(&self) -> &Options {
        self.remover.options()
    }

    /// Remove one command-line target and report any failure on stderr.
    ///
    /// Returns the exit status for this target: 0 on success or no-op.
    pub fn safe_remove(&mut self, path: &Path) -> u8 {
        match self.remove(path) {
            Ok(()) => 0,
            Err(e) => {
                if e.is_protection_violation() {
                    tracing::warn!(path = %e.path().display(), "refused protected target");
                }
                eprintln!("{}better-rm: {}", self.opts().diag_prefix(), e);
                e.exit_code()
            }
        }
    }

    /// Remove one command-line target.
    pub fn remove(&mut self, path: &Path) -> Result<(), RemoveError> {
        if self.registry.is_protected(path) {
            return Err(RemoveError::Protected(path.to_path_buf()));
        }

        if PathChecker::is_root_blocked(path, self.opts()) {
            return Err(RemoveError::RootPreserved(path.to_path_buf()));
        }

        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(_) if self.opts().force => return Ok(()),
            Err(e) => return Err(RemoveError::from_stat(path.to_path_buf(), e)),
        };

        if self.opts().interactive && !self.opts().dry_run && !self.confirm(path) {
            tracing::debug!(path = %path.display(), "declined");
            return Ok(());
        }

        if meta.is_dir() {
            if !self.opts().recursive {
                return Err(RemoveError::IsDirectory(path.to_path_buf()));
            }
            if self.opts().reports_progress() {
                println!(
                    "{}{} directory '{}' recursively",
                    self.opts().progress_prefix(),
                    self.opts().verb(),
                    path.display()
                );
            }
            return self.remover.remove_tree(path);
        }

        match self.remover.remove_entry(path, false) {
            Err(_) if self.opts().force => Ok(()),
            result => result,
        }
    }

    /// Ask `remove '<path>'?` and accept only `y`/`Y`.
    ///
    /// The first non-whitespace character of the reply decides; EOF or a read
    /// error is a decline.
    fn confirm(&mut self, path: &Path) -> bool {
        print!("remove '{}'? ", path.display());
        let _ = io::stdout().flush();

        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return false,
                Ok(_) => {
                    if let Some(c) = line.chars().find(|c| !c.is_whitespace()) {
                        return c == 'y' || c == 'Y';
                    }
                }
            }
        }
    }
}
