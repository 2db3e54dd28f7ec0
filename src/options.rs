//! Behaviour flags threaded through the deletion pipeline.

use std::path::PathBuf;

/// User-selected behaviour for one invocation.
///
/// Built once from the command line and passed by shared reference to
/// every stage; nothing downstream mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Remove directories and their contents
    pub recursive: bool,
    /// Ignore missing targets and suppress OS failures
    pub force: bool,
    /// Explain what is being done
    pub verbose: bool,
    /// Ask before removing each command-line target
    pub interactive: bool,
    /// Report intended actions without touching the filesystem
    pub dry_run: bool,
    /// Refuse to remove `/`
    pub preserve_root: bool,
    /// Allow removing `/`
    pub no_preserve_root: bool,
    /// Skip entries living on another device during recursion
    pub one_file_system: bool,
    /// Move to the trash instead of unlinking
    pub use_trash: bool,
    /// Active trash directory, filled in before processing when `use_trash` is set
    pub trash_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            recursive: false,
            force: false,
            verbose: false,
            interactive: false,
            dry_run: false,
            preserve_root: true,
            no_preserve_root: false,
            one_file_system: false,
            use_trash: false,
            trash_dir: None,
        }
    }
}

impl Options {
    /// Marker prepended to diagnostics in dry-run mode
    pub fn diag_prefix(&self) -> &'static str {
        if self.dry_run {
            "[DRY-RUN] "
        } else {
            ""
        }
    }

    /// Marker prepended to progress lines in dry-run mode
    pub fn progress_prefix(&self) -> &'static str {
        if self.dry_run {
            "[DRY-RUN] would be "
        } else {
            ""
        }
    }

    /// Whether progress lines are printed at all
    pub fn reports_progress(&self) -> bool {
        self.verbose || self.dry_run
    }

    /// Progress verb for the active removal mode
    pub fn verb(&self) -> &'static str {
        if self.use_trash {
            "trashing"
        } else {
            "removing"
        }
    }
}
