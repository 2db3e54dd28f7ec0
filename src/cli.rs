//! CLI argument parser for better-rm
//!
//! Provides type-safe argument parsing using clap derive.

use crate::config::{ConfigSources, TRASH_DIR_ENV};
use crate::logging::{AUDIT_LOG_ENV, LOG_ENV};
use crate::options::Options;
use crate::protected::ProtectedPaths;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::fmt::Write;
use std::path::PathBuf;

/// CLI arguments for better-rm
#[derive(Parser, Debug)]
#[command(
    name = "better-rm",
    version,
    about = "Better replacement for rm with protection against deleting system directories",
    long_about = "A drop-in rm replacement that refuses to remove protected directories,\n\
                  preserves the root directory, can move files to a trash directory\n\
                  instead of unlinking them, and records every deletion in an audit log."
)]
pub struct CliArgs {
    /// Files or directories to remove
    #[arg(required = true, value_name = "FILE")]
    pub paths: Vec<PathBuf>,

    /// Remove directories and their contents recursively
    #[arg(short, short_alias = 'R', long)]
    pub recursive: bool,

    /// Ignore nonexistent files, never prompt
    #[arg(short, long, overrides_with = "interactive")]
    pub force: bool,

    /// Prompt before every removal
    #[arg(short = 'i', overrides_with = "force")]
    pub interactive: bool,

    /// Explain what is being done
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be deleted without actually removing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Move files to trash instead of deleting
    #[arg(short = 't', long)]
    pub trash: bool,

    /// Trash directory to use (implies --trash; default: ~/.Trash)
    #[arg(long, value_name = "DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Do not remove '/' (default)
    #[arg(long, overrides_with = "no_preserve_root")]
    pub preserve_root: bool,

    /// Allow removing '/'
    #[arg(long, overrides_with = "preserve_root")]
    pub no_preserve_root: bool,

    /// Stay on the same filesystem when recursing
    #[arg(long)]
    pub one_file_system: bool,
}

impl CliArgs {
    /// Parse `args`, appending `after_help` to the generated help text
    pub fn try_parse_with_help<I, T>(args: I, after_help: String) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .after_help(after_help)
            .try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Behaviour flags for the engine
    pub fn to_options(&self) -> Options {
        Options {
            recursive: self.recursive,
            force: self.force,
            verbose: self.verbose || self.dry_run,
            interactive: self.interactive,
            dry_run: self.dry_run,
            preserve_root: !self.no_preserve_root,
            no_preserve_root: self.no_preserve_root,
            one_file_system: self.one_file_system,
            use_trash: self.trash || self.trash_dir.is_some(),
            trash_dir: self.trash_dir.clone(),
        }
    }
}

/// Help epilogue describing environment, configuration and protected paths
pub fn after_help(registry: &ProtectedPaths, sources: &ConfigSources) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Environment variables:");
    let _ = writeln!(text, "  {:<22}Override default trash directory", TRASH_DIR_ENV);
    let _ = writeln!(text, "  {:<22}Diagnostic log filter (e.g. debug)", LOG_ENV);
    let _ = writeln!(text, "  {:<22}Audit log file (default: $XDG_STATE_HOME/better-rm/audit.log)", AUDIT_LOG_ENV);
    let _ = writeln!(text);
    let _ = writeln!(text, "Configuration files:");
    let _ = writeln!(text, "  {}", sources.system.display());
    for candidate in &sources.user_candidates {
        let _ = writeln!(text, "  {}", candidate.display());
    }
    let _ = writeln!(text);
    let protected: Vec<String> = registry.iter().map(|p| p.display().to_string()).collect();
    let _ = write!(text, "Protected directories: {}", protected.join(" "));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["better-rm"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_with_help(argv, String::new()).unwrap()
    }

    #[test]
    fn test_single_file_defaults() {
        let opts = parse(&["file.txt"]).to_options();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_multiple_files() {
        let args = parse(&["file1.txt", "file2.txt", "dir/file3.txt"]);
        assert_eq!(args.paths.len(), 3);
        assert_eq!(args.paths[2], PathBuf::from("dir/file3.txt"));
    }

    #[test]
    fn test_recursive_short_forms() {
        assert!(parse(&["-r", "d"]).recursive);
        assert!(parse(&["-R", "d"]).recursive);
        assert!(parse(&["--recursive", "d"]).recursive);
    }

    #[test]
    fn test_combined_short_flags() {
        let opts = parse(&["-rf", "d"]).to_options();
        assert!(opts.recursive);
        assert!(opts.force);
    }

    #[test]
    fn test_force_and_interactive_last_wins() {
        let opts = parse(&["-f", "-i", "x"]).to_options();
        assert!(opts.interactive);
        assert!(!opts.force);

        let opts = parse(&["-i", "-f", "x"]).to_options();
        assert!(opts.force);
        assert!(!opts.interactive);
    }

    #[test]
    fn test_preserve_root_last_wins() {
        let opts = parse(&["--no-preserve-root", "/"]).to_options();
        assert!(opts.no_preserve_root);
        assert!(!opts.preserve_root);

        let opts = parse(&["--no-preserve-root", "--preserve-root", "/"]).to_options();
        assert!(!opts.no_preserve_root);
        assert!(opts.preserve_root);

        let opts = parse(&["--preserve-root", "--no-preserve-root", "/"]).to_options();
        assert!(opts.no_preserve_root);
    }

    #[test]
    fn test_dry_run_implies_verbose() {
        let opts = parse(&["-n", "x"]).to_options();
        assert!(opts.dry_run);
        assert!(opts.verbose);
    }

    #[test]
    fn test_trash_dir_implies_trash() {
        let opts = parse(&["--trash-dir", "/tmp/T", "x"]).to_options();
        assert!(opts.use_trash);
        assert_eq!(opts.trash_dir, Some(PathBuf::from("/tmp/T")));

        let opts = parse(&["-t", "x"]).to_options();
        assert!(opts.use_trash);
        assert!(opts.trash_dir.is_none());
    }

    #[test]
    fn test_one_file_system_flag() {
        assert!(parse(&["-r", "--one-file-system", "d"]).to_options().one_file_system);
    }

    #[test]
    fn test_missing_operand_is_error() {
        let err = CliArgs::try_parse_with_help(["better-rm", "-r"], String::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_an_error_stream() {
        let err =
            CliArgs::try_parse_with_help(["better-rm", "--help"], "EPILOGUE".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
        assert!(err.to_string().contains("EPILOGUE"));
    }

    #[test]
    fn test_after_help_lists_protected_dirs() {
        let registry = ProtectedPaths::with_defaults();
        let sources = ConfigSources::from_dirs(None, Some(std::path::Path::new("/h")));
        let text = after_help(&registry, &sources);
        assert!(text.contains("Protected directories: / /bin /boot"));
        assert!(text.contains("/etc/better-rm.conf"));
        assert!(text.contains("/h/.better-rm.conf"));
        assert!(text.contains("BETTER_RM_TRASH"));
    }
}
