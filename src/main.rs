//! better-rm: safety-hardened replacement for rm
//!
//! Refuses to remove protected directories and `/`, can divert deletions to
//! a trash directory, and audits every removal.

use std::process::ExitCode;

use better_rm::audit::TracingAudit;
use better_rm::cli::{self, CliArgs};
use better_rm::config::{self, ConfigSources};
use better_rm::engine::Engine;
use better_rm::error::RemoveError;
use better_rm::logging;
use better_rm::options::Options;
use better_rm::trash::TrashBin;

fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("better-rm: warning: {:#}", e);
    }

    // Registry is built before parsing so --help can list it
    let sources = ConfigSources::discover();
    let registry = sources.load();

    let args = match CliArgs::try_parse_with_help(
        std::env::args_os(),
        cli::after_help(&registry, &sources),
    ) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut opts = args.to_options();
    let trash = match prepare_trash(&opts) {
        Ok(trash) => trash,
        Err(e) => {
            eprintln!("better-rm: {}", e);
            return e.exit_code().into();
        }
    };
    opts.trash_dir = trash.as_ref().map(|bin| bin.dir().to_path_buf());

    if opts.dry_run {
        println!("=== DRY-RUN MODE: No files will be actually deleted ===");
        if let Some(bin) = &trash {
            println!(
                "=== TRASH MODE: Files would be moved to {} ===",
                bin.dir().display()
            );
        }
    }

    let audit = TracingAudit;
    let mut engine = Engine::new(&registry, &opts, &audit);

    // Every target is attempted; any failure fails the whole run
    let mut exit_code: u8 = 0;
    for path in &args.paths {
        exit_code = exit_code.max(engine.safe_remove(path));
    }

    if opts.dry_run {
        println!("=== DRY-RUN COMPLETE: No files were actually deleted ===");
    }

    ExitCode::from(exit_code)
}

/// Resolve the trash directory and, outside dry-run, create or validate it
/// before any target is touched
fn prepare_trash(opts: &Options) -> Result<Option<TrashBin>, RemoveError> {
    if !opts.use_trash {
        return Ok(None);
    }
    let bin = TrashBin::new(config::trash_dir(opts.trash_dir.as_deref()));
    if !opts.dry_run {
        bin.ensure()?;
    }
    Ok(Some(bin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_version_available() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        assert!(version.contains('.'), "Version should be in semver format");
    }

    #[test]
    fn test_prepare_trash_skipped_in_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let trash = dir.path().join("T");
        let opts = Options {
            use_trash: true,
            dry_run: true,
            trash_dir: Some(trash.clone()),
            ..Options::default()
        };
        let bin = prepare_trash(&opts).unwrap().unwrap();
        assert_eq!(bin.dir(), trash.as_path());
        assert!(!trash.exists());
    }

    #[test]
    fn test_prepare_trash_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let trash = dir.path().join("T");
        let opts = Options {
            use_trash: true,
            trash_dir: Some(trash.clone()),
            ..Options::default()
        };
        assert!(prepare_trash(&opts).unwrap().is_some());
        assert!(trash.is_dir());
    }

    #[test]
    fn test_prepare_trash_off_without_trash_mode() {
        assert!(prepare_trash(&Options::default()).unwrap().is_none());
    }

    #[test]
    fn test_prepare_trash_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let trash: PathBuf = dir.path().join("T");
        std::fs::write(&trash, "not a dir").unwrap();
        let opts = Options {
            use_trash: true,
            trash_dir: Some(trash),
            ..Options::default()
        };
        assert!(matches!(
            prepare_trash(&opts),
            Err(RemoveError::TrashDirNotDirectory(_))
        ));
    }
}
