//! tracing-subscriber setup
//!
//! Two independent layers:
//! - diagnostics on stderr, enabled by `BETTER_RM_LOG` (an `EnvFilter` string)
//! - the audit trail, always on, appended to `BETTER_RM_AUDIT_LOG` or to
//!   `$XDG_STATE_HOME/better-rm/audit.log`

use crate::audit::AUDIT_TARGET;
use anyhow::Context;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Diagnostic filter variable
pub const LOG_ENV: &str = "BETTER_RM_LOG";

/// Audit log file variable
pub const AUDIT_LOG_ENV: &str = "BETTER_RM_AUDIT_LOG";

/// Audit log location below the state directory
const AUDIT_LOG_FILE: &str = "better-rm/audit.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber from the environment.
///
/// An unusable audit log file is returned as an error after the diagnostic
/// layer has been installed; deletions proceed either way.
pub fn init() -> anyhow::Result<()> {
    let diagnostics = std::env::var(LOG_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(|directives| diagnostic_layer(EnvFilter::new(directives)));

    let (audit, audit_err) = match audit_log_path() {
        Some(path) => match audit_layer(&path) {
            Ok(layer) => (Some(layer), None),
            Err(e) => (None, Some(e)),
        },
        None => (
            None,
            Some(anyhow::anyhow!(
                "no location for the audit log; set {}",
                AUDIT_LOG_ENV
            )),
        ),
    };

    let layers: Vec<BoxedLayer> = diagnostics.into_iter().chain(audit).collect();
    if !layers.is_empty() {
        // a subscriber installed by an embedding program wins
        let _ = tracing_subscriber::registry().with(layers).try_init();
    }

    match audit_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Audit log file: `BETTER_RM_AUDIT_LOG` if set, else the default location
pub fn audit_log_path() -> Option<PathBuf> {
    match std::env::var_os(AUDIT_LOG_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => default_audit_log(dirs::state_dir(), dirs::home_dir()),
    }
}

/// `<state>/better-rm/audit.log`, falling back to `~/.local/state`
pub fn default_audit_log(state: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    let state = state.or_else(|| home.map(|h| h.join(".local").join("state")))?;
    Some(state.join(AUDIT_LOG_FILE))
}

fn diagnostic_layer(filter: EnvFilter) -> BoxedLayer {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter)
        .boxed()
}

fn audit_layer(path: &Path) -> anyhow::Result<BoxedLayer> {
    let file = open_audit_file(path)?;
    Ok(fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::INFO))
        .boxed())
}

fn open_audit_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot open audit log {}", path.display()))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open audit log {}", path.display()))
}
