//! Audit trail for deletion attempts
//!
//! Every mutating attempt produces one [`AuditRecord`]. Sinks are
//! fire-and-forget: they cannot fail, so they cannot change an outcome.

use std::fmt;
use std::io;
use std::path::Path;

use crate::error::os_error_text;

/// tracing target carrying audit records
pub const AUDIT_TARGET: &str = "better_rm::audit";

/// Kind of mutation that was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// unlink of a non-directory
    Delete,
    /// rmdir of a directory
    DeleteDir,
    /// rename of a non-directory into the trash
    Trash,
    /// rename of a directory into the trash
    TrashDir,
}

impl Action {
    /// Pick the action for the current mode and entry kind
    pub fn for_entry(use_trash: bool, is_dir: bool) -> Self {
        match (use_trash, is_dir) {
            (false, false) => Self::Delete,
            (false, true) => Self::DeleteDir,
            (true, false) => Self::Trash,
            (true, true) => Self::TrashDir,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::DeleteDir => "DELETE_DIR",
            Self::Trash => "TRASH",
            Self::TrashDir => "TRASH_DIR",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is running the deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub uid: u32,
}

impl Identity {
    /// Identity of the current process (`$USER` and the real uid)
    pub fn current() -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        Self { user, uid }
    }
}

/// One deletion attempt
#[derive(Debug)]
pub struct AuditRecord<'a> {
    pub action: Action,
    pub path: &'a Path,
    pub identity: &'a Identity,
    /// `None` on success
    pub error: Option<&'a io::Error>,
}

impl AuditRecord<'_> {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Destination for audit records
pub trait AuditSink {
    fn record(&self, record: &AuditRecord<'_>);
}

/// Emits records as tracing events on [`AUDIT_TARGET`]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, record: &AuditRecord<'_>) {
        let path = record.path.display();
        let user = record.identity.user.as_str();
        let uid = record.identity.uid;
        match record.error {
            None => tracing::info!(
                target: AUDIT_TARGET,
                action = record.action.as_str(),
                path = %path,
                user,
                uid,
                success = true,
                "{}: {}",
                record.action,
                path
            ),
            Some(err) => {
                let error = os_error_text(err);
                tracing::warn!(
                    target: AUDIT_TARGET,
                    action = record.action.as_str(),
                    path = %path,
                    user,
                    uid,
                    success = false,
                    error = error.as_str(),
                    "{} FAILED: {}",
                    record.action,
                    path
                )
            }
        }
    }
}
