//! Protected path registry
//!
//! Holds the absolute paths that must never be removed. Built once at startup
//! from the built-in defaults followed by the configuration sources, then
//! shared read-only with the rest of the engine.

use crate::path_checker::PathChecker;
use path_clean::PathClean;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Maximum number of entries, built-in defaults included.
///
/// Directives past this bound are dropped without error.
pub const MAX_PROTECTED: usize = 100;

/// Built-in protected directories
pub const DEFAULT_PROTECTED: &[&str] = &[
    "/", "/bin", "/boot", "/dev", "/etc", "/home", "/lib", "/lib32", "/lib64", "/proc", "/root",
    "/sbin", "/sys", "/usr", "/var",
];

/// Directive prefix recognised in configuration sources
const PROTECT_DIRECTIVE: &str = "protect=";

/// Ordered, capacity-bounded set of protected paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedPaths {
    entries: Vec<PathBuf>,
}

impl Default for ProtectedPaths {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProtectedPaths {
    /// Registry with no entries at all
    pub fn empty() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_PROTECTED),
        }
    }

    /// Registry seeded with [`DEFAULT_PROTECTED`]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for dir in DEFAULT_PROTECTED {
            registry.insert(Path::new(dir));
        }
        registry
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once no further entries will be accepted
    pub fn is_saturated(&self) -> bool {
        self.entries.len() >= MAX_PROTECTED
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    /// Append an absolute path, normalized lexically.
    ///
    /// Returns false when the value is not absolute or the registry is full.
    pub fn insert(&mut self, path: &Path) -> bool {
        if !path.is_absolute() {
            return false;
        }
        if self.is_saturated() {
            tracing::debug!(path = %path.display(), "protected registry full, entry dropped");
            return false;
        }
        self.entries.push(path.clean());
        true
    }

    /// Parse one configuration line and insert its directive, if valid.
    ///
    /// Only `protect=<absolute path>` with no surrounding whitespace counts;
    /// comments, blank lines and anything else are skipped silently.
    pub fn apply_line(&mut self, line: &str) -> bool {
        if line.is_empty() || line.starts_with('#') {
            return false;
        }
        let Some(value) = line.strip_prefix(PROTECT_DIRECTIVE) else {
            tracing::debug!(line, "skipping unrecognised config line");
            return false;
        };
        if value.is_empty() {
            return false;
        }
        self.insert(Path::new(value))
    }

    /// Load every directive of a configuration source.
    ///
    /// Missing or unreadable files are a silent no-op. Returns the number
    /// of entries added.
    pub fn load_file(&mut self, path: &Path) -> usize {
        let content = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "config source skipped");
                return 0;
            }
        };

        let added = content
            .lines()
            .filter(|line| self.apply_line(line))
            .count();
        tracing::debug!(path = %path.display(), added, "config source loaded");
        added
    }

    /// Exact, byte-wise match of the resolved target against the registry.
    ///
    /// Descendants of a protected entry are not protected.
    pub fn is_protected(&self, path: &Path) -> bool {
        let resolved = PathChecker::resolve(path);
        let normalized = strip_trailing_slashes(resolved.as_os_str());
        self.entries
            .iter()
            .any(|entry| entry.as_os_str().as_bytes() == normalized.as_bytes())
    }
}

/// Drop trailing `/` characters, keeping a lone `/`
fn strip_trailing_slashes(path: &OsStr) -> &OsStr {
    let mut bytes = path.as_bytes();
    while bytes.len() > 1 && bytes.ends_with(b"/") {
        bytes = &bytes[..bytes.len() - 1];
    }
    OsStr::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_protected() {
        let registry = ProtectedPaths::with_defaults();
        assert_eq!(registry.len(), DEFAULT_PROTECTED.len());
        for dir in DEFAULT_PROTECTED {
            let path = Path::new(dir);
            // Some defaults (e.g. /lib32) may not exist; a missing absolute
            // path resolves to itself.
            if path.exists() && path.canonicalize().unwrap() != path {
                continue;
            }
            assert!(registry.is_protected(path), "{} should be protected", dir);
        }
    }

    #[test]
    fn test_trailing_slash_still_protected() {
        let registry = ProtectedPaths::with_defaults();
        assert!(registry.is_protected(Path::new("/etc/")));
        assert!(registry.is_protected(Path::new("/etc//")));
    }

    #[test]
    fn test_descendants_not_protected() {
        let mut registry = ProtectedPaths::empty();
        registry.insert(Path::new("/var/lib/mysql"));
        assert!(registry.is_protected(Path::new("/var/lib/mysql")));
        assert!(!registry.is_protected(Path::new("/var/lib/mysql/data")));
        assert!(!registry.is_protected(Path::new("/etc/passwd")));
    }

    #[test]
    fn test_case_sensitive_match() {
        let mut registry = ProtectedPaths::empty();
        registry.insert(Path::new("/opt/Custom"));
        assert!(registry.is_protected(Path::new("/opt/Custom")));
        assert!(!registry.is_protected(Path::new("/opt/custom")));
        assert!(!registry.is_protected(Path::new("/OPT/Custom")));
    }

    #[test]
    fn test_apply_line_accepts_exact_directive() {
        let mut registry = ProtectedPaths::empty();
        assert!(registry.apply_line("protect=/x"));
        assert!(registry.is_protected(Path::new("/x")));
    }

    #[test]
    fn test_apply_line_rejects_spaces_around_equals() {
        let mut registry = ProtectedPaths::empty();
        assert!(!registry.apply_line("protect = /with/spaces"));
        assert!(!registry.apply_line("protect =/with/spaces"));
        assert!(!registry.apply_line(" protect=/with/spaces"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_apply_line_skips_comments_and_garbage() {
        let mut registry = ProtectedPaths::empty();
        assert!(!registry.apply_line("# protect=/commented"));
        assert!(!registry.apply_line(""));
        assert!(!registry.apply_line("trash_dir=/tmp/t"));
        assert!(!registry.apply_line("protect="));
        assert!(!registry.apply_line("protect=relative/path"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_normalizes_trailing_slash() {
        let mut registry = ProtectedPaths::empty();
        registry.apply_line("protect=/opt/data/");
        assert_eq!(registry.iter().next(), Some(Path::new("/opt/data")));
        assert!(registry.is_protected(Path::new("/opt/data")));
    }

    #[test]
    fn test_load_file_mixed_content() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "mixed.conf",
            "# comment\n\nprotect=/test/dir1\ninvalid line\nprotect = /bad\nprotect=/test/dir2\n",
        );

        let mut registry = ProtectedPaths::with_defaults();
        let before = registry.len();
        assert_eq!(registry.load_file(&path), 2);
        assert_eq!(registry.len(), before + 2);
        assert!(registry.is_protected(Path::new("/test/dir1")));
        assert!(registry.is_protected(Path::new("/test/dir2")));
        assert!(!registry.is_protected(Path::new("/bad")));
    }

    #[test]
    fn test_load_file_comments_only() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "comments.conf", "# one\n# two\n\n");
        let mut registry = ProtectedPaths::with_defaults();
        assert_eq!(registry.load_file(&path), 0);
        assert_eq!(registry.len(), DEFAULT_PROTECTED.len());
    }

    #[test]
    fn test_load_file_long_lines() {
        let dir = TempDir::new().unwrap();
        let long = format!("/very{}/path", "/long".repeat(200));
        let path = write_config(
            &dir,
            "long.conf",
            &format!("protect={}\nprotect=/short\n", long),
        );

        let mut registry = ProtectedPaths::empty();
        assert_eq!(registry.load_file(&path), 2);
        assert!(registry.is_protected(Path::new(&long)));
        assert!(registry.is_protected(Path::new("/short")));
    }

    #[test]
    fn test_load_missing_file_is_noop() {
        let mut registry = ProtectedPaths::with_defaults();
        assert_eq!(
            registry.load_file(Path::new("/nonexistent/better-rm.conf")),
            0
        );
        assert_eq!(registry.len(), DEFAULT_PROTECTED.len());
    }

    #[test]
    fn test_capacity_bound_drops_silently() {
        let dir = TempDir::new().unwrap();
        let content: String = (0..150).map(|i| format!("protect=/cap/{}\n", i)).collect();
        let path = write_config(&dir, "many.conf", &content);

        let mut registry = ProtectedPaths::with_defaults();
        let added = registry.load_file(&path);
        assert_eq!(registry.len(), MAX_PROTECTED);
        assert_eq!(added, MAX_PROTECTED - DEFAULT_PROTECTED.len());
        assert!(registry.is_saturated());
        assert!(registry.is_protected(Path::new("/cap/0")));
        assert!(!registry.is_protected(Path::new("/cap/149")));
        assert!(!registry.insert(Path::new("/one/more")));
    }

    #[test]
    fn test_symlink_to_protected_dir_is_protected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let prod = root.join("prod");
        fs::create_dir(&prod).unwrap();
        let link = root.join("prod-link");
        std::os::unix::fs::symlink(&prod, &link).unwrap();

        let mut registry = ProtectedPaths::empty();
        registry.insert(&prod);
        assert!(registry.is_protected(&link));
        assert!(!registry.is_protected(&root.join("prod-link-missing")));
    }

    #[test]
    fn test_relative_path_resolving_to_protected_entry() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("guarded")).unwrap();

        let mut registry = ProtectedPaths::empty();
        registry.insert(&root.join("guarded"));
        assert!(registry.is_protected(&root.join("guarded").join("..").join("guarded")));
    }

    #[test]
    fn test_strip_trailing_slashes() {
        assert_eq!(strip_trailing_slashes(OsStr::new("/")), OsStr::new("/"));
        assert_eq!(strip_trailing_slashes(OsStr::new("///")), OsStr::new("/"));
        assert_eq!(strip_trailing_slashes(OsStr::new("/a/b//")), OsStr::new("/a/b"));
    }
}
