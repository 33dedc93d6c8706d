//! Blocklist management module
//!
//! Handles loading and querying the common-password blocklist.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Process-wide blocklist, set once by [`init_blocklist`] and never mutated.
static COMMON_PASSWORDS: OnceLock<Arc<Blocklist>> = OnceLock::new();

/// List compiled into the crate, used when no file is configured.
const EMBEDDED_LIST: &str = include_str!("../assets/common-passwords.txt");

#[derive(Error, Debug)]
pub enum BlocklistError {
    #[error("Blocklist file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read blocklist file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Blocklist file is empty")]
    EmptyFile,
}

/// Immutable set of lowercase-normalized common passwords.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    entries: HashSet<String>,
}

impl Blocklist {
    /// Builds a blocklist from one-password-per-line text.
    ///
    /// Lines are trimmed and lowercased; blank lines are skipped.
    pub fn from_lines(content: &str) -> Self {
        let entries = content
            .lines()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        Self { entries }
    }

    /// The list shipped with the crate.
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_LIST)
    }

    /// Loads a blocklist file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist
    /// - File cannot be read
    /// - File is empty
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BlocklistError> {
        let path = path.as_ref();

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Blocklist load FAILED: FileNotFound {:?}", path);
            return Err(BlocklistError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("Blocklist load FAILED: Empty file {:?}", path);
            return Err(BlocklistError::EmptyFile);
        }

        Ok(Self::from_lines(&content))
    }

    /// Case-insensitive exact membership test.
    pub fn is_common(&self, password: &str) -> bool {
        self.entries.contains(&password.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the configured blocklist file path, if any.
///
/// Read from the environment variable `PWD_BLOCKLIST_PATH`.
pub fn get_blocklist_path() -> Option<PathBuf> {
    std::env::var("PWD_BLOCKLIST_PATH").ok().map(PathBuf::from)
}

/// Initializes the process-wide blocklist.
///
/// Loads `PWD_BLOCKLIST_PATH` when set, the embedded list otherwise.
/// Idempotent: once a blocklist is installed, later calls return it unchanged.
///
/// # Example
///
/// ```rust,ignore
/// unsafe { std::env::set_var("PWD_BLOCKLIST_PATH", "/etc/myapp/common.txt"); }
/// let blocklist = pwd_audit::init_blocklist()?;
/// ```
pub fn init_blocklist() -> Result<Arc<Blocklist>, BlocklistError> {
    match get_blocklist_path() {
        Some(path) => init_blocklist_from_path(path),
        None => Ok(install(Blocklist::embedded(), Path::new("<embedded>"))),
    }
}

/// Initializes the process-wide blocklist from a specific file path.
pub fn init_blocklist_from_path<P: AsRef<Path>>(path: P) -> Result<Arc<Blocklist>, BlocklistError> {
    if let Some(existing) = COMMON_PASSWORDS.get() {
        return Ok(Arc::clone(existing));
    }
    let path = path.as_ref();
    let blocklist = Blocklist::from_path(path)?;
    Ok(install(blocklist, path))
}

fn install(blocklist: Blocklist, _source: &Path) -> Arc<Blocklist> {
    let installed = COMMON_PASSWORDS.get_or_init(|| {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Blocklist initialized: {} passwords from {:?}",
            blocklist.len(),
            _source
        );
        Arc::new(blocklist)
    });
    Arc::clone(installed)
}

/// Returns the process-wide blocklist.
///
/// Returns `None` if `init_blocklist()` has not been called.
pub fn global_blocklist() -> Option<Arc<Blocklist>> {
    COMMON_PASSWORDS.get().cloned()
}
