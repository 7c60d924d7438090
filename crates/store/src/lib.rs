//! File persistence for the Warden registry.
//!
//! Two on-disk formats sit behind the [`UserStore`] trait:
//! - [`CsvFileStore`]: the legacy positional `name,id,level[,extra],tag` lines
//! - [`JsonLinesStore`]: one self-describing JSON object per user
//!
//! Loading replaces the registry's users and leaves its resources alone.

pub mod csv;
pub mod jsonl;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use warden_core::error::{LineError, WardenError, WardenResult};
use warden_core::{Registry, User};

pub use csv::CsvFileStore;
pub use jsonl::JsonLinesStore;

/// Abstraction over a file holding user records.
pub trait UserStore {
    /// Backing file.
    fn path(&self) -> &Path;

    /// Format name for logs.
    fn format(&self) -> StoreFormat;

    fn load(&self) -> WardenResult<Vec<User>>;

    fn save(&self, users: &[User]) -> WardenResult<()>;
}

// ---------------------------------------------------------------------------
// Format selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFormat {
    #[default]
    Csv,
    JsonLines,
}

#[derive(Debug, Error)]
#[error("unknown store format `{0}`, expected `csv` or `jsonl`")]
pub struct UnknownFormat(String);

impl FromStr for StoreFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::JsonLines => "jsonl",
        })
    }
}

/// Build the store for `format`. `lenient` skips malformed lines on load
/// instead of failing.
pub fn open_store(
    format: StoreFormat,
    path: impl Into<PathBuf>,
    lenient: bool,
) -> Box<dyn UserStore> {
    match format {
        StoreFormat::Csv => Box::new(CsvFileStore::new(path).lenient(lenient)),
        StoreFormat::JsonLines => Box::new(JsonLinesStore::new(path).lenient(lenient)),
    }
}

// ---------------------------------------------------------------------------
// Registry helpers
// ---------------------------------------------------------------------------

/// Write the registry's users through `store`.
pub fn save_registry(registry: &Registry, store: &dyn UserStore) -> WardenResult<()> {
    store.save(registry.users())?;
    tracing::info!(
        path = %store.path().display(),
        format = %store.format(),
        users = registry.users().len(),
        "registry saved"
    );
    Ok(())
}

/// Replace the registry's users with the store's contents.
///
/// On error the registry is unchanged.
pub fn load_registry(registry: &mut Registry, store: &dyn UserStore) -> WardenResult<usize> {
    let users = store.load()?;
    let n = users.len();
    registry.replace_users(users);
    tracing::info!(
        path = %store.path().display(),
        format = %store.format(),
        users = n,
        "registry loaded"
    );
    Ok(n)
}

/// Like [`load_registry`], but a missing file leaves the registry empty.
pub fn load_registry_or_empty(
    registry: &mut Registry,
    store: &dyn UserStore,
) -> WardenResult<usize> {
    match load_registry(registry, store) {
        Err(WardenError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %store.path().display(), "no data file yet, starting empty");
            registry.clear_users();
            Ok(0)
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

pub(crate) fn io_error(path: &Path, source: io::Error) -> WardenError {
    WardenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Fold per-line results into the user list.
///
/// Strict mode fails with every bad line; lenient mode logs and drops them.
pub(crate) fn collect_records(
    path: &Path,
    records: impl Iterator<Item = Result<User, LineError>>,
    lenient: bool,
) -> WardenResult<Vec<User>> {
    let mut users = Vec::new();
    let mut errors = Vec::new();
    for record in records {
        match record {
            Ok(user) => users.push(user),
            Err(e) if lenient => {
                tracing::warn!(
                    path = %path.display(),
                    line = e.line,
                    reason = %e.reason,
                    "skipping malformed record"
                );
            }
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(users)
    } else {
        Err(WardenError::Malformed(errors))
    }
}
