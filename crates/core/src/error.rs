//! Centralized error types for the Warden workspace.

use std::path::PathBuf;
use thiserror::Error;

/// Why a user record was rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("access level {0} is outside 1..=3")]
    AccessLevelOutOfRange(i64),

    #[error("group must not be empty")]
    EmptyGroup,

    #[error("department must not be empty")]
    EmptyDepartment,
}

/// A single malformed record in a persisted file.
///
/// `line` is 1-based, matching what an editor shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct LineError {
    pub line: usize,
    pub reason: String,
}

/// Top-level error enum. Variants map to subsystems.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WardenError {
    #[error("Invalid user: {0}")]
    InvalidUser(#[from] ValidationError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data: {} bad line(s), first: {}", .0.len(), first_line(.0))]
    Malformed(Vec<LineError>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot store {field} `{value}` as csv: it contains a comma or line break")]
    Unencodable { field: &'static str, value: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

fn first_line(errors: &[LineError]) -> String {
    errors
        .first()
        .map_or_else(|| "none".to_string(), ToString::to_string)
}

pub type WardenResult<T> = Result<T, WardenError>;
