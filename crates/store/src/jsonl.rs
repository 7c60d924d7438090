//! JSON-lines user file.
//!
//! Each line is a [`UserRecord`](warden_core::UserRecord) tagged by `type`,
//! so names may contain commas, quotes or anything else JSON can carry.

use crate::{collect_records, io_error, StoreFormat, UserStore};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use warden_core::error::{LineError, WardenError, WardenResult};
use warden_core::User;

#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    path: PathBuf,
    lenient: bool,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lenient: false,
        }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

fn decode_lines(text: &str) -> impl Iterator<Item = Result<User, LineError>> + '_ {
    text.lines().enumerate().filter_map(|(idx, line)| {
        if line.trim().is_empty() {
            return None;
        }
        Some(serde_json::from_str::<User>(line).map_err(|e| LineError {
            line: idx + 1,
            reason: e.to_string(),
        }))
    })
}

impl UserStore for JsonLinesStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StoreFormat {
        StoreFormat::JsonLines
    }

    fn load(&self) -> WardenResult<Vec<User>> {
        tracing::debug!(path = %self.path.display(), lenient = self.lenient, "reading jsonl");
        let text = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        collect_records(&self.path, decode_lines(&text), self.lenient)
    }

    fn save(&self, users: &[User]) -> WardenResult<()> {
        let file = File::create(&self.path).map_err(|e| io_error(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        for user in users {
            serde_json::to_writer(&mut writer, user).map_err(|e| {
                if e.is_io() {
                    io_error(&self.path, e.into())
                } else {
                    WardenError::Json(e)
                }
            })?;
            writer
                .write_all(b"\n")
                .map_err(|e| io_error(&self.path, e))?;
        }
        writer.flush().map_err(|e| io_error(&self.path, e))
    }
}
