//! Legacy CSV-like user file.

use crate::{collect_records, io_error, StoreFormat, UserStore};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use warden_core::codec;
use warden_core::error::WardenResult;
use warden_core::User;

/// Reads and writes `name,id,level[,extra],tag` lines.
///
/// ```ignore
/// let store = CsvFileStore::new("users.csv");
/// store.save(registry.users())?;
/// ```
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
    lenient: bool,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lenient: false,
        }
    }

    /// Skip malformed lines on load instead of failing.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

impl UserStore for CsvFileStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StoreFormat {
        StoreFormat::Csv
    }

    fn load(&self) -> WardenResult<Vec<User>> {
        tracing::debug!(path = %self.path.display(), lenient = self.lenient, "reading csv");
        let text = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        collect_records(&self.path, codec::decode_lines(&text), self.lenient)
    }

    fn save(&self, users: &[User]) -> WardenResult<()> {
        let file = File::create(&self.path).map_err(|e| io_error(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(codec::encode(users).as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| io_error(&self.path, e))
    }
}
