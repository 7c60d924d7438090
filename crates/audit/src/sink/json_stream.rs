//! NDJSON (newline-delimited JSON) stream sink.
//!
//! Each row is serialized straight into a buffered writer.
//!
//! ```ignore
//! let mut sink = JsonStreamSink::stdout();
//! sink.write_rows(&report.to_rows())?;
//! let n = sink.finish()?;
//! ```

use super::AccessRow;
use std::io::{self, BufWriter, Write};

pub struct JsonStreamSink<W: Write> {
    writer: BufWriter<W>,
    rows_written: usize,
}

impl JsonStreamSink<io::Stdout> {
    /// Write NDJSON to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonStreamSink<W> {
    /// Create a sink wrapping any writer (file, Vec<u8>, etc.).
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(16 * 1024, writer),
            rows_written: 0,
        }
    }

    pub fn write_row(&mut self, row: &AccessRow) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, row).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[AccessRow]) -> io::Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush and return how many rows were written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}
