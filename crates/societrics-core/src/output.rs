//! History Output
//!
//! Append-only JSONL writer for step records and any other serializable rows.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes one JSON object per line.
pub struct HistoryWriter {
    writer: Option<BufWriter<File>>,
    row_count: u64,
}

impl HistoryWriter {
    /// Creates (or truncates) the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            row_count: 0,
        })
    }

    /// A writer that discards rows (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            row_count: 0,
        }
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn write<T: Serialize>(&mut self, row: &T) -> Result<(), WriterError> {
        self.row_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn write_all<T: Serialize>(&mut self, rows: &[T]) -> Result<(), WriterError> {
        for row in rows {
            self.write(row)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), WriterError> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for HistoryWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("failed to flush history writer: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::preset::Preset;
    use crate::scenario::Scenario;
    use societrics_events::StepRecord;
    use std::fs;

    #[test]
    fn test_null_writer_counts_rows() {
        let mut writer = HistoryWriter::null();
        writer.write(&1u32).unwrap();
        writer.write_all(&[2u32, 3u32]).unwrap();
        assert_eq!(writer.row_count(), 3);
    }

    #[test]
    fn test_write_history_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");

        let mut scenario = Scenario::new(&EngineConfig::default(), Preset::custom()).unwrap();
        scenario.apply_shock("sanctions").unwrap();
        scenario.advance(4).unwrap();

        {
            let mut writer = HistoryWriter::new(&path).unwrap();
            writer.write_all(scenario.history()).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);

        let parsed = StepRecord::from_jsonl(lines[3]).unwrap();
        assert_eq!(parsed.step, 3);
        assert_eq!(parsed.active_shocks, vec!["sanctions".to_string()]);
        assert!((parsed.state.wealth - scenario.history()[3].state.wealth).abs() < 1e-12);
    }
}
