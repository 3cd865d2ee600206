use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crawl_logging::crawl_debug;
use listing_core::{Record, RECORD_HEADER};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Append-only destination for unique records.
pub trait RecordSink {
    /// Persists one record. Returns only once the record is durable.
    fn append(&mut self, record: &Record) -> Result<(), PersistError>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append(&mut self, record: &Record) -> Result<(), PersistError> {
        (**self).append(record)
    }
}

impl RecordSink for Vec<Record> {
    fn append(&mut self, record: &Record) -> Result<(), PersistError> {
        self.push(record.clone());
        Ok(())
    }
}

/// CSV file sink. Every appended row is flushed and synced before `append`
/// returns, so a killed crawl keeps everything written so far.
pub struct CsvRecordSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvRecordSink {
    /// Creates or truncates `path` and writes the header row.
    pub fn initialize(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_output_dir(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        writer.write_record(RECORD_HEADER)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        crawl_debug!("initialized {}", path.display());

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and closes the file, returning its path for handoff.
    pub fn finish(mut self) -> Result<PathBuf, PersistError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.path)
    }
}

impl RecordSink for CsvRecordSink {
    fn append(&mut self, record: &Record) -> Result<(), PersistError> {
        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.rows += 1;
        Ok(())
    }
}
