//! Plain append sink for the verbose debug channel.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::record::LogRecord;
use crate::sink::format::{render, SinkFormat};
use crate::sink::{Sink, SinkError};

/// Appends records to a single file, no rotation.
pub struct StreamSink {
    path: PathBuf,
    format: SinkFormat,
    file: Option<File>,
}

impl StreamSink {
    /// Create a stream sink writing to `path`. The file is opened lazily on
    /// first write, so an idle sink touches nothing on disk.
    pub fn new(path: &Path, format: SinkFormat) -> Self {
        Self {
            path: path.to_path_buf(),
            format,
            file: None,
        }
    }

    fn open(&mut self) -> Result<&mut File, SinkError> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            self.file = Some(file);
        }
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(SinkError::Io(std::io::Error::other("sink file unavailable"))),
        }
    }
}

impl Sink for StreamSink {
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        let line = render(self.format, record)?;
        let file = self.open()?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;
    use serde_json::Map;

    #[test]
    fn test_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        let mut sink = StreamSink::new(&path, SinkFormat::Line);

        sink.write(&LogRecord::new(Level::Debug, "first", Map::new())).unwrap();
        sink.write(&LogRecord::new(Level::Debug, "second", Map::new())).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }

    #[test]
    fn test_unwritable_path_errors_per_write() {
        let dir = tempfile::tempdir().unwrap();
        // The destination is a directory, so every open attempt fails.
        let mut sink = StreamSink::new(dir.path(), SinkFormat::Line);

        let result = sink.write(&LogRecord::new(Level::Debug, "event", Map::new()));
        assert!(result.is_err());
    }
}
