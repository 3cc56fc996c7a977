//! Rotating structured file sink.
//!
//! # Responsibilities
//! - Write records to a date-stamped file (`name-YYYY-MM-DD.ext`)
//! - Start a new physical file when the record date changes
//! - Delete the oldest files once the retention count is exceeded
//!
//! # Design Decisions
//! - Rotation is driven by the record timestamp, not a background timer, so
//!   behavior is deterministic and a quiet sink opens no new files
//! - Retention counts files, not bytes or days; the date suffix makes
//!   lexicographic order chronological
//! - The sink is owned by a single worker, so rotation never races a write

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::record::LogRecord;
use crate::sink::format::{render, SinkFormat};
use crate::sink::{Sink, SinkError};

struct CurrentFile {
    stamp: String,
    file: File,
}

/// File sink that rotates daily and retains a bounded number of files.
pub struct RotatingFileSink {
    directory: PathBuf,
    stem: String,
    extension: String,
    max_files: usize,
    format: SinkFormat,
    current: Option<CurrentFile>,
}

impl RotatingFileSink {
    /// Create a rotating sink for `path` (e.g. `logs/app.json`), keeping at
    /// most `max_files` files. Files are opened lazily on first write.
    pub fn new(path: &Path, max_files: usize, format: SinkFormat) -> Self {
        let directory = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string());
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string());

        Self {
            directory,
            stem,
            extension,
            max_files: max_files.max(1),
            format,
            current: None,
        }
    }

    fn file_name(&self, stamp: &str) -> String {
        format!("{}-{}.{}", self.stem, stamp, self.extension)
    }

    /// Open the file for `stamp`, rotating away from the previous one and
    /// pruning files beyond the retention count.
    fn rotate_to(&mut self, stamp: &str) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.directory)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.directory.join(self.file_name(stamp)))?;
        self.current = Some(CurrentFile {
            stamp: stamp.to_string(),
            file,
        });
        self.prune()?;
        Ok(())
    }

    /// Delete the oldest matching files until at most `max_files` remain.
    fn prune(&self) -> Result<(), SinkError> {
        let prefix = format!("{}-", self.stem);
        let suffix = format!(".{}", self.extension);

        let mut names: Vec<String> = std::fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix) && name.ends_with(&suffix))
            .collect();
        names.sort();

        if names.len() > self.max_files {
            let excess = names.len() - self.max_files;
            for name in &names[..excess] {
                std::fs::remove_file(self.directory.join(name))?;
            }
        }
        Ok(())
    }

    fn write_stamped(&mut self, stamp: &str, record: &LogRecord) -> Result<(), SinkError> {
        let needs_rotation = self
            .current
            .as_ref()
            .map(|current| current.stamp != stamp)
            .unwrap_or(true);
        if needs_rotation {
            self.rotate_to(stamp)?;
        }

        let line = render(self.format, record)?;
        // rotate_to above guarantees `current` is set.
        if let Some(current) = self.current.as_mut() {
            writeln!(current.file, "{line}")?;
        }
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        let stamp = record.timestamp.format("%Y-%m-%d").to_string();
        self.write_stamped(&stamp, record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if let Some(current) = self.current.as_mut() {
            current.file.flush()?;
        }
        Ok(())
    }
}
