//! Run log for per-tile outcomes
//!
//! This module provides a file-backed logger that records one line per
//! processed item, alongside the console logging done through the log crate.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// File logger for run reports
///
/// When created with [`Logger::sink`] every call is a no-op, so commands can
/// log unconditionally.
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
}

impl Logger {
    /// Creates a new logger writing to `log_file`
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file (truncated if it exists)
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be created
    pub fn new<P: AsRef<Path>>(log_file: P) -> io::Result<Self> {
        let file = File::create(log_file.as_ref())?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
        })
    }

    /// Creates a logger that discards everything
    pub fn sink() -> Self {
        Logger {
            file: Mutex::new(None),
        }
    }

    /// Logs a message to the log file
    ///
    /// # Arguments
    ///
    /// * `message` - The message to log
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "run log mutex poisoned"))?;
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Logs the outcome of a single tile as `<outcome>\t<path>[\t<detail>]`
    pub fn log_outcome(&self, outcome: &str, path: &Path, detail: Option<&str>) -> io::Result<()> {
        match detail {
            Some(detail) => self.log(&format!("{}\t{}\t{}", outcome, path.display(), detail)),
            None => self.log(&format!("{}\t{}", outcome, path.display())),
        }
    }
}
