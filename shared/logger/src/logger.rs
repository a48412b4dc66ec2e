//! The caller-facing [`Logger`] handle.

use crate::error::Result;
use crate::level::LogLevel;
use crate::writer::{Record, spawn};
use std::path::PathBuf;
use std::sync::mpsc::{Sender, channel};

/// Thread-safe, non-blocking logger.
///
/// Cloned handles share one channel to a single writer thread; the writer
/// exits when the last handle is dropped. Component-tagged children created
/// with [`Logger::for_component`] write to the same file.
///
/// # Examples
///
/// ```
/// use logging::{Logger, LogLevel};
///
/// let logger = Logger::new("capture.log".into(), LogLevel::Info).unwrap();
/// let camera_log = logger.for_component("camera0");
/// camera_log.info("stream started");
/// ```
#[derive(Clone)]
pub struct Logger {
    sender: Sender<Record>,
    level: LogLevel,
    component: Option<String>,
}

impl Logger {
    /// Creates a new logger backed by a dedicated writer thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or opened.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        let (sender, receiver) = channel();
        spawn(&log_path, receiver)?;
        Ok(Logger {
            sender,
            level,
            component: None,
        })
    }

    /// Returns a child logger tagged with a component name.
    ///
    /// The child shares this logger's writer thread and level; only the
    /// tag differs.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sender: self.sender.clone(),
            level: self.level,
            component: Some(component.to_string()),
        }
    }

    /// Returns the minimum level this logger records.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Logs a debug message (only if level is Debug).
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Logs an info message (only if level is Info or lower).
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Logs a warning message (only if level is Warn or lower).
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Logs an error message (always recorded).
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Filters by level and hands the record to the writer thread.
    fn log(&self, level: LogLevel, message: &str) {
        if level >= self.level {
            let record = Record::new(level, self.component.clone(), message.to_string());
            let _ = self.sender.send(record);
        }
    }
}
