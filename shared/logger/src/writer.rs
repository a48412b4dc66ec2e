//! Log records and the dedicated file-writer thread.

use crate::error::Result;
use crate::level::LogLevel;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::Receiver;

/// One formatted log entry, stamped at the call site.
#[derive(Debug, Clone)]
pub(crate) struct Record {
    timestamp: String,
    level: LogLevel,
    component: Option<String>,
    text: String,
}

impl Record {
    /// Creates a record with the current local timestamp.
    pub fn new(level: LogLevel, component: Option<String>, text: String) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            component,
            text,
        }
    }

    /// Renders the record as a single log line, newline included.
    pub fn line(&self) -> String {
        match &self.component {
            Some(component) => format!(
                "[{}] {} ({}): {}\n",
                self.timestamp, self.level, component, self.text
            ),
            None => format!("[{}] {}: {}\n", self.timestamp, self.level, self.text),
        }
    }
}

/// Owns the open log file on the writer thread.
struct Writer {
    file: File,
}

impl Writer {
    fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    fn write_record(&mut self, record: &Record) {
        if let Err(e) = self.file.write_all(record.line().as_bytes()) {
            eprintln!("Error writing log: {}", e);
            return;
        }
        if let Err(e) = self.file.flush() {
            eprintln!("Error flushing log: {}", e);
        }
    }

    fn run(mut self, receiver: Receiver<Record>) {
        for record in receiver {
            self.write_record(&record);
        }
    }
}

/// Opens the log file and spawns the writer loop on its own thread.
///
/// The thread exits once every connected sender has been dropped.
pub(crate) fn spawn(path: &Path, receiver: Receiver<Record>) -> Result<()> {
    let writer = Writer::new(path)?;
    std::thread::spawn(move || writer.run(receiver));
    Ok(())
}
