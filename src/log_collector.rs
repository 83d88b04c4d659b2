//! Background logging pipeline.
//!
//! Every `log::info!()`/`warn!()`/`error!()` call is formatted on the calling
//! thread and pushed down an unbounded crossbeam channel. A dedicated OS
//! thread drains the channel into the session log file, so engine workers and
//! exporters never block on disk I/O.
//!
//! ```text
//! log::*! macros
//!     |
//! [LogCollector]  (non-blocking send)
//!     |  crossbeam unbounded channel
//!     v
//! [writer thread] --> <log_dir>/<YYYYmmdd_HHMMSS>.log
//!                 \-> stderr (warnings and errors only)
//! ```

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Internal log line or special marker
enum LogMessage {
    Line(LogLine),
    /// Flush marker; the writer answers once everything before it is on disk
    Flush(std::sync::mpsc::Sender<()>),
}

/// A formatted log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
    /// Wall-clock time the line was produced
    pub timestamp: String,
}

impl LogLine {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogLine {
            level,
            message: message.into(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    fn formatted(&self) -> String {
        format!("[{}] [{}] {}\n", self.timestamp, self.level, self.message)
    }
}

/// Ensure the logs directory exists
pub fn ensure_logs_dir_exists(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|e| format!("Failed to create logs directory: {}", e))
}

/// Logger that hands lines to a background writer thread
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    level: LevelFilter,
    session_path: PathBuf,
}

impl LogCollector {
    /// Create the session log file and start the writer thread
    pub fn new(log_dir: &Path, level: LevelFilter) -> Result<Self, String> {
        ensure_logs_dir_exists(log_dir)?;
        let session_path = log_dir.join(format!("{}.log", Local::now().format("%Y%m%d_%H%M%S")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&session_path)
            .map_err(|e| format!("Failed to open log file {}: {}", session_path.display(), e))?;

        let (tx, rx) = unbounded::<LogMessage>();

        // OS thread rather than a tokio task: it must outlive any runtime and
        // keep draining while blocking workers log
        std::thread::spawn(move || {
            let mut file: File = file;
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = line.formatted();
                        let _ = file.write_all(formatted.as_bytes());
                        if line.level <= Level::Warn {
                            eprint!("{}", formatted);
                        }
                    }
                    LogMessage::Flush(done) => {
                        let _ = file.flush();
                        let _ = file.sync_data();
                        let _ = done.send(());
                    }
                }
            }
            let _ = file.flush();
        });

        Ok(LogCollector {
            tx,
            level,
            session_path,
        })
    }

    /// Create a collector and register it as the global `log` backend
    pub fn install(log_dir: &Path, level: LevelFilter) -> Result<Self, String> {
        let collector = Self::new(log_dir, level)?;
        log::set_boxed_logger(Box::new(collector.clone()))
            .map_err(|e| format!("Logger already installed: {}", e))?;
        log::set_max_level(level);
        Ok(collector)
    }

    pub fn session_log_path(&self) -> &Path {
        &self.session_path
    }

    /// Queue a line. Never blocks.
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    fn flush_blocking(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }

    /// Wait until every line logged before this call is on disk
    pub async fn wait_for_empty(&self) -> Result<(), String> {
        let collector = self.clone();
        tokio::task::spawn_blocking(move || collector.flush_blocking())
            .await
            .map_err(|e| format!("Flush task failed: {}", e))?
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.log_line(LogLine::new(record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {
        let _ = self.flush_blocking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_lines_reach_disk_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path(), LevelFilter::Info).unwrap();

        for i in 0..500 {
            collector.log_line(LogLine::new(Level::Info, format!("[TEST] message {}", i)));
        }
        collector.wait_for_empty().await.unwrap();

        let content = fs::read_to_string(collector.session_log_path()).unwrap();
        assert_eq!(content.lines().count(), 500);
        assert!(content.contains("[INFO] [TEST] message 499"));
    }

    #[test]
    fn test_level_filter() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path(), LevelFilter::Warn).unwrap();
        let debug = Metadata::builder().level(Level::Debug).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!collector.enabled(&debug));
        assert!(collector.enabled(&error));
    }

    #[test]
    fn test_sync_flush() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path(), LevelFilter::Trace).unwrap();
        collector.log(
            &Record::builder()
                .args(format_args!("[HISTORY] saved"))
                .level(Level::Info)
                .build(),
        );
        Log::flush(&collector);
        let content = fs::read_to_string(collector.session_log_path()).unwrap();
        assert!(content.contains("[HISTORY] saved"));
    }
}
