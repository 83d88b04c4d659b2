//! Multi-format export
//!
//! `render` turns an `ExportRequest` (result × format) into bytes. Every
//! renderer except QR works from the shared `Report` rows; QR encodes a
//! compact summary of the result instead. `Exporter` runs rendering on a
//! blocking worker, writes under the sink's lock and folds any failure into
//! an `ExportOutcome`.

pub mod json;
pub mod pdf;
pub mod qr;
pub mod spreadsheet;
pub mod text;

use crate::config::DiagnosticsSettings;
use crate::error::{AppError, ExportError};
use crate::models::{DiagnosticKind, DiagnosticResult};
use crate::report::ReportFormatter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Text,
    Json,
    Pdf,
    Spreadsheet,
    Qr,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Text,
        ExportFormat::Json,
        ExportFormat::Pdf,
        ExportFormat::Spreadsheet,
        ExportFormat::Qr,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Qr => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Qr => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "JSON",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Qr => "QR code",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            "spreadsheet" | "xlsx" => Ok(ExportFormat::Spreadsheet),
            "qr" | "png" => Ok(ExportFormat::Qr),
            other => Err(format!(
                "unknown export format '{}' (expected text, json, pdf, xlsx or qr)",
                other
            )),
        }
    }
}

/// One result to render in one format
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub result: DiagnosticResult,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn new(result: impl Into<DiagnosticResult>, format: ExportFormat) -> Self {
        ExportRequest {
            result: result.into(),
            format,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.result.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub generated_at: DateTime<Utc>,
    pub qr_image_size: u32,
    pub qr_max_payload_bytes: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            generated_at: Utc::now(),
            qr_image_size: qr::DEFAULT_IMAGE_SIZE,
            qr_max_payload_bytes: qr::MAX_PAYLOAD_BYTES,
        }
    }
}

impl ExportOptions {
    pub fn from_settings(settings: &DiagnosticsSettings) -> Self {
        ExportOptions {
            generated_at: Utc::now(),
            qr_image_size: settings.qr_image_size,
            qr_max_payload_bytes: settings.qr_max_payload_bytes,
        }
    }
}

/// Render a request to bytes.
pub fn render(request: &ExportRequest, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let report = ReportFormatter::build(&request.result, options.generated_at);
    match request.format {
        ExportFormat::Text => Ok(text::render(&report).into_bytes()),
        ExportFormat::Json => json::render(&report),
        ExportFormat::Pdf => pdf::render(&report),
        ExportFormat::Spreadsheet => spreadsheet::render(&report),
        ExportFormat::Qr => qr::render(&request.result, options),
    }
}

/// `<kind>_report_<YYYYmmdd_HHMMSS>.<ext>`
pub fn suggested_file_name(
    kind: DiagnosticKind,
    format: ExportFormat,
    at: &DateTime<Utc>,
) -> String {
    format!(
        "{}_report_{}.{}",
        kind.slug(),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Destination for rendered bytes. `accept` is called once per export.
pub trait ExportSink: Send {
    fn accept(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn describe(&self) -> String;
}

/// Writes to a temp file beside the target, then renames into place.
/// A failed write never leaves a file at `path`.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

impl ExportSink for FileSink {
    fn accept(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        let written = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &self.path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Collects output in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub data: Vec<u8>,
    pub writes: usize,
}

impl ExportSink for MemorySink {
    fn accept(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Success {
        format: ExportFormat,
        bytes: usize,
        message: String,
    },
    Failure {
        message: String,
    },
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExportOutcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ExportOutcome::Success { message, .. } | ExportOutcome::Failure { message } => {
                message.as_str()
            }
        }
    }
}

pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Exporter { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Render `request` and hand the bytes to `sink`. Never panics or errors;
    /// every failure comes back as `ExportOutcome::Failure`.
    pub async fn export<S: ExportSink>(
        &self,
        request: ExportRequest,
        sink: &tokio::sync::Mutex<S>,
    ) -> ExportOutcome {
        let kind = request.kind();
        let format = request.format;
        let options = self.options.clone();

        let rendered = tokio::task::spawn_blocking(move || render(&request, &options)).await;
        let bytes = match rendered {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return failure(kind, format, e),
            Err(join) => {
                return failure(
                    kind,
                    format,
                    ExportError::Encoding(format!("renderer stopped: {}", join)),
                )
            }
        };

        let mut sink = sink.lock().await;
        if let Err(e) = sink.accept(&bytes) {
            return failure(kind, format, ExportError::Io(e));
        }

        let message = format!(
            "Exported {} as {} to {}",
            kind,
            format,
            sink.describe()
        );
        log::info!("[EXPORT] ✓ {} ({} bytes)", message, bytes.len());
        ExportOutcome::Success {
            format,
            bytes: bytes.len(),
            message,
        }
    }
}

fn failure(kind: DiagnosticKind, format: ExportFormat, error: ExportError) -> ExportOutcome {
    log::error!("[EXPORT] {} export of {} failed: {}", format, kind, error);
    ExportOutcome::Failure {
        message: AppError::from(error).user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_suggested_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            suggested_file_name(DiagnosticKind::HealthCheck, ExportFormat::Pdf, &at),
            "health_check_report_20240309_140507.pdf"
        );
    }

    #[test]
    fn test_file_sink_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.txt");
        let mut sink = FileSink::new(&path);
        sink.accept(b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(!dir.path().join("out/report.txt.partial").exists());
    }

    #[test]
    fn test_file_sink_failure_leaves_no_target() {
        let dir = tempfile::tempdir().unwrap();
        // The target path is an existing directory, so the rename fails
        let target = dir.path().join("taken");
        fs::create_dir_all(target.join("child")).unwrap();
        let mut sink = FileSink::new(&target);
        assert!(sink.accept(b"data").is_err());
        assert!(target.is_dir());
        assert!(!dir.path().join("taken.partial").exists());
    }
}
