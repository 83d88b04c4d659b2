//! Exporter integration: formatter output through every renderer
//!
//! - PDF windows reconstruct the whole layout exactly once
//! - JSON output carries every formatter row
//! - QR capacity failures are explicit
//! - Sinks receive bytes only on success

use std::sync::Arc;

use chrono::Utc;
use device_inspector::export::pdf::{self, CONTENT_HEIGHT};
use device_inspector::export::{json, suggested_file_name};
use device_inspector::{
    BenchmarkEngine, ComparisonEngine, DiagnosticKind, DiagnosticResult, ExportFormat,
    ExportOptions, ExportOutcome, ExportRequest, Exporter, FileSink, HealthCheckEngine,
    MemorySink, Report, ReportFormatter, ReportRow, SeededValueSource, StaticHardwareFacts,
};
use serde_json::Value;

fn health_result() -> DiagnosticResult {
    let facts = Arc::new(StaticHardwareFacts::demo());
    HealthCheckEngine::new(facts, Box::new(SeededValueSource::new(5)))
        .run()
        .unwrap()
        .into()
}

fn all_results() -> Vec<DiagnosticResult> {
    let facts = Arc::new(StaticHardwareFacts::demo());
    let performance = BenchmarkEngine::new(facts.clone(), Box::new(SeededValueSource::new(6)))
        .with_population(Some(75_000))
        .run()
        .unwrap();
    let comparison = ComparisonEngine::new(facts, Box::new(SeededValueSource::new(7)))
        .with_performance(Some(performance.clone()))
        .run()
        .unwrap();
    vec![health_result(), performance.into(), comparison.into()]
}

fn report_with_fields(n: usize) -> Report {
    Report {
        kind: DiagnosticKind::HealthCheck,
        title: "Device Health Report".to_string(),
        generated_at: Utc::now(),
        rows: (0..n)
            .map(|i| ReportRow::field(format!("Field {}", i), format!("value {}", i)))
            .collect(),
    }
}

/// Every line lands in exactly one window, entirely inside it, in order.
fn assert_windows_reconstruct(report: &Report, expected_pages: usize) {
    let layout = pdf::layout_report(report, CONTENT_HEIGHT);
    let pages = pdf::paginate(&layout, CONTENT_HEIGHT);
    assert_eq!(pages.len(), expected_pages);

    let mut rebuilt = Vec::new();
    let mut expected_top = 0;
    for page in &pages {
        assert_eq!(page.top, expected_top);
        assert_eq!(page.bottom - page.top, CONTENT_HEIGHT);
        expected_top = page.bottom;
        for line in &layout.lines[page.lines.clone()] {
            assert!(line.y >= page.top);
            assert!(line.y + line.height <= page.bottom);
            rebuilt.push(line.clone());
        }
    }
    assert_eq!(rebuilt, layout.lines);
}

#[test]
fn test_pdf_single_line_body() {
    assert_windows_reconstruct(&report_with_fields(0), 1);
    assert_windows_reconstruct(&report_with_fields(1), 1);
}

#[test]
fn test_pdf_exactly_one_page() {
    // Title 28 + 57 fields of 16 = 940 of 950
    assert_windows_reconstruct(&report_with_fields(57), 1);
    assert_windows_reconstruct(&report_with_fields(58), 2);
}

#[test]
fn test_pdf_five_pages() {
    // 57 fields on the first page, 59 on each following one
    assert_windows_reconstruct(&report_with_fields(260), 5);
}

#[test]
fn test_pdf_real_reports_reconstruct() {
    for result in all_results() {
        let report = ReportFormatter::build(&result, Utc::now());
        let layout = pdf::layout_report(&report, CONTENT_HEIGHT);
        let expected = pdf::paginate(&layout, CONTENT_HEIGHT).len();
        assert_windows_reconstruct(&report, expected);
    }
}

#[test]
fn test_json_contains_every_row() {
    for result in all_results() {
        let report = ReportFormatter::build(&result, Utc::now());
        let value: Value = serde_json::from_slice(&json::render(&report).unwrap()).unwrap();
        let body = &value["report"];

        for section in report.sections() {
            let target = match section.title {
                Some(title) => &body[title],
                None => body,
            };
            for row in &section.fields {
                if row.value == "N/A" {
                    continue;
                }
                assert_eq!(
                    target[row.label.as_str()],
                    Value::String(row.value.clone()),
                    "missing {:?} in {:?}",
                    row.label,
                    section.title
                );
            }
        }
    }
}

#[test]
fn test_json_shape_is_stable() {
    let result = health_result();
    let at = Utc::now();
    let a = json::render(&ReportFormatter::build(&result, at)).unwrap();
    let b = json::render(&ReportFormatter::build(&result, at)).unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_every_format_exports_to_memory() {
    let exporter = Exporter::new(ExportOptions::default());
    for result in all_results() {
        for format in ExportFormat::ALL {
            let sink = tokio::sync::Mutex::new(MemorySink::default());
            let outcome = exporter
                .export(ExportRequest::new(result.clone(), format), &sink)
                .await;
            assert!(outcome.is_success(), "{}: {}", format, outcome.message());

            let sink = sink.into_inner();
            assert_eq!(sink.writes, 1);
            let magic: &[u8] = match format {
                ExportFormat::Pdf => b"%PDF",
                ExportFormat::Spreadsheet => b"PK",
                ExportFormat::Qr => b"\x89PNG",
                ExportFormat::Json => b"{",
                ExportFormat::Text => b"=",
            };
            assert!(sink.data.starts_with(magic), "{} output", format);
        }
    }
}

#[tokio::test]
async fn test_qr_capacity_failure_is_reported() {
    let options = ExportOptions {
        qr_max_payload_bytes: 16,
        ..ExportOptions::default()
    };
    let exporter = Exporter::new(options);
    let sink = tokio::sync::Mutex::new(MemorySink::default());

    let outcome = exporter
        .export(ExportRequest::new(health_result(), ExportFormat::Qr), &sink)
        .await;

    assert!(matches!(outcome, ExportOutcome::Failure { .. }));
    assert!(outcome.message().contains("capacity"), "{}", outcome.message());
    assert_eq!(sink.lock().await.writes, 0);
}

#[tokio::test]
async fn test_file_sink_writes_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let result = health_result();
    let name = suggested_file_name(result.kind(), ExportFormat::Json, &Utc::now());
    let path = dir.path().join("exports").join(&name);

    let exporter = Exporter::new(ExportOptions::default());
    let sink = tokio::sync::Mutex::new(FileSink::new(&path));
    let outcome = exporter
        .export(ExportRequest::new(result, ExportFormat::Json), &sink)
        .await;

    assert!(outcome.is_success());
    assert!(name.starts_with("health_check_report_") && name.ends_with(".json"));
    let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(written["kind"], "health_check");
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_failed_export_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.png");
    let options = ExportOptions {
        qr_max_payload_bytes: 8,
        ..ExportOptions::default()
    };
    let sink = tokio::sync::Mutex::new(FileSink::new(&path));
    let outcome = Exporter::new(options)
        .export(ExportRequest::new(health_result(), ExportFormat::Qr), &sink)
        .await;

    assert!(!outcome.is_success());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_concurrent_exports_share_one_sink() {
    let exporter = Exporter::new(ExportOptions::default());
    let result = health_result();
    let sink = tokio::sync::Mutex::new(MemorySink::default());

    let (json, text) = tokio::join!(
        exporter.export(ExportRequest::new(result.clone(), ExportFormat::Json), &sink),
        exporter.export(ExportRequest::new(result, ExportFormat::Text), &sink),
    );
    assert!(json.is_success(), "{}", json.message());
    assert!(text.is_success(), "{}", text.message());

    let sink = sink.into_inner();
    assert_eq!(sink.writes, 2);
    // The sink holds exactly one of the two outputs, never a mix
    match serde_json::from_slice::<Value>(&sink.data) {
        Ok(value) => assert_eq!(value["kind"], "health_check"),
        Err(_) => {
            let body = String::from_utf8(sink.data).unwrap();
            assert!(body.starts_with('='));
            assert_eq!(body.matches("End of report").count(), 1);
            assert!(body.trim_end().ends_with('='));
        }
    }
}
