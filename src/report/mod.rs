//! Report rows: the shared intermediate form every exporter consumes.
//!
//! A report is a flat, ordered list of `(label, value)` rows. A row with a
//! label and an empty value is a section header; every other row is a field
//! and always carries a non-empty value. Field labels are unique within their
//! section and section titles are unique within a report.

use crate::models::{
    DeviceComparison, DiagnosticKind, DiagnosticResult, HealthCheckResult, PerformanceScore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
}

impl ReportRow {
    pub fn header(label: impl Into<String>) -> Self {
        ReportRow {
            label: label.into(),
            value: String::new(),
        }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        ReportRow {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn is_section_header(&self) -> bool {
        !self.label.is_empty() && self.value.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.label.is_empty() && self.value.is_empty()
    }
}

/// Rows grouped under their section header
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection<'a> {
    /// None for fields that appear before any header
    pub title: Option<&'a str>,
    pub fields: Vec<&'a ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub kind: DiagnosticKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn sections(&self) -> Vec<ReportSection<'_>> {
        let mut sections: Vec<ReportSection<'_>> = Vec::new();
        for row in &self.rows {
            if row.is_section_header() {
                sections.push(ReportSection {
                    title: Some(row.label.as_str()),
                    fields: Vec::new(),
                });
                continue;
            }
            match sections.last_mut() {
                Some(section) => section.fields.push(row),
                None => sections.push(ReportSection {
                    title: None,
                    fields: vec![row],
                }),
            }
        }
        sections
    }

    pub fn has_sections(&self) -> bool {
        self.rows.iter().any(ReportRow::is_section_header)
    }

    pub fn field_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| !r.is_section_header())
    }

    pub fn generated_label(&self) -> String {
        format!("Generated {}", self.generated_at.format(TIMESTAMP_FORMAT))
    }
}

pub fn report_title(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::HealthCheck => "Device Health Report",
        DiagnosticKind::Performance => "Performance Benchmark Report",
        DiagnosticKind::Comparison => "Device Comparison Report",
    }
}

/// Keeps labels unique per section and values non-empty
#[derive(Default)]
struct RowsBuilder {
    rows: Vec<ReportRow>,
    titles: HashSet<String>,
    labels: HashSet<String>,
}

impl RowsBuilder {
    fn section(&mut self, title: &str) {
        let title = unique(&mut self.titles, title);
        self.labels.clear();
        self.rows.push(ReportRow::header(title));
    }

    fn field(&mut self, label: &str, value: impl Into<String>) {
        let mut value = value.into();
        if value.trim().is_empty() {
            value = MISSING_VALUE.to_string();
        }
        let label = unique(&mut self.labels, label);
        self.rows.push(ReportRow::field(label, value));
    }

    fn finish(self) -> Vec<ReportRow> {
        self.rows.into_iter().filter(|r| !r.is_blank()).collect()
    }
}

/// `label`, or `label (n)` for the nth repeat
fn unique(seen: &mut HashSet<String>, label: &str) -> String {
    let mut candidate = label.to_string();
    let mut n = 2;
    while seen.contains(&candidate) {
        candidate = format!("{} ({})", label, n);
        n += 1;
    }
    seen.insert(candidate.clone());
    candidate
}

/// Whole numbers without decimals, everything else to one place
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(result: &DiagnosticResult) -> Vec<ReportRow> {
        match result {
            DiagnosticResult::HealthCheck(r) => health_rows(r),
            DiagnosticResult::Performance(r) => performance_rows(r),
            DiagnosticResult::Comparison(r) => comparison_rows(r),
        }
    }

    pub fn build(result: &DiagnosticResult, generated_at: DateTime<Utc>) -> Report {
        let kind = result.kind();
        Report {
            kind,
            title: report_title(kind).to_string(),
            generated_at,
            rows: Self::format(result),
        }
    }
}

fn health_rows(result: &HealthCheckResult) -> Vec<ReportRow> {
    let mut b = RowsBuilder::default();

    b.section("Summary");
    b.field("Overall Score", format!("{}/100", result.overall_score));
    b.field("Status", result.overall_status.as_str());
    b.field("Checks Run", result.checks.len().to_string());
    b.field("Completed", format_time(&result.timestamp));

    for check in &result.checks {
        b.section(&check.name);
        b.field("Score", format!("{}/100", check.score));
        b.field("Status", check.status.as_str());
        b.field("Details", check.description.as_str());
        if let Some(rec) = &check.recommendation {
            b.field("Recommendation", rec.as_str());
        }
    }

    b.section("Recommendations");
    if result.recommendations.is_empty() {
        b.field("Advice", "No action needed");
    }
    for (i, rec) in result.recommendations.iter().enumerate() {
        b.field(&format!("{}", i + 1), rec.as_str());
    }

    b.finish()
}

fn performance_rows(result: &PerformanceScore) -> Vec<ReportRow> {
    let mut b = RowsBuilder::default();

    b.section("Summary");
    b.field("Overall Score", format!("{}/100", result.overall_score));
    b.field(
        "Grade",
        format!("{} ({})", result.grade.label(), result.grade.verdict()),
    );
    b.field("Tests Run", result.benchmark_results.len().to_string());
    b.field("Completed", format_time(&result.last_test_time));

    if let Some(ranking) = &result.device_ranking {
        b.section("Ranking");
        b.field(
            "Global Rank",
            format!("#{} of {}", ranking.global_rank, ranking.total_devices),
        );
        b.field("Percentile", ranking.percentile.to_string());

        if !ranking.similar_devices.is_empty() {
            b.section("Similar Devices");
            for device in &ranking.similar_devices {
                b.field(
                    &device.name,
                    format!("{} ({:+})", device.score, device.score_delta),
                );
            }
        }
    }

    for category in &result.category_scores {
        b.section(category.category.label());
        b.field("Score", format!("{}/100", category.score));
        b.field("Grade", category.grade.label());
        b.field("Details", category.details.as_str());
        for sub in &category.sub_results {
            b.field(
                &sub.test_name,
                format!("{} {}", format_number(sub.score), sub.unit),
            );
        }
    }

    b.finish()
}

fn comparison_rows(result: &DeviceComparison) -> Vec<ReportRow> {
    let mut b = RowsBuilder::default();
    let current = &result.current_device;
    let overall = &result.overall_comparison;

    b.section("Current Device");
    b.field("Name", current.device_name.as_str());
    b.field("Manufacturer", current.manufacturer.as_str());
    b.field("Model", current.model.as_str());
    b.field("CPU", current.specifications.cpu.as_str());
    b.field("RAM", current.specifications.ram.as_str());
    b.field("Storage", current.specifications.storage.as_str());
    b.field("Display", current.specifications.display.as_str());
    b.field("Battery", current.specifications.battery.as_str());
    b.field("Performance Score", current.performance_score.to_string());

    b.section("Overall");
    b.field(
        "Ranking",
        format!("#{} of {}", overall.overall_ranking, overall.total_devices),
    );
    b.field("Percentile", format!("{:.1}", overall.percentile));
    b.field("Recommendation", overall.recommendation.as_str());
    b.field("Updated", format_time(&result.last_update_time));

    b.section("Strengths");
    if overall.strengths.is_empty() {
        b.field("Strengths", "None identified");
    }
    for (i, s) in overall.strengths.iter().enumerate() {
        b.field(&format!("{}", i + 1), s.as_str());
    }

    b.section("Weaknesses");
    if overall.weaknesses.is_empty() {
        b.field("Weaknesses", "None identified");
    }
    for (i, w) in overall.weaknesses.iter().enumerate() {
        b.field(&format!("{}", i + 1), w.as_str());
    }

    for r in &result.comparison_results {
        let with_unit = |v: f64| format!("{} {}", format_number(v), r.unit);
        b.section(r.category.label());
        b.field("This Device", with_unit(r.current_score));
        b.field("Average", with_unit(r.average_score));
        b.field("Best", with_unit(r.best_score));
        b.field("Worst", with_unit(r.worst_score));
        b.field("Rank", format!("#{} of {}", r.ranking, r.total_devices));
    }

    b.section("Compared Devices");
    for device in &result.compared_devices {
        b.field(
            &device.device_name,
            format!("{} pts", device.performance_score),
        );
    }

    b.finish()
}
