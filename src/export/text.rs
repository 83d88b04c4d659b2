//! Plain text renderer

use crate::report::Report;

const RULE_WIDTH: usize = 60;

pub fn render(report: &Report) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!("  {}\n", report.title.to_uppercase()));
    out.push_str(&format!("  {}\n", report.generated_label()));
    out.push_str(&heavy);
    out.push('\n');

    for row in &report.rows {
        if row.is_section_header() {
            out.push_str(&format!("\n[{}]\n", row.label));
        } else {
            out.push_str(&format!("{}: {}\n", row.label, row.value));
        }
    }

    out.push('\n');
    out.push_str(&light);
    out.push('\n');
    out.push_str("  End of report - Device Inspector\n");
    out.push_str(&heavy);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosticKind;
    use crate::report::ReportRow;
    use chrono::Utc;

    #[test]
    fn test_banner_sections_and_fields() {
        let report = Report {
            kind: DiagnosticKind::HealthCheck,
            title: "Device Health Report".to_string(),
            generated_at: Utc::now(),
            rows: vec![
                ReportRow::header("Battery"),
                ReportRow::field("Score", "70/100"),
            ],
        };
        let text = render(&report);
        assert!(text.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(text.contains("DEVICE HEALTH REPORT"));
        assert!(text.contains("\n[Battery]\nScore: 70/100\n"));
        assert!(text.trim_end().ends_with(&"=".repeat(RULE_WIDTH)));
        // Headers never render as "label: "
        assert!(!text.contains("Battery: "));
    }
}
