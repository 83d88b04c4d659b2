//! JSON renderer
//!
//! Sections become nested objects keyed by title. A report without any
//! section headers falls back to a flat `label -> value` object. Key order
//! follows row order.

use crate::error::ExportError;
use crate::report::Report;
use serde_json::{Map, Value};

pub fn render(report: &Report) -> Result<Vec<u8>, ExportError> {
    let json = serde_json::to_string_pretty(&to_value(report))?;
    Ok(json.into_bytes())
}

pub fn to_value(report: &Report) -> Value {
    let mut body = Map::new();

    if report.has_sections() {
        for section in report.sections() {
            let mut fields = Map::new();
            for row in &section.fields {
                insert_unique(&mut fields, &row.label, Value::String(row.value.clone()));
            }
            match section.title {
                Some(title) => insert_unique(&mut body, title, Value::Object(fields)),
                // Fields ahead of the first header stay at the top level
                None => {
                    for (label, value) in fields {
                        insert_unique(&mut body, &label, value);
                    }
                }
            }
        }
    } else {
        for row in report.field_rows() {
            insert_unique(&mut body, &row.label, Value::String(row.value.clone()));
        }
    }

    let mut root = Map::new();
    root.insert("title".to_string(), Value::String(report.title.clone()));
    root.insert(
        "kind".to_string(),
        Value::String(report.kind.slug().to_string()),
    );
    root.insert(
        "generated_at".to_string(),
        Value::String(report.generated_at.to_rfc3339()),
    );
    root.insert("report".to_string(), Value::Object(body));
    Value::Object(root)
}

fn insert_unique(map: &mut Map<String, Value>, key: &str, value: Value) {
    let mut candidate = key.to_string();
    let mut n = 2;
    while map.contains_key(&candidate) {
        candidate = format!("{} ({})", key, n);
        n += 1;
    }
    map.insert(candidate, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosticKind;
    use crate::report::ReportRow;
    use chrono::Utc;

    fn report(rows: Vec<ReportRow>) -> Report {
        Report {
            kind: DiagnosticKind::Performance,
            title: "Performance Benchmark Report".to_string(),
            generated_at: Utc::now(),
            rows,
        }
    }

    #[test]
    fn test_nested_by_section() {
        let r = report(vec![
            ReportRow::header("CPU"),
            ReportRow::field("Score", "80/100"),
            ReportRow::header("GPU"),
            ReportRow::field("Score", "60/100"),
        ]);
        let value = to_value(&r);
        assert_eq!(value["report"]["CPU"]["Score"], "80/100");
        assert_eq!(value["report"]["GPU"]["Score"], "60/100");
        assert_eq!(value["kind"], "performance");
    }

    #[test]
    fn test_flat_fallback() {
        let r = report(vec![
            ReportRow::field("Score", "80"),
            ReportRow::field("Score", "81"),
        ]);
        let value = to_value(&r);
        assert_eq!(value["report"]["Score"], "80");
        assert_eq!(value["report"]["Score (2)"], "81");
    }

    #[test]
    fn test_stable_output() {
        let r = report(vec![ReportRow::header("A"), ReportRow::field("x", "1")]);
        assert_eq!(render(&r).unwrap(), render(&r).unwrap());
    }
}
