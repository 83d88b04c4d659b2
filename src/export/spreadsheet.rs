//! Spreadsheet renderer
//!
//! `plan_sheet` decides every cell, style and merge up front; `render` only
//! replays the plan through `rust_xlsxwriter`.

use crate::error::ExportError;
use crate::models::DiagnosticKind;
use crate::report::Report;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Title,
    Header,
    CategoryTitle,
    FieldLabel,
    FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCell {
    pub row: u32,
    pub col: u16,
    pub text: String,
    pub style: CellStyle,
}

/// A row-wide cell spanning `first_col..=last_col`
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMerge {
    pub row: u32,
    pub first_col: u16,
    pub last_col: u16,
    pub text: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub sheet_name: String,
    pub cells: Vec<PlannedCell>,
    pub merges: Vec<PlannedMerge>,
    pub column_widths: [f64; 2],
}

impl SheetPlan {
    pub fn row_count(&self) -> u32 {
        let cells = self.cells.iter().map(|c| c.row + 1);
        let merges = self.merges.iter().map(|m| m.row + 1);
        cells.chain(merges).max().unwrap_or(0)
    }
}

const LABEL_COL: u16 = 0;
const VALUE_COL: u16 = 1;

fn sheet_name(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::HealthCheck => "Health Check",
        DiagnosticKind::Performance => "Performance",
        DiagnosticKind::Comparison => "Comparison",
    }
}

pub fn plan_sheet(report: &Report) -> SheetPlan {
    let mut cells = Vec::new();
    let mut merges = Vec::new();
    let mut label_width = "Field".len();
    let mut value_width = "Value".len();

    merges.push(PlannedMerge {
        row: 0,
        first_col: LABEL_COL,
        last_col: VALUE_COL,
        text: format!("{} ({})", report.title, report.generated_label()),
        style: CellStyle::Title,
    });
    cells.push(PlannedCell {
        row: 1,
        col: LABEL_COL,
        text: "Field".to_string(),
        style: CellStyle::Header,
    });
    cells.push(PlannedCell {
        row: 1,
        col: VALUE_COL,
        text: "Value".to_string(),
        style: CellStyle::Header,
    });

    let mut row = 2;
    for entry in &report.rows {
        if entry.is_section_header() {
            merges.push(PlannedMerge {
                row,
                first_col: LABEL_COL,
                last_col: VALUE_COL,
                text: entry.label.clone(),
                style: CellStyle::CategoryTitle,
            });
        } else {
            label_width = label_width.max(entry.label.chars().count());
            value_width = value_width.max(entry.value.chars().count());
            cells.push(PlannedCell {
                row,
                col: LABEL_COL,
                text: entry.label.clone(),
                style: CellStyle::FieldLabel,
            });
            cells.push(PlannedCell {
                row,
                col: VALUE_COL,
                text: entry.value.clone(),
                style: CellStyle::FieldValue,
            });
        }
        row += 1;
    }

    SheetPlan {
        sheet_name: sheet_name(report.kind).to_string(),
        cells,
        merges,
        column_widths: [
            (label_width as f64 + 2.0).clamp(12.0, 40.0),
            (value_width as f64 + 2.0).clamp(16.0, 80.0),
        ],
    }
}

fn format_for(style: CellStyle) -> Format {
    match style {
        CellStyle::Title => Format::new()
            .set_bold()
            .set_font_size(14)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x1F4E79))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter),
        CellStyle::Header => Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x2E75B6))
            .set_border(FormatBorder::Thin),
        CellStyle::CategoryTitle => Format::new()
            .set_bold()
            .set_font_size(12)
            .set_background_color(Color::RGB(0xDDEBF7))
            .set_border(FormatBorder::Thin),
        CellStyle::FieldLabel => Format::new()
            .set_bold()
            .set_border(FormatBorder::Thin),
        CellStyle::FieldValue => Format::new()
            .set_border(FormatBorder::Thin)
            .set_text_wrap(),
    }
}

fn write_plan(plan: &SheetPlan) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&plan.sheet_name)?;
    worksheet.set_column_width(LABEL_COL, plan.column_widths[0])?;
    worksheet.set_column_width(VALUE_COL, plan.column_widths[1])?;

    for merge in &plan.merges {
        worksheet.merge_range(
            merge.row,
            merge.first_col,
            merge.row,
            merge.last_col,
            &merge.text,
            &format_for(merge.style),
        )?;
    }
    for cell in &plan.cells {
        worksheet.write_string_with_format(cell.row, cell.col, &cell.text, &format_for(cell.style))?;
    }

    workbook.save_to_buffer()
}

pub fn render(report: &Report) -> Result<Vec<u8>, ExportError> {
    let plan = plan_sheet(report);
    write_plan(&plan).map_err(|e| ExportError::Spreadsheet(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportRow;
    use chrono::Utc;

    fn sample() -> Report {
        Report {
            kind: DiagnosticKind::Performance,
            title: "Performance Benchmark Report".to_string(),
            generated_at: Utc::now(),
            rows: vec![
                ReportRow::header("CPU"),
                ReportRow::field("Score", "80/100"),
                ReportRow::field("Grade", "A"),
                ReportRow::header("GPU"),
                ReportRow::field("Score", "60/100"),
            ],
        }
    }

    #[test]
    fn test_plan_styles_and_merges() {
        let plan = plan_sheet(&sample());
        // Title + two category rows
        assert_eq!(plan.merges.len(), 3);
        assert_eq!(plan.merges[0].style, CellStyle::Title);
        assert_eq!(plan.merges[1].row, 2);
        assert_eq!(plan.merges[1].text, "CPU");
        assert_eq!(plan.merges[1].style, CellStyle::CategoryTitle);
        assert!(plan.merges.iter().all(|m| m.first_col == 0 && m.last_col == 1));

        let score = plan
            .cells
            .iter()
            .find(|c| c.row == 3 && c.col == VALUE_COL)
            .unwrap();
        assert_eq!(score.text, "80/100");
        assert_eq!(score.style, CellStyle::FieldValue);
        assert_eq!(plan.row_count(), 7);
    }

    #[test]
    fn test_no_cell_overlaps_a_merge() {
        let plan = plan_sheet(&sample());
        for merge in &plan.merges {
            assert!(plan.cells.iter().all(|c| c.row != merge.row));
        }
    }

    #[test]
    fn test_column_widths_bounded() {
        let mut report = sample();
        report.rows.push(ReportRow::field("Details", "x".repeat(500)));
        let plan = plan_sheet(&report);
        assert_eq!(plan.column_widths[1], 80.0);
        assert_eq!(plan.column_widths[0], 12.0);
    }

    #[test]
    fn test_render_is_xlsx_zip() {
        let bytes = render(&sample()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
