//! PDF renderer
//!
//! Rendering is split in three steps:
//!
//! 1. `layout_report` flows every row into one continuous column of lines,
//!    each with a vertical offset and height in page units.
//! 2. `paginate` cuts that column into fixed windows of `CONTENT_HEIGHT`;
//!    page n shows `[n * H, (n + 1) * H)`.
//! 3. `render` draws each window onto its own page with a header and footer.
//!
//! Layout never lets a line straddle a window boundary: a line that would is
//! moved down to the start of the next window. Every line therefore lands on
//! exactly one page.

use crate::error::ExportError;
use crate::report::Report;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt};
use std::ops::Range;

pub const PAGE_WIDTH: u32 = 792;
pub const PAGE_HEIGHT: u32 = 1120;
pub const MARGIN: u32 = 50;
pub const HEADER_BAND: u32 = 40;
pub const FOOTER_BAND: u32 = 30;
pub const CONTENT_WIDTH: u32 = PAGE_WIDTH - 2 * MARGIN;
pub const CONTENT_HEIGHT: u32 = PAGE_HEIGHT - 2 * MARGIN - HEADER_BAND - FOOTER_BAND;

/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH_RATIO: f32 = 0.52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Section,
    Field,
}

impl LineStyle {
    pub fn font_size(&self) -> f32 {
        match self {
            LineStyle::Title => 18.0,
            LineStyle::Section => 13.0,
            LineStyle::Field => 10.0,
        }
    }

    pub fn line_height(&self) -> u32 {
        match self {
            LineStyle::Title => 28,
            LineStyle::Section => 22,
            LineStyle::Field => 16,
        }
    }

    fn bold(&self) -> bool {
        !matches!(self, LineStyle::Field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub text: String,
    pub style: LineStyle,
    /// Offset of the line's top edge from the start of the flow
    pub y: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub lines: Vec<LayoutLine>,
    pub total_height: u32,
}

/// One page's window onto the layout
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    pub index: usize,
    pub top: u32,
    pub bottom: u32,
    pub lines: Range<usize>,
}

/// Builtin PDF fonts only cover Latin-1; keep to ASCII so nothing renders as garbage
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '°' => out.push_str(" deg"),
            '✓' => out.push('*'),
            '–' | '—' => out.push('-'),
            '’' | '‘' => out.push('\''),
            '“' | '”' => out.push('"'),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if c.is_whitespace() => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

fn max_chars(style: LineStyle, width: u32) -> usize {
    let glyph = style.font_size() * GLYPH_WIDTH_RATIO;
    ((width as f32 / glyph).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Flow {
    window: u32,
    cursor: u32,
    lines: Vec<LayoutLine>,
}

impl Flow {
    fn place(&mut self, text: String, style: LineStyle) {
        let height = style.line_height();
        let offset = self.cursor % self.window;
        if offset != 0 && offset + height > self.window {
            self.cursor += self.window - offset;
        }
        self.lines.push(LayoutLine {
            text,
            style,
            y: self.cursor,
            height,
        });
        self.cursor += height;
    }
}

/// Flow the report into one continuous column using `window`-high pages.
pub fn layout_report(report: &Report, window: u32) -> Layout {
    let mut flow = Flow {
        window: window.max(1),
        cursor: 0,
        lines: Vec::new(),
    };

    for line in wrap(&sanitize(&report.title), max_chars(LineStyle::Title, CONTENT_WIDTH)) {
        flow.place(line, LineStyle::Title);
    }
    for row in &report.rows {
        let (text, style) = if row.is_section_header() {
            (sanitize(&row.label), LineStyle::Section)
        } else {
            (
                sanitize(&format!("{}: {}", row.label, row.value)),
                LineStyle::Field,
            )
        };
        for line in wrap(&text, max_chars(style, CONTENT_WIDTH)) {
            flow.place(line, style);
        }
    }

    Layout {
        total_height: flow.cursor,
        lines: flow.lines,
    }
}

/// Cut the layout into `max(1, ceil(total / window))` consecutive windows.
pub fn paginate(layout: &Layout, window: u32) -> Vec<PageSlice> {
    let window = window.max(1);
    let page_count = (layout.total_height.div_ceil(window)).max(1) as usize;
    let mut pages = Vec::with_capacity(page_count);
    let mut start = 0;

    for index in 0..page_count {
        let top = index as u32 * window;
        let bottom = top + window;
        let mut end = start;
        while end < layout.lines.len() && layout.lines[end].y < bottom {
            end += 1;
        }
        pages.push(PageSlice {
            index,
            top,
            bottom,
            lines: start..end,
        });
        start = end;
    }
    pages
}

fn pt_to_mm(value: f32) -> Mm {
    Mm::from(Pt(value))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn draw_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    report: &Report,
    layout: &Layout,
    page: &PageSlice,
    page_count: usize,
) {
    let page_h = PAGE_HEIGHT as f32;
    let left = MARGIN as f32;

    // Header band
    let header_baseline = page_h - MARGIN as f32 - 16.0;
    layer.use_text(
        sanitize(&report.title),
        12.0,
        pt_to_mm(left),
        pt_to_mm(header_baseline),
        &fonts.bold,
    );
    let page_label = format!("Page {} of {}", page.index + 1, page_count);
    let label_width = page_label.len() as f32 * 10.0 * GLYPH_WIDTH_RATIO;
    layer.use_text(
        page_label,
        10.0,
        pt_to_mm((PAGE_WIDTH - MARGIN) as f32 - label_width),
        pt_to_mm(header_baseline),
        &fonts.regular,
    );

    // Content window
    let content_top = page_h - (MARGIN + HEADER_BAND) as f32;
    for line in &layout.lines[page.lines.clone()] {
        let offset = (line.y - page.top) as f32;
        let baseline = content_top - offset - line.style.font_size();
        let font = if line.style.bold() {
            &fonts.bold
        } else {
            &fonts.regular
        };
        layer.use_text(
            line.text.clone(),
            line.style.font_size(),
            pt_to_mm(left),
            pt_to_mm(baseline),
            font,
        );
    }

    // Footer band
    layer.use_text(
        sanitize(&report.generated_label()),
        8.0,
        pt_to_mm(left),
        pt_to_mm(MARGIN as f32 + 10.0),
        &fonts.regular,
    );
}

pub fn render(report: &Report) -> Result<Vec<u8>, ExportError> {
    let layout = layout_report(report, CONTENT_HEIGHT);
    let pages = paginate(&layout, CONTENT_HEIGHT);
    log::debug!(
        "[EXPORT] PDF layout: {} lines, {} units, {} pages",
        layout.lines.len(),
        layout.total_height,
        pages.len()
    );

    let width = pt_to_mm(PAGE_WIDTH as f32);
    let height = pt_to_mm(PAGE_HEIGHT as f32);
    let (doc, first_page, first_layer) =
        PdfDocument::new(sanitize(&report.title), width, height, "Content");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?,
    };

    for page in &pages {
        let layer = if page.index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(width, height, "Content");
            doc.get_page(p).get_layer(l)
        };
        draw_page(&layer, &fonts, report, &layout, page, pages.len());
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosticKind;
    use crate::report::ReportRow;
    use chrono::Utc;

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

    #[test]
    fn test_content_geometry() {
        assert_eq!(CONTENT_HEIGHT, 950);
        assert_eq!(CONTENT_WIDTH, 692);
    }

    #[test]
    fn test_line_pushed_past_boundary() {
        // Title (28) + 57 fields (912) = 940: the 58th field would end at 956
        let layout = layout_report(&report_with_fields(58), CONTENT_HEIGHT);
        let last = layout.lines.last().unwrap();
        assert_eq!(last.y, CONTENT_HEIGHT);
        assert_eq!(paginate(&layout, CONTENT_HEIGHT).len(), 2);
    }

    #[test]
    fn test_empty_report_has_one_page() {
        let layout = Layout {
            lines: Vec::new(),
            total_height: 0,
        };
        let pages = paginate(&layout, CONTENT_HEIGHT);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc", 4), vec!["a bb", "ccc"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("31.5°C"), "31.5 degC");
        assert_eq!(sanitize("✓ done"), "* done");
    }

    #[test]
    fn test_long_value_wraps() {
        let report = Report {
            kind: DiagnosticKind::HealthCheck,
            title: "T".to_string(),
            generated_at: Utc::now(),
            rows: vec![ReportRow::field("Details", "word ".repeat(200))],
        };
        let layout = layout_report(&report, CONTENT_HEIGHT);
        assert!(layout.lines.len() > 2);
        let limit = max_chars(LineStyle::Field, CONTENT_WIDTH);
        assert!(layout.lines.iter().all(|l| l.text.chars().count() <= limit));
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&report_with_fields(120)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
