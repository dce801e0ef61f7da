//! Renders study-document markdown onto A4 pages.
//!
//! Layout is a plain top-to-bottom flow: one line per markdown line, greedy
//! word wrapping, a fresh page once the cursor passes the bottom margin.
//! Courier is used throughout so the wrap width in characters is exact.

use crate::error::ExportError;
use printpdf::{BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem};
use tracing::{debug, info};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
pub const LINE_HEIGHT_MM: f32 = 7.0;

/// Courier glyph advance as a fraction of the font size.
const COURIER_ADVANCE_EM: f32 = 0.6;
const MM_PER_PT: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// `#` and `##` lines.
    Heading,
    /// `###` lines.
    Subheading,
    Body,
}

impl LineStyle {
    fn classify(line: &str) -> Self {
        if line.starts_with("###") {
            LineStyle::Subheading
        } else if line.starts_with('#') {
            LineStyle::Heading
        } else {
            LineStyle::Body
        }
    }

    pub fn font_size(self) -> f32 {
        match self {
            LineStyle::Heading => 16.0,
            LineStyle::Subheading => 12.0,
            LineStyle::Body => 10.0,
        }
    }

    fn font(self) -> BuiltinFont {
        match self {
            LineStyle::Heading | LineStyle::Subheading => BuiltinFont::CourierBold,
            LineStyle::Body => BuiltinFont::Courier,
        }
    }

    /// Characters that fit between the margins at this style's size.
    pub fn max_chars(self) -> usize {
        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let advance = COURIER_ADVANCE_EM * self.font_size() * MM_PER_PT;
        ((usable / advance).floor() as usize).max(1)
    }
}

/// A wrapped line and its baseline, measured from the top of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    pub y_mm: f32,
}

/// Lays out `sections`, each starting on a new page.
pub fn layout(sections: &[&str]) -> Vec<Vec<PlacedLine>> {
    let bottom = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = Vec::new();

    for section in sections {
        let mut page = Vec::new();
        let mut y = MARGIN_MM;
        for raw in section.lines() {
            let style = LineStyle::classify(raw);
            if style != LineStyle::Body {
                y += LINE_HEIGHT_MM;
            }
            for text in wrap(&display_text(raw, style), style.max_chars()) {
                if y > bottom {
                    pages.push(std::mem::take(&mut page));
                    y = MARGIN_MM;
                }
                page.push(PlacedLine { text, style, y_mm: y });
                y += LINE_HEIGHT_MM;
            }
        }
        pages.push(page);
    }
    pages
}

/// Produces PDF bytes for `sections`.
pub fn render_pdf(title: &str, sections: &[&str]) -> Result<Vec<u8>, ExportError> {
    let pages = layout(sections);
    if pages.iter().all(Vec::is_empty) {
        return Err(ExportError::EmptyDocument);
    }

    let pdf_pages: Vec<PdfPage> = pages
        .iter()
        .map(|lines| PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), page_ops(lines)))
        .collect();
    let page_count = pdf_pages.len();

    let mut warnings = Vec::new();
    let bytes = PdfDocument::new(title)
        .with_pages(pdf_pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    debug!(warnings = warnings.len(), "PDF writer finished");

    if bytes.is_empty() {
        return Err(ExportError::Pdf("writer produced no output".to_string()));
    }
    info!(title, pages = page_count, bytes = bytes.len(), "Rendered PDF");
    Ok(bytes)
}

fn page_ops(lines: &[PlacedLine]) -> Vec<Op> {
    let mut ops = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        let font = line.style.font();
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point::new(Mm(MARGIN_MM), Mm(PAGE_HEIGHT_MM - line.y_mm)),
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(line.style.font_size()),
            font,
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.text.clone())],
            font,
        });
        ops.push(Op::EndTextSection);
    }
    ops
}

/// Drops heading markers and bold markers, and keeps the text in the
/// ASCII range the builtin fonts can show.
fn display_text(line: &str, style: LineStyle) -> String {
    let line = match style {
        LineStyle::Body => line,
        _ => line.trim_start_matches('#').trim_start(),
    };
    line.replace("**", "")
        .chars()
        .map(|c| match c {
            '•' => '-',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap to `width` characters. Words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word.char_indices().nth(width).map_or(word.len(), |(i, _)| i);
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_fits_eighty_courier_columns() {
        assert_eq!(LineStyle::Body.max_chars(), 80);
        assert_eq!(LineStyle::Heading.max_chars(), 50);
    }

    #[test]
    fn wrap_is_greedy_and_splits_long_words() {
        assert_eq!(wrap("aa bb cc dd", 5), vec!["aa bb", "cc dd"]);
        assert_eq!(wrap("abcdefghij x", 4), vec!["abcd", "efgh", "ij x"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn headings_get_an_extra_line_and_blank_lines_do_not_advance() {
        let pages = layout(&["# Summary\n\n## Key Points\n\n• A point"]);
        assert_eq!(pages.len(), 1);
        let lines = &pages[0];
        assert_eq!(lines[0].text, "Summary");
        assert_eq!(lines[0].y_mm, MARGIN_MM + LINE_HEIGHT_MM);
        assert_eq!(lines[1].text, "Key Points");
        assert_eq!(lines[1].y_mm, MARGIN_MM + 3.0 * LINE_HEIGHT_MM);
        assert_eq!(lines[2].text, "- A point");
        assert_eq!(lines[2].style, LineStyle::Body);
    }

    #[test]
    fn subheadings_are_smaller_and_bold_markers_dropped() {
        let pages = layout(&["### Card 1\n**Front:** The _____ sat"]);
        assert_eq!(pages[0][0].style, LineStyle::Subheading);
        assert_eq!(pages[0][1].text, "Front: The _____ sat");
    }

    #[test]
    fn long_content_flows_onto_new_pages() {
        let body = vec!["line"; 60].join("\n");
        let pages = layout(&[body.as_str()]);
        assert!(pages.len() >= 2);
        for page in &pages {
            assert!(page.iter().all(|l| l.y_mm <= PAGE_HEIGHT_MM - MARGIN_MM + LINE_HEIGHT_MM));
        }
        assert_eq!(pages[1][0].y_mm, MARGIN_MM);
    }

    #[test]
    fn every_section_starts_a_page() {
        let pages = layout(&["# One", "# Two", "# Three"]);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2][0].text, "Three");
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render_pdf("Summary", &["# Summary\n\n• CRITICAL: Cells divide"]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn nothing_to_render_is_an_error() {
        assert!(matches!(render_pdf("x", &["", "\n\n"]), Err(ExportError::EmptyDocument)));
    }
}
