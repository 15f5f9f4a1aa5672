//! Minimal PDF document emission.
//!
//! Invoices need nothing beyond left-aligned Helvetica text lines that flow
//! onto new pages, so this module writes PDF 1.4 directly: one font object,
//! one uncompressed content stream per page, and a classic xref table. The
//! builder is imperative; callers push lines and collect the byte stream.

const PAGE_WIDTH: u32 = 595; // A4 in points
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
/// Extra points of leading between lines.
const LINE_GAP: u32 = 8;

struct PlacedLine {
    y: u32,
    font_size: u32,
    text: String,
}

/// An imperative builder for paginated text documents.
pub struct PdfBuilder {
    pages: Vec<Vec<PlacedLine>>,
    current: Vec<PlacedLine>,
    cursor_y: u32,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    /// Start a document with one empty page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Append a text line at the given font size, breaking to a new page
    /// when the current one is full.
    pub fn line(&mut self, font_size: u32, text: &str) {
        let leading = font_size + LINE_GAP;
        if self.cursor_y < MARGIN + leading {
            self.break_page();
        }
        self.cursor_y -= leading;
        self.current.push(PlacedLine {
            y: self.cursor_y,
            font_size,
            text: text.to_owned(),
        });
    }

    /// Append vertical whitespace of one 12pt line.
    pub fn blank_line(&mut self) {
        self.cursor_y = self.cursor_y.saturating_sub(12 + LINE_GAP);
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    /// Serialize the document.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.pages.push(std::mem::take(&mut self.current));

        let page_count = self.pages.len();
        // Objects: 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
        let object_count = 3 + 2 * page_count;

        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::with_capacity(object_count);
        out.extend_from_slice(b"%PDF-1.4\n");

        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");

        push_object(&mut out, &mut offsets, 1, "<< /Type /Catalog /Pages 2 0 R >>");
        push_object(
            &mut out,
            &mut offsets,
            2,
            &format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"),
        );
        push_object(
            &mut out,
            &mut offsets,
            3,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>",
        );

        for (i, page) in self.pages.iter().enumerate() {
            let page_id = 4 + 2 * i;
            let content_id = page_id + 1;

            push_object(
                &mut out,
                &mut offsets,
                page_id,
                &format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
                ),
            );

            let stream = content_stream(page);
            offsets.push(out.len());
            out.extend_from_slice(
                format!(
                    "{content_id} 0 obj\n<< /Length {} >>\nstream\n{stream}endstream\nendobj\n",
                    stream.len()
                )
                .as_bytes(),
            );
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", object_count + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                object_count + 1
            )
            .as_bytes(),
        );

        out
    }
}

fn push_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &str) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
}

fn content_stream(lines: &[PlacedLine]) -> String {
    let mut stream = String::new();
    for line in lines {
        stream.push_str(&format!(
            "BT /F1 {} Tf {MARGIN} {} Td ({}) Tj ET\n",
            line.font_size,
            line.y,
            escape_text(&line.text)
        ));
    }
    stream
}

/// Escape the characters with meaning inside a PDF string literal and drop
/// control characters.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_header_and_trailer() {
        let mut pdf = PdfBuilder::new();
        pdf.line(12, "hello");
        let bytes = pdf.finish();
        let text = as_text(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_lines_land_in_content_stream() {
        let mut pdf = PdfBuilder::new();
        pdf.line(18, "Invoice");
        pdf.line(12, "Widget: 10.00 x 2 = 20.00");
        let text = as_text(&pdf.finish());
        assert!(text.contains("(Invoice) Tj"));
        assert!(text.contains("(Widget: 10.00 x 2 = 20.00) Tj"));
    }

    #[test]
    fn test_parens_are_escaped() {
        let mut pdf = PdfBuilder::new();
        pdf.line(12, "Gift (wrapped)");
        let text = as_text(&pdf.finish());
        assert!(text.contains("(Gift \\(wrapped\\)) Tj"));
    }

    #[test]
    fn test_long_documents_break_pages() {
        let mut pdf = PdfBuilder::new();
        for i in 0..100 {
            pdf.line(12, &format!("line {i}"));
        }
        let text = as_text(&pdf.finish());
        // 100 lines at 20pt leading cannot fit one A4 page.
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut pdf = PdfBuilder::new();
        pdf.line(12, "x");
        let bytes = pdf.finish();
        let text = as_text(&bytes);

        let xref_at = text.find("xref\n").unwrap();
        let first_entry = text
            .get(xref_at..)
            .unwrap()
            .lines()
            .nth(3)
            .unwrap();
        let offset: usize = first_entry
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(text.get(offset..).unwrap().starts_with("1 0 obj"));
    }
}
