//! Minimal single-page PDF text layout.
//!
//! Produces a PDF 1.4 file with one A4 page and the standard Helvetica font,
//! laid out as fixed-height text rows from the top margin down.

/// A4 width in points.
const PAGE_WIDTH: f64 = 595.28;
/// A4 height in points.
const PAGE_HEIGHT: f64 = 841.89;
/// Left, right, and top margin: 10 mm.
const MARGIN: f64 = 28.35;
/// Row height: 10 mm.
const ROW_HEIGHT: f64 = 28.35;
/// Average Helvetica glyph advance, as a fraction of the font size.
const AVG_GLYPH_WIDTH: f64 = 0.5;

/// Horizontal placement of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
enum Row {
    Text { text: String, align: Align },
    Blank,
}

/// Builder for a one-page text document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PdfPage {
    font_size: f64,
    rows: Vec<Row>,
}

impl PdfPage {
    pub(crate) fn new(font_size: f64) -> Self {
        Self {
            font_size,
            rows: Vec::new(),
        }
    }

    pub(crate) fn text(&mut self, text: impl Into<String>, align: Align) -> &mut Self {
        self.rows.push(Row::Text {
            text: text.into(),
            align,
        });
        self
    }

    pub(crate) fn blank(&mut self) -> &mut Self {
        self.rows.push(Row::Blank);
        self
    }

    /// Render the page content stream.
    fn content_stream(&self) -> String {
        let mut stream = String::new();
        let baseline_offset = (ROW_HEIGHT + self.font_size * 0.7) / 2.0;
        for (i, row) in self.rows.iter().enumerate() {
            let Row::Text { text, align } = row else {
                continue;
            };
            let y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT * i as f64 - baseline_offset;
            let x = match align {
                Align::Left => MARGIN,
                Align::Center => {
                    let width = text.chars().count() as f64 * self.font_size * AVG_GLYPH_WIDTH;
                    ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
                }
            };
            stream.push_str(&format!(
                "BT /F1 {:.0} Tf {x:.2} {y:.2} Td ({}) Tj ET\n",
                self.font_size,
                escape(text)
            ));
        }
        stream
    }

    /// Serialize the page as a complete PDF file.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let content = self.content_stream();
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ),
        ];

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }

        let xref_offset = out.len();
        out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            out.push_str(&format!("{offset:010} 00000 n \n"));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        out.into_bytes()
    }
}

/// Escape a string for a PDF literal, replacing characters outside printable ASCII.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
