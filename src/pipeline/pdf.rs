//! PDF export: single-page layout over [`crate::codec::pdf`].
//!
//! There are no font metrics here. Every logical line moves a cursor down by
//! a fixed line height from the top of a US Letter page; long paragraphs and
//! bullets are word-wrapped at a fixed column count; header lines are
//! centred using an average glyph width of half the font size. Lines that
//! fall below the bottom margin are dropped and reported with `warn!`.
//!
//! ## Object layout
//!
//! | # | Object |
//! |---|--------|
//! | 1 | Catalog |
//! | 2 | Pages |
//! | 3 | Page (612 × 792) |
//! | 4 | Content stream |
//! | 5 | Font `/F1` Helvetica |
//! | 6 | Font `/F2` Helvetica-Bold |
//! | 7 | Info (Title, Producer) |

use super::text::{join_present, role_line, skills_line, BULLET, MAX_EXPORTED_BULLETS};
use crate::codec::pdf::{encode_literal, ContentStream, PdfObjectWriter};
use crate::error::AtsError;
use crate::model::Document;
use std::io;
use tracing::{debug, warn};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

const TOP: f32 = 750.0;
const BOTTOM_MARGIN: f32 = 50.0;
const LEFT_MARGIN: f32 = 50.0;
const LINE_HEIGHT: f32 = 14.0;
const BULLET_INDENT: f32 = 12.0;
const WRAP_INDENT: f32 = 10.0;

/// Characters per line before wrapping body text.
pub const WRAP_COLUMNS: usize = 95;

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Center,
    Left(f32),
}

/// One laid-out line. Empty `text` is vertical space only.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    font: Font,
    size: f32,
    align: Align,
}

/// Build the PDF bytes for `doc`.
pub fn build(doc: &Document) -> Result<Vec<u8>, AtsError> {
    let lines = layout(doc);
    let content = draw(&lines)?;

    let mut w = PdfObjectWriter::new();
    let catalog = w.object("<< /Type /Catalog /Pages 2 0 R >>")?;
    w.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>")?;
    w.object(format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
         /Contents 4 0 R /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> >>"
    ))?;
    w.stream(&content)?;
    w.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>")?;
    w.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>")?;
    let info = w.object(info_dict(doc))?;

    let bytes = w.finish(catalog, Some(info))?;
    debug!("PDF: {} lines laid out, {} bytes", lines.len(), bytes.len());
    Ok(bytes)
}

fn info_dict(doc: &Document) -> Vec<u8> {
    let mut dict = b"<< ".to_vec();
    if !doc.personal.name.is_empty() {
        dict.extend_from_slice(b"/Title (");
        dict.extend(encode_literal(&doc.personal.name));
        dict.extend_from_slice(b") ");
    }
    dict.extend_from_slice(b"/Producer (");
    dict.extend(encode_literal(PRODUCER));
    dict.extend_from_slice(b") >>");
    dict
}

// ── Layout ───────────────────────────────────────────────────────────────────

fn layout(doc: &Document) -> Vec<Line> {
    let mut out = Layout::default();
    let p = &doc.personal;

    if !p.name.is_empty() {
        out.push(&p.name.to_uppercase(), Font::Bold, 18.0, Align::Center);
    }
    let contact = join_present(&[p.location.as_str(), p.email.as_str(), p.phone.as_str()]);
    if !contact.is_empty() {
        out.push(&contact, Font::Regular, 10.0, Align::Center);
    }
    let links = join_present(&[p.linkedin.as_str(), p.github.as_str()]);
    if !links.is_empty() {
        out.push(&links, Font::Regular, 10.0, Align::Center);
    }
    out.gap();

    if !doc.summary.is_empty() {
        out.heading("PROFESSIONAL SUMMARY");
        out.paragraph(&doc.summary, 0.0);
        out.gap();
    }

    out.heading("EXPERIENCE");
    for entry in &doc.experience {
        out.push(
            &role_line(&entry.company, &entry.title),
            Font::Bold,
            11.0,
            Align::Left(0.0),
        );
        if !entry.dates.is_empty() {
            out.push(&entry.dates, Font::Regular, 10.0, Align::Left(0.0));
        }
        for bullet in entry.bullets.iter().take(MAX_EXPORTED_BULLETS) {
            out.paragraph(&format!("{BULLET} {bullet}"), BULLET_INDENT);
        }
        out.gap();
    }

    out.heading("SKILLS");
    out.paragraph(&skills_line(doc), 0.0);
    out.gap();

    out.heading("EDUCATION");
    for entry in &doc.education {
        out.paragraph(&entry.degree, 0.0);
    }

    if !doc.certifications.is_empty() {
        out.gap();
        out.heading("CERTIFICATIONS");
        out.paragraph(&doc.certifications.join(", "), 0.0);
    }

    out.lines
}

#[derive(Default)]
struct Layout {
    lines: Vec<Line>,
}

impl Layout {
    fn push(&mut self, text: &str, font: Font, size: f32, align: Align) {
        self.lines.push(Line {
            text: text.to_string(),
            font,
            size,
            align,
        });
    }

    fn gap(&mut self) {
        self.push("", Font::Regular, 10.0, Align::Left(0.0));
    }

    fn heading(&mut self, text: &str) {
        self.push(text, Font::Bold, 12.0, Align::Left(0.0));
    }

    /// Word-wrapped body text; continuation lines are indented further.
    fn paragraph(&mut self, text: &str, indent: f32) {
        for (i, piece) in wrap(text, WRAP_COLUMNS).into_iter().enumerate() {
            let x = if i == 0 { indent } else { indent + WRAP_INDENT };
            self.push(&piece, Font::Regular, 10.0, Align::Left(x));
        }
    }
}

/// Greedy word wrap at `columns` characters. Words longer than a line are
/// split hard.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if len > 0 {
                lines.push(std::mem::take(&mut current));
                len = 0;
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if len > 0 && len + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
            len = 0;
        }
        if len > 0 {
            current.push(' ');
            len += 1;
        }
        len += word.len();
        current.extend(word);
    }
    if len > 0 {
        lines.push(current);
    }
    lines
}

// ── Drawing ──────────────────────────────────────────────────────────────────

/// Emit one text instruction per non-empty line that fits on the page.
fn draw(lines: &[Line]) -> io::Result<Vec<u8>> {
    let mut content = ContentStream::new();
    let mut y = TOP;
    let mut clipped = 0usize;

    for line in lines {
        if y < BOTTOM_MARGIN {
            if !line.text.is_empty() {
                clipped += 1;
            }
            continue;
        }
        if !line.text.is_empty() {
            let x = match line.align {
                Align::Center => centered_x(&line.text, line.size),
                Align::Left(indent) => LEFT_MARGIN + indent,
            };
            content.text(line.font.resource(), line.size, x, y, &line.text)?;
        }
        y -= LINE_HEIGHT;
    }

    if clipped > 0 {
        warn!(
            "PDF page full: {} line(s) below the bottom margin were dropped",
            clipped
        );
    }
    Ok(content.into_bytes())
}

fn centered_x(text: &str, size: f32) -> f32 {
    let width = text.chars().count() as f32 * size * 0.5;
    ((PAGE_WIDTH - width) / 2.0).max(LEFT_MARGIN)
}
