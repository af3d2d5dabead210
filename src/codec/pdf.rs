//! Minimal PDF object writer.
//!
//! Produces a classic (non-incremental) PDF 1.4 file: header, numbered
//! indirect objects, a cross-reference table and a trailer. Objects are
//! numbered in the order they are written, starting at 1, and the byte
//! offset of each `N 0 obj` line is recorded as it is emitted, so the xref
//! table is exact without a second pass.
//!
//! Text is encoded for the standard 14 fonts with `/WinAnsiEncoding`:
//! ASCII passes through, Latin-1 maps to its code point, the common
//! typographic punctuation (`•`, `–`, `—`, curly quotes, `…`) maps to its
//! WinAnsi slot, and anything else becomes `?`.

use std::io::{self, Write};

/// Header line plus a binary comment so transfer tools treat the file as binary.
const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";

/// Byte-buffer builder for indirect objects and the cross-reference table.
#[derive(Debug)]
pub struct PdfObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl Default for PdfObjectWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfObjectWriter {
    pub fn new() -> Self {
        Self {
            buf: HEADER.to_vec(),
            offsets: Vec::new(),
        }
    }

    /// Number the next object would receive.
    pub fn next_id(&self) -> u32 {
        self.offsets.len() as u32 + 1
    }

    /// Write `N 0 obj <body> endobj` and return `N`.
    ///
    /// `body` is raw bytes so dictionaries may embed encoded literal strings.
    pub fn object(&mut self, body: impl AsRef<[u8]>) -> io::Result<u32> {
        let id = self.begin()?;
        self.buf.write_all(body.as_ref())?;
        self.buf.write_all(b"\nendobj\n")?;
        Ok(id)
    }

    /// Write a stream object whose `/Length` is taken from `data`.
    pub fn stream(&mut self, data: &[u8]) -> io::Result<u32> {
        let id = self.begin()?;
        write!(self.buf, "<< /Length {} >>\nstream\n", data.len())?;
        self.buf.write_all(data)?;
        self.buf.write_all(b"\nendstream\nendobj\n")?;
        Ok(id)
    }

    /// Append the xref table and trailer and return the finished file.
    pub fn finish(mut self, root: u32, info: Option<u32>) -> io::Result<Vec<u8>> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;

        write!(self.buf, "xref\n0 {}\n", size)?;
        self.buf.write_all(b"0000000000 65535 f \n")?;
        for offset in &self.offsets {
            write!(self.buf, "{:010} 00000 n \n", offset)?;
        }

        write!(self.buf, "trailer\n<< /Size {} /Root {} 0 R", size, root)?;
        if let Some(info) = info {
            write!(self.buf, " /Info {} 0 R", info)?;
        }
        write!(self.buf, " >>\nstartxref\n{}\n%%EOF\n", xref_offset)?;
        Ok(self.buf)
    }

    fn begin(&mut self) -> io::Result<u32> {
        let id = self.next_id();
        self.offsets.push(self.buf.len());
        write!(self.buf, "{} 0 obj\n", id)?;
        Ok(id)
    }
}

/// Encode `text` as the inside of a PDF literal string: WinAnsi bytes with
/// `\`, `(` and `)` escaped and control characters removed.
pub fn encode_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let Some(byte) = win_ansi(ch) else {
            continue;
        };
        if matches!(byte, b'\\' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

/// Map a char to its WinAnsiEncoding byte; `None` for control characters.
fn win_ansi(ch: char) -> Option<u8> {
    let b = match ch {
        c if c.is_control() => return None,
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => b'?',
    };
    Some(b)
}

/// Builder for a page content stream made of positioned text runs.
#[derive(Debug, Default)]
pub struct ContentStream {
    ops: Vec<u8>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` at `(x, y)` in font resource `font` at `size` points.
    pub fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) -> io::Result<()> {
        write!(self.ops, "BT /{} {} Tf {:.2} {:.2} Td (", font, size, x, y)?;
        self.ops.write_all(&encode_literal(text))?;
        self.ops.write_all(b") Tj ET\n")?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.ops
    }
}
