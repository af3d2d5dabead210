//! Word-processor export: a minimal WordprocessingML package.
//!
//! The package holds exactly five parts, stored uncompressed through
//! [`crate::codec::zip`]:
//!
//! | Part | Content |
//! |------|---------|
//! | `[Content_Types].xml` | MIME types for the package parts |
//! | `_rels/.rels` | points at `word/document.xml` |
//! | `word/_rels/document.xml.rels` | points at `word/styles.xml` |
//! | `word/styles.xml` | Calibri 11pt defaults, Title, Heading1, Heading2 |
//! | `word/document.xml` | the résumé body |
//!
//! Bullets are plain indented paragraphs with a `•` prefix, so no numbering
//! part is needed. The body follows the same structure as
//! [`super::text::render`].

use super::text::{join_present, role_line, skills_line, BULLET, MAX_EXPORTED_BULLETS};
use crate::codec::zip;
use crate::error::AtsError;
use crate::model::Document;
use tracing::debug;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults>
<w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:spacing w:after="80" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/><w:szCs w:val="36"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="120" w:after="40"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:style>
</w:styles>"#;

const BODY_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const BODY_CLOSE: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1080" w:right="1080" w:bottom="1080" w:left="1080" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

/// Left indent of bullet paragraphs, in twentieths of a point.
const BULLET_INDENT: u32 = 360;

/// Build the `.docx` bytes for `doc`.
pub fn build(doc: &Document) -> Result<Vec<u8>, AtsError> {
    let body = document_xml(doc);
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
        ("word/document.xml", body.as_str()),
    ];
    let bytes = zip::pack(parts)?;
    debug!("DOCX package: {} bytes, body {} bytes", bytes.len(), body.len());
    Ok(bytes)
}

/// Escape the five XML metacharacters and drop characters XML 1.0 forbids
/// (C0 controls other than tab, newline and carriage return; U+FFFE, U+FFFF).
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => {}
            c => out.push(c),
        }
    }
    out
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// The main `word/document.xml` part.
pub fn document_xml(doc: &Document) -> String {
    let mut body = Body::default();
    let p = &doc.personal;

    if !p.name.is_empty() {
        body.styled("Title", &p.name);
    }
    let contact = join_present(&[p.location.as_str(), p.email.as_str(), p.phone.as_str()]);
    if !contact.is_empty() {
        body.centered(&contact);
    }
    let links = join_present(&[p.linkedin.as_str(), p.github.as_str()]);
    if !links.is_empty() {
        body.centered(&links);
    }

    if !doc.summary.is_empty() {
        body.heading("PROFESSIONAL SUMMARY");
        body.plain(&doc.summary);
    }

    body.heading("EXPERIENCE");
    for entry in &doc.experience {
        body.styled("Heading2", &role_line(&entry.company, &entry.title));
        if !entry.dates.is_empty() {
            body.italic(&entry.dates);
        }
        for bullet in entry.bullets.iter().take(MAX_EXPORTED_BULLETS) {
            body.bullet(bullet);
        }
    }

    body.heading("SKILLS");
    body.plain(&skills_line(doc));

    body.heading("EDUCATION");
    for entry in &doc.education {
        body.plain(&entry.degree);
    }

    if !doc.certifications.is_empty() {
        body.heading("CERTIFICATIONS");
        body.plain(&doc.certifications.join(", "));
    }

    body.finish()
}

// ── Paragraph writer ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Body {
    xml: String,
}

impl Body {
    fn paragraph(&mut self, ppr: &str, rpr: &str, text: &str) {
        self.xml.push_str("<w:p>");
        if !ppr.is_empty() {
            self.xml.push_str(&format!("<w:pPr>{ppr}</w:pPr>"));
        }
        self.xml.push_str("<w:r>");
        if !rpr.is_empty() {
            self.xml.push_str(&format!("<w:rPr>{rpr}</w:rPr>"));
        }
        self.xml.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_xml(text)
        ));
    }

    fn styled(&mut self, style: &str, text: &str) {
        self.paragraph(&format!(r#"<w:pStyle w:val="{style}"/>"#), "", text);
    }

    fn heading(&mut self, text: &str) {
        self.paragraph(r#"<w:pStyle w:val="Heading1"/>"#, "<w:b/>", text);
    }

    fn centered(&mut self, text: &str) {
        self.paragraph(r#"<w:jc w:val="center"/>"#, "", text);
    }

    fn italic(&mut self, text: &str) {
        self.paragraph("", "<w:i/>", text);
    }

    fn plain(&mut self, text: &str) {
        self.paragraph("", "", text);
    }

    fn bullet(&mut self, text: &str) {
        self.paragraph(
            &format!(r#"<w:ind w:left="{BULLET_INDENT}" w:hanging="{}"/>"#, BULLET_INDENT / 2),
            "",
            &format!("{BULLET} {text}"),
        );
    }

    fn finish(self) -> String {
        format!("{BODY_OPEN}{}{BODY_CLOSE}", self.xml)
    }
}
