//! Plain-text export.
//!
//! The rendered text is what an ATS ingests most reliably, and it is also
//! the text the match score and the validation checks run against. Output is
//! a pure function of the document: no timestamps, no randomness.

use crate::model::Document;

/// Bullets exported per experience entry in every output format.
pub const MAX_EXPORTED_BULLETS: usize = 6;

/// Glyph prefixed to exported bullets.
pub const BULLET: &str = "•";

/// Render `doc` as ATS-friendly plain text ending in a single newline.
pub fn render(doc: &Document) -> String {
    let mut lines: Vec<String> = Vec::new();
    let p = &doc.personal;

    if !p.name.is_empty() {
        lines.push(p.name.to_uppercase());
    }
    let contact = join_present(&[p.location.as_str(), p.email.as_str(), p.phone.as_str()]);
    if !contact.is_empty() {
        lines.push(contact);
    }
    let links = join_present(&[p.linkedin.as_str(), p.github.as_str()]);
    if !links.is_empty() {
        lines.push(links);
    }
    lines.push(String::new());

    if !doc.summary.is_empty() {
        lines.push("PROFESSIONAL SUMMARY".into());
        lines.push(doc.summary.clone());
        lines.push(String::new());
    }

    lines.push("EXPERIENCE".into());
    for entry in &doc.experience {
        lines.push(role_line(&entry.company, &entry.title));
        if !entry.dates.is_empty() {
            lines.push(entry.dates.clone());
        }
        for bullet in entry.bullets.iter().take(MAX_EXPORTED_BULLETS) {
            lines.push(format!("{BULLET} {bullet}"));
        }
        lines.push(String::new());
    }
    if doc.experience.is_empty() {
        lines.push(String::new());
    }

    lines.push("SKILLS".into());
    lines.push(skills_line(doc));
    lines.push(String::new());

    lines.push("EDUCATION".into());
    for entry in &doc.education {
        lines.push(entry.degree.clone());
    }

    if !doc.certifications.is_empty() {
        lines.push(String::new());
        lines.push("CERTIFICATIONS".into());
        lines.push(doc.certifications.join(", "));
    }

    let mut text = lines.join("\n");
    text.truncate(text.trim_end().len());
    text.push('\n');
    text
}

/// Non-empty items joined by `" | "`.
pub fn join_present(items: &[&str]) -> String {
    items
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" | ")
}

/// `"{company} | {title}"`, or whichever half is present.
pub fn role_line(company: &str, title: &str) -> String {
    join_present(&[company, title])
}

/// Hard skills followed by soft skills, comma-joined.
pub fn skills_line(doc: &Document) -> String {
    doc.skills
        .hard
        .iter()
        .chain(&doc.skills.soft)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
