//! ATS-friendliness checks over rendered plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::parse::BULLET_GLYPHS;

/// Sections every résumé is expected to carry.
pub const STANDARD_SECTIONS: [&str; 3] = ["EXPERIENCE", "SKILLS", "EDUCATION"];

/// Bulleted skill lines tolerated before the skills list counts as
/// non-comma-formatted.
const MAX_SKILL_BULLETS: usize = 2;

/// Character class of every glyph the parser accepts as a bullet.
fn bullet_class() -> String {
    let glyphs: String = BULLET_GLYPHS.iter().map(|c| regex::escape(&c.to_string())).collect();
    format!("[{glyphs}]")
}

/// A bullet made of four or more capitalised words and nothing else.
static RE_STUFFED_BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*{}\s*(?:[A-Z][A-Za-z0-9+#./]*\s+){{3,}}[A-Z][A-Za-z0-9+#./]*\s*$",
        bullet_class()
    ))
    .unwrap()
});

static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^\s*{}\s*", bullet_class())).unwrap());

static RE_SKILLS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:technical\s+|core\s+)?skills\s*:?\s*$").unwrap());

/// Any all-caps line, treated as the start of the next section.
static RE_ANY_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[A-Z][A-Z &/]{2,}:?\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationChecks {
    pub no_keyword_stuffing: bool,
    pub skills_comma_formatted: bool,
    pub standard_sections: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub checks: ValidationChecks,
    /// One message per failed check.
    pub issues: Vec<String>,
}

/// Run every check against `text`.
pub fn validate(text: &str) -> ValidationReport {
    let mut issues = Vec::new();

    let stuffed: Vec<&str> = text
        .lines()
        .filter(|l| RE_STUFFED_BULLET.is_match(l))
        .map(str::trim)
        .collect();
    if let Some(first) = stuffed.first() {
        issues.push(format!(
            "Possible keyword stuffing in {} bullet(s), e.g. \"{}\"",
            stuffed.len(),
            first
        ));
    }

    let skill_bullets = count_skill_bullets(text);
    if skill_bullets > MAX_SKILL_BULLETS {
        issues.push(format!(
            "Skills are listed as {skill_bullets} bullets; use a comma-separated line"
        ));
    }

    let upper = text.to_uppercase();
    let missing: Vec<&str> = STANDARD_SECTIONS
        .iter()
        .copied()
        .filter(|s| !upper.contains(s))
        .collect();
    if !missing.is_empty() {
        issues.push(format!("Missing standard section(s): {}", missing.join(", ")));
    }

    let checks = ValidationChecks {
        no_keyword_stuffing: stuffed.is_empty(),
        skills_comma_formatted: skill_bullets <= MAX_SKILL_BULLETS,
        standard_sections: missing.is_empty(),
    };
    ValidationReport {
        is_valid: checks.no_keyword_stuffing && checks.skills_comma_formatted && checks.standard_sections,
        checks,
        issues,
    }
}

/// Bullet lines between a skills heading and the next heading.
fn count_skill_bullets(text: &str) -> usize {
    let mut in_skills = false;
    let mut count = 0;
    for line in text.lines() {
        if RE_SKILLS_HEADING.is_match(line) {
            in_skills = true;
        } else if RE_ANY_HEADING.is_match(line) {
            in_skills = false;
        } else if in_skills && RE_BULLET.is_match(line) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "JANE\n\nEXPERIENCE\nAcme | Dev\n• Built the billing service in Rust.\n\nSKILLS\nRust, Go\n\nEDUCATION\nBSc\n";

    #[test]
    fn clean_text_is_valid() {
        let report = validate(GOOD);
        assert!(report.is_valid, "{:?}", report.issues);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn missing_education_fails_sections() {
        let text = GOOD.replace("EDUCATION\nBSc\n", "");
        let report = validate(&text);
        assert!(!report.checks.standard_sections);
        assert!(!report.is_valid);
        assert!(report.issues[0].contains("EDUCATION"));
    }

    #[test]
    fn section_check_is_case_insensitive() {
        let report = validate("Experience\nSkills\nEducation\n");
        assert!(report.checks.standard_sections);
    }

    #[test]
    fn keyword_stuffing_detected() {
        let text = format!("{GOOD}• Kubernetes Docker Terraform Ansible\n");
        let report = validate(&text);
        assert!(!report.checks.no_keyword_stuffing);
        assert!(!report.is_valid);

        // Three words, or connective text, is fine.
        assert!(validate(&format!("{GOOD}- Kubernetes Docker Terraform\n")).checks.no_keyword_stuffing);
        assert!(validate(&format!("{GOOD}- Used Kubernetes and Docker Daily\n")).checks.no_keyword_stuffing);
    }

    #[test]
    fn stuffing_detected_behind_any_bullet_glyph() {
        for glyph in BULLET_GLYPHS {
            let text = format!("{GOOD}{glyph} Kubernetes Docker Terraform Ansible\n");
            assert!(!validate(&text).checks.no_keyword_stuffing, "missed {glyph:?}");
        }
        let skills = "EXPERIENCE\nSKILLS\n▪ Rust\n■ Go\n► SQL\nEDUCATION\n";
        assert!(!validate(skills).checks.skills_comma_formatted);
    }

    #[test]
    fn bulleted_skills_detected() {
        let text = "EXPERIENCE\n\nSKILLS\n• Rust\n• Go\n• SQL\nEDUCATION\n• BSc\n• MSc\n";
        let report = validate(text);
        assert!(!report.checks.skills_comma_formatted);
        assert!(report.checks.standard_sections);

        let two = "EXPERIENCE\nSKILLS\n• Rust, Go\n• SQL\nEDUCATION\n• BSc\n• MSc\n• PhD\n";
        assert!(validate(two).checks.skills_comma_formatted);
    }
}
