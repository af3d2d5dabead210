//! Heuristic text → [`Document`] parser.
//!
//! Résumés have no grammar, so the parser works line by line with a handful
//! of regexes:
//!
//! 1. **Header block.** The first [`HEADER_SCAN_LINES`] lines are searched
//!    for the name and contact fields.
//!    The name is the first plausible line. Every header line is tested for
//!    every contact field, so when one matches on several lines the *last*
//!    one wins. [`ParseOptions::location_stops_at_heading`] keeps lines
//!    below the first heading out of the location heuristic.
//! 2. **Sections.** A line that is nothing but a heading synonym
//!    ("Work Experience", "Technical Skills:", …) switches the current
//!    section. Exactly one transition happens per line: the five heading
//!    patterns are tried in a fixed order and the first match wins.
//! 3. **Section bodies.** Each section interprets its lines differently
//!    (role headers and bullets, comma-separated skills, one entry per line).
//!
//! ```text
//!            ┌──────── heading ────────┐
//!  Header ──▶│ Summary  Experience      │──▶ … (any heading → any section)
//!            │ Skills   Education  Cert │
//!            └──────────────────────────┘
//! ```

use crate::config::ParseOptions;
use crate::model::{Document, EducationEntry, ExperienceEntry, SkillSet};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Maximum number of leading lines searched for contact details.
pub const HEADER_SCAN_LINES: usize = 10;

/// Characters that mark a line as a bullet when they start it.
pub const BULLET_GLYPHS: &[char] = &[
    '•', '●', '○', '◦', '▪', '■', '►', '‣', '·', '*', '-', '–', '—',
];

/// Glyphs that disqualify a header line from being the candidate's name.
/// `-` is not among them so hyphenated names survive.
const NAME_BREAKING_GLYPHS: &[char] = &['•', '●', '○', '◦', '▪', '■', '►', '‣', '·', '*'];

/// Skill pieces outside this character-length range are discarded.
const SKILL_LEN: std::ops::RangeInclusive<usize> = 2..=40;

/// Education lines must be longer than this to become an entry.
const MIN_EDUCATION_LEN: usize = 5;

/// Cities recognised as a location even without a region suffix.
const KNOWN_CITIES: &[&str] = &[
    "Remote",
    "New York",
    "San Francisco",
    "Seattle",
    "Austin",
    "Boston",
    "Chicago",
    "Los Angeles",
    "London",
    "Toronto",
    "Berlin",
    "Paris",
    "Amsterdam",
    "Singapore",
    "Sydney",
    "Bangalore",
];

/// Parser state: which part of the résumé the current line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Summary,
    Experience,
    Skills,
    Education,
    Certifications,
}

// ── Patterns ─────────────────────────────────────────────────────────────────

static HEADINGS: Lazy<[(Section, Regex); 5]> = Lazy::new(|| {
    let heading = |body: &str| Regex::new(&format!(r"(?i)^\s*(?:{body})\s*:?\s*$")).unwrap();
    [
        (
            Section::Summary,
            heading(r"(?:professional\s+|career\s+|executive\s+)?(?:summary|profile|objective)|about\s+me"),
        ),
        (
            Section::Experience,
            heading(r"(?:professional\s+|work\s+|relevant\s+)?experience|employment(?:\s+history)?|work\s+history|career\s+history"),
        ),
        (
            Section::Skills,
            heading(r"(?:technical\s+|core\s+|key\s+)?(?:skills|competencies)(?:\s*(?:&|and)\s*(?:expertise|tools|technologies))?|technologies|tech\s+stack"),
        ),
        (
            Section::Education,
            heading(r"education(?:\s*(?:&|and)\s*training)?|academic\s+background|academics"),
        ),
        (
            Section::Certifications,
            heading(r"certifications?|certificates|licenses?(?:\s*(?:&|and)\s*certifications?)?"),
        ),
    ]
});

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Digit run with optional separators; digits are counted separately.
static RE_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\(?\d[\d\s().-]{8,}\d").unwrap());

static RE_LINKEDIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/[A-Za-z0-9_%-]+/?").unwrap()
});

static RE_GITHUB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/[A-Za-z0-9_-]+(?:/[A-Za-z0-9_.-]+)?").unwrap()
});

/// `City, ST` with a trailing two-letter state or country code.
static RE_LOCATION_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z .'-]+,\s*[A-Z]{2}$").unwrap());

/// `City, Region`.
static RE_LOCATION_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z .'-]+,\s*[A-Z][A-Za-z .'-]+$").unwrap());

static RE_HEADER_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(?:[|•·]|\s{2,})\s*").unwrap());

/// `Company | Title | Dates`.
static RE_ROLE_TRIPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^|]+?)\s*\|\s*([^|]+?)\s*\|\s*([^|]+?)\s*$").unwrap());

/// Year range such as `2019 - 2021`, `Jan 2020 – Present`, or a bare `Present`.
static RE_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let month = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?";
    let point = format!(r"(?:\b{month}\s+)?(?:\d{{1,2}}/)?(?:19|20)\d{{2}}");
    Regex::new(&format!(
        r"(?i){point}\s*(?:-|–|—|to)\s*(?:{point}|present|current|now)\b|\bpresent\b"
    ))
    .unwrap()
});

static RE_SKILL_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z &/-]{1,30}:\s*").unwrap());

// ── Entry point ──────────────────────────────────────────────────────────────

/// Parse raw résumé text into a [`Document`].
///
/// Returns `None` when the input is empty or whitespace only.
///
/// ```
/// use resume_ats::pipeline::parse::parse;
///
/// let doc = parse("JANE DOE\njane@x.com\nSKILLS\nRust, Go").unwrap();
/// assert_eq!(doc.personal.name, "JANE DOE");
/// assert_eq!(doc.skills.hard.as_slice(), ["Rust", "Go"]);
/// ```
pub fn parse(raw: &str) -> Option<Document> {
    parse_with(raw, &ParseOptions::default())
}

/// [`parse`] with explicit parser options.
pub fn parse_with(raw: &str, options: &ParseOptions) -> Option<Document> {
    if raw.trim().is_empty() {
        return None;
    }
    let lines: Vec<&str> = raw.lines().collect();

    let mut doc = Document::default();
    parse_header(&lines, options, &mut doc);

    let mut state = SectionScanner::new(doc);
    for line in &lines {
        state.feed(line);
    }
    let doc = state.finish();

    debug!(
        "Parsed résumé: {} roles, {} skills, {} education, {} certifications",
        doc.experience.len(),
        doc.skills.hard.len(),
        doc.education.len(),
        doc.certifications.len()
    );
    Some(doc)
}

/// The section a heading line switches to, if it is one.
pub fn detect_heading(line: &str) -> Option<Section> {
    HEADINGS
        .iter()
        .find(|(_, re)| re.is_match(line))
        .map(|(section, _)| *section)
}

/// Text of a bullet line without its glyph, or `None` if not a bullet.
pub fn strip_bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(BULLET_GLYPHS)?;
    Some(rest.trim())
}

// ── Header ───────────────────────────────────────────────────────────────────

fn parse_header(lines: &[&str], options: &ParseOptions, doc: &mut Document) {
    let p = &mut doc.personal;
    let mut below_heading = false;
    for line in lines.iter().take(HEADER_SCAN_LINES).map(|l| l.trim()) {
        below_heading |= detect_heading(line).is_some();
        if line.is_empty() {
            continue;
        }
        if p.name.is_empty() && looks_like_name(line) {
            p.name = line.to_string();
        }
        if let Some(m) = RE_EMAIL.find(line) {
            p.email = m.as_str().to_string();
        }
        if let Some(phone) = find_phone(line) {
            p.phone = phone;
        }
        if let Some(m) = RE_LINKEDIN.find(line) {
            p.linkedin = m.as_str().to_string();
        }
        if let Some(m) = RE_GITHUB.find(line) {
            p.github = m.as_str().to_string();
        }
        if below_heading && options.location_stops_at_heading {
            continue;
        }
        if let Some(location) = find_location(line) {
            p.location = location;
        }
    }
}

fn looks_like_name(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_uppercase())
        && !line.contains('@')
        && !line.contains(NAME_BREAKING_GLYPHS)
        && !line.to_lowercase().contains("linkedin.com")
        && !line.to_lowercase().contains("github.com")
}

fn find_phone(line: &str) -> Option<String> {
    RE_PHONE
        .find_iter(line)
        .map(|m| m.as_str().trim())
        .find(|s| (10..=15).contains(&s.chars().filter(char::is_ascii_digit).count()))
        .map(str::to_string)
}

fn find_location(line: &str) -> Option<String> {
    RE_HEADER_SEPARATORS
        .split(line)
        .map(str::trim)
        .filter(|seg| !seg.is_empty() && !seg.contains('@') && !seg.contains(|c: char| c.is_ascii_digit()))
        .filter(|seg| {
            RE_LOCATION_CODE.is_match(seg)
                || RE_LOCATION_REGION.is_match(seg)
                || KNOWN_CITIES.iter().any(|c| c.eq_ignore_ascii_case(seg))
        })
        .last()
        .map(str::to_string)
}

// ── Section scanner ──────────────────────────────────────────────────────────

/// Finite-state scanner over the résumé body.
struct SectionScanner {
    doc: Document,
    section: Section,
    role: Option<ExperienceEntry>,
    summary: Vec<String>,
}

impl SectionScanner {
    fn new(doc: Document) -> Self {
        Self {
            doc,
            section: Section::Header,
            role: None,
            summary: Vec::new(),
        }
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Some(next) = detect_heading(trimmed) {
            self.transition(next);
            return;
        }
        match self.section {
            Section::Header => {}
            Section::Summary => self.summary.push(trimmed.to_string()),
            Section::Experience => self.experience_line(trimmed),
            Section::Skills => skills_line(trimmed, &mut self.doc.skills.hard),
            Section::Education => {
                if trimmed.chars().count() > MIN_EDUCATION_LEN {
                    self.doc.education.push(EducationEntry {
                        degree: trimmed.to_string(),
                        ..Default::default()
                    });
                }
            }
            Section::Certifications => {
                let text = strip_bullet(trimmed).unwrap_or(trimmed);
                if !text.is_empty() {
                    self.doc.certifications.push(text.to_string());
                }
            }
        }
    }

    fn transition(&mut self, next: Section) {
        match self.section {
            Section::Summary => self.flush_summary(),
            Section::Experience => self.flush_role(),
            _ => {}
        }
        debug!("Section {:?} → {:?}", self.section, next);
        self.section = next;
        self.summary.clear();
    }

    fn experience_line(&mut self, line: &str) {
        if let Some(text) = strip_bullet(line) {
            match self.role.as_mut() {
                Some(role) if !text.is_empty() => role.bullets.push(text.to_string()),
                Some(_) => {}
                None => debug!("Dropping bullet outside any role: {:?}", text),
            }
        } else if let Some(entry) = role_header(line) {
            self.flush_role();
            debug!(
                "Role header: company={:?} title={:?} dates={:?}",
                entry.company, entry.title, entry.dates
            );
            self.role = Some(entry);
        }
    }

    fn flush_role(&mut self) {
        if let Some(role) = self.role.take() {
            self.doc.experience.push(role);
        }
    }

    fn flush_summary(&mut self) {
        if self.summary.is_empty() {
            return;
        }
        let paragraph = self.summary.join(" ");
        if self.doc.summary.is_empty() {
            self.doc.summary = paragraph;
        } else {
            self.doc.summary.push(' ');
            self.doc.summary.push_str(&paragraph);
        }
        self.summary.clear();
    }

    fn finish(mut self) -> Document {
        self.flush_role();
        self.flush_summary();
        self.doc
    }
}

/// Interpret a non-bullet experience line as a role header, if it is one.
fn role_header(line: &str) -> Option<ExperienceEntry> {
    if let Some(caps) = RE_ROLE_TRIPLE.captures(line) {
        return Some(ExperienceEntry {
            company: caps[1].to_string(),
            title: caps[2].to_string(),
            dates: caps[3].to_string(),
            bullets: Vec::new(),
        });
    }

    let dates = RE_DATE_RANGE.find(line)?.as_str().trim().to_string();
    let mut parts = line
        .split('|')
        .map(|seg| {
            seg.replace(dates.as_str(), "")
                .trim_matches(|c: char| c.is_whitespace() || ",;@()-–—".contains(c))
                .to_string()
        })
        .filter(|seg| !seg.is_empty());

    Some(ExperienceEntry {
        company: parts.next().unwrap_or_default(),
        title: parts.next().unwrap_or_default(),
        dates,
        bullets: Vec::new(),
    })
}

fn skills_line(line: &str, skills: &mut SkillSet) {
    let text = strip_bullet(line).unwrap_or(line);
    let text = RE_SKILL_LABEL.replace(text, "");
    for piece in text.split([',', ';']) {
        let piece = piece.trim();
        if SKILL_LEN.contains(&piece.chars().count()) {
            skills.insert(piece);
        }
    }
}
