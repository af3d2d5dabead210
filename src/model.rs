//! In-memory résumé model shared by every pipeline stage.
//!
//! A [`Document`] is produced once by the parser and never mutated after
//! that; the injection stage clones it and returns a second, enriched
//! `Document`. Exporters only ever borrow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured representation of a résumé.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub personal: Personal,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Skills,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<String>,
}

/// Contact block. Every field is empty when not detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personal {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
}

/// One role in the experience section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub dates: String,
    /// Parsed bullets in source order, synthetic bullets appended after.
    pub bullets: Vec<String>,
}

/// One education line. `school` and `dates` are reserved; the parser only
/// fills `degree`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub dates: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub hard: SkillSet,
    pub soft: Vec<String>,
}

/// Insertion-ordered list of skills, unique under case-insensitive comparison.
///
/// The first spelling inserted wins: inserting `"rust"` after `"Rust"` is a
/// no-op. Deserialisation goes through the same rule, so a `SkillSet` can
/// never hold two case-insensitively equal entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `skill` unless an equal entry (ignoring case) is present.
    /// Returns `true` when the skill was added.
    pub fn insert(&mut self, skill: impl Into<String>) -> bool {
        let skill = skill.into();
        if self.contains(&skill) {
            return false;
        }
        self.0.push(skill);
        true
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, skill: &str) -> bool {
        let needle = skill.to_lowercase();
        self.0.iter().any(|s| s.to_lowercase() == needle)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(skills: Vec<String>) -> Self {
        skills.into_iter().collect()
    }
}

impl From<SkillSet> for Vec<String> {
    fn from(set: SkillSet) -> Self {
        set.0
    }
}

impl<S: Into<String>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Keywords ─────────────────────────────────────────────────────────────

/// Priority tier assigned by the upstream keyword strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Document section a keyword may be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    Summary,
    Experience,
    Skills,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub priority: Priority,
    pub targets: BTreeSet<Target>,
}

impl Keyword {
    pub fn new(
        text: impl Into<String>,
        priority: Priority,
        targets: impl IntoIterator<Item = Target>,
    ) -> Self {
        Self {
            text: text.into(),
            priority,
            targets: targets.into_iter().collect(),
        }
    }

    pub fn targets(&self, target: Target) -> bool {
        self.targets.contains(&target)
    }

    /// `true` when this keyword has the given priority and may go into `target`.
    pub fn is(&self, priority: Priority, target: Target) -> bool {
        self.priority == priority && self.targets(target)
    }
}

/// Counters reported by one injection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjectionStats {
    pub skills_added: usize,
    pub bullets_modified: usize,
    pub new_bullets_created: usize,
    pub total_injections: usize,
    /// Keywords placed into the document, in placement order, no repeats.
    pub keywords_covered: Vec<String>,
    pub timing_ms: f64,
}
