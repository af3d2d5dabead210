//! Keyword groups as delivered by the upstream keyword strategy, and their
//! flattening into an ordered [`Keyword`] sequence.
//!
//! The strategy component classifies raw keywords into priority buckets; this
//! module only decides the order in which they are considered and which
//! document sections each bucket may target:
//!
//! | Bucket | Priority | Targets |
//! |--------|----------|---------|
//! | `high` / `highROI` | High | Experience, Skills |
//! | `medium` / `mediumROI` | Medium | Experience |
//! | `low` / `lowROI` | Low | Summary |
//! | `unclassified` | Medium | Experience |

use crate::error::AtsError;
use crate::model::{Keyword, Priority, Target};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Priority-bucketed keyword input. Missing buckets deserialise as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordGroups {
    #[serde(alias = "highROI")]
    pub high: Vec<String>,
    #[serde(alias = "mediumROI")]
    pub medium: Vec<String>,
    #[serde(alias = "lowROI")]
    pub low: Vec<String>,
    pub unclassified: Vec<String>,
}

impl KeywordGroups {
    /// Decode a JSON object such as `{"highROI": ["Rust"], "low": ["Agile"]}`.
    pub fn from_json(json: &str) -> Result<Self, AtsError> {
        serde_json::from_str(json).map_err(|e| AtsError::InvalidKeywords {
            detail: e.to_string(),
        })
    }

    /// Append every bucket of `other` after the matching bucket of `self`.
    pub fn merge(mut self, other: KeywordGroups) -> Self {
        self.high.extend(other.high);
        self.medium.extend(other.medium);
        self.low.extend(other.low);
        self.unclassified.extend(other.unclassified);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty()
            && self.medium.is_empty()
            && self.low.is_empty()
            && self.unclassified.is_empty()
    }
}

/// Flatten keyword groups into the fixed processing order
/// high → medium → low → unclassified, preserving source order inside each
/// bucket.
///
/// Keywords are trimmed and blanks dropped. A keyword that appears more than
/// once (ignoring case) is kept only at its first, highest-priority position.
pub fn normalize(groups: &KeywordGroups) -> Vec<Keyword> {
    let buckets: [(&[String], Priority, &[Target]); 4] = [
        (groups.high.as_slice(), Priority::High, &[Target::Experience, Target::Skills]),
        (groups.medium.as_slice(), Priority::Medium, &[Target::Experience]),
        (groups.low.as_slice(), Priority::Low, &[Target::Summary]),
        (groups.unclassified.as_slice(), Priority::Medium, &[Target::Experience]),
    ];

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for (texts, priority, targets) in buckets {
        for raw in texts {
            let text = raw.trim();
            if text.is_empty() || !seen.insert(text.to_lowercase()) {
                continue;
            }
            keywords.push(Keyword::new(text, priority, targets.iter().copied()));
        }
    }

    debug!("Normalised {} keywords", keywords.len());
    keywords
}
