//! Keyword injection: produce an ATS-tuned copy of a [`Document`].
//!
//! The engine never touches the caller's document. It clones it, then runs
//! three phases over the copy:
//!
//! * **Phase A, skills**: up to `max_high_prio_skills` high-priority
//!   keywords targeting skills are appended to `skills.hard`, skipping any the
//!   list already holds (case-insensitively).
//! * **Phase B, experience**: bullets are walked in document order and each
//!   may absorb one keyword from a small candidate pool, phrased through a
//!   rotating template and a metric picked by the supplied random source.
//!   After an entry's bullets, a synthetic bullet naming two still-unused
//!   high-priority keywords may be appended.
//! * **Phase C, location**: `location_override` replaces the location.
//!
//! `total_injections` counts bullet edits (a synthetic bullet counts two) and
//! never exceeds `max_total_injections`. Skill additions are tracked
//! separately in `skills_added`.

use crate::config::InjectionPolicy;
use crate::model::{Document, InjectionStats, Keyword, Priority, Target};
use rand::Rng;
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// Phrasings used round-robin for bullet injections. `{kw}` is the keyword,
/// `{metric}` an entry of [`METRICS`].
pub const TEMPLATES: [&str; 6] = [
    "Leveraged {kw} to achieve {metric}.",
    "Implemented {kw}, resulting in {metric}.",
    "Applied {kw} to deliver {metric}.",
    "Adopted {kw}, contributing to {metric}.",
    "Utilized {kw} to drive {metric}.",
    "Integrated {kw} into existing workflows, enabling {metric}.",
];

/// Outcome phrases substituted for `{metric}`.
pub const METRICS: [&str; 8] = [
    "a 30% reduction in deployment time",
    "a 25% improvement in system reliability",
    "40% faster release cycles",
    "a 20% cut in infrastructure costs",
    "99.9% service uptime",
    "a 35% boost in team productivity",
    "2x throughput on critical workloads",
    "a 50% drop in incident response time",
];

/// Inject `keywords` into a copy of `doc`.
///
/// `keywords` is expected in normalised order (see
/// [`crate::keywords::normalize`]); pool membership is decided by position.
pub fn inject<R: Rng + ?Sized>(
    doc: &Document,
    keywords: &[Keyword],
    policy: &InjectionPolicy,
    rng: &mut R,
) -> (Document, InjectionStats) {
    let start = Instant::now();
    let mut out = doc.clone();
    let mut run = InjectionRun {
        policy,
        stats: InjectionStats::default(),
        covered: HashSet::new(),
        used: HashSet::new(),
        template_idx: 0,
        synthetic: 0,
    };

    run.skills(&mut out, keywords);
    run.experience(&mut out, keywords, rng);

    if let Some(location) = &policy.location_override {
        out.personal.location = location.clone();
    }

    run.stats.timing_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(
        "Injection: {} skills, {} bullets modified, {} synthetic, {} total in {:.2}ms",
        run.stats.skills_added,
        run.stats.bullets_modified,
        run.stats.new_bullets_created,
        run.stats.total_injections,
        run.stats.timing_ms
    );
    (out, run.stats)
}

/// Mutable bookkeeping for one [`inject`] call.
struct InjectionRun<'a> {
    policy: &'a InjectionPolicy,
    stats: InjectionStats,
    /// Lower-cased keywords already in `stats.keywords_covered`.
    covered: HashSet<String>,
    /// Lower-cased keywords already placed into experience bullets.
    used: HashSet<String>,
    template_idx: usize,
    synthetic: usize,
}

impl InjectionRun<'_> {
    fn cover(&mut self, keyword: &str) {
        if self.covered.insert(keyword.to_lowercase()) {
            self.stats.keywords_covered.push(keyword.to_string());
        }
    }

    fn is_used(&self, keyword: &str) -> bool {
        self.used.contains(&keyword.to_lowercase())
    }

    fn skills(&mut self, doc: &mut Document, keywords: &[Keyword]) {
        let candidates = keywords
            .iter()
            .filter(|k| k.is(Priority::High, Target::Skills))
            .take(self.policy.max_high_prio_skills);
        for kw in candidates {
            if doc.skills.hard.insert(kw.text.as_str()) {
                debug!("Skill added: {}", kw.text);
                self.stats.skills_added += 1;
                self.cover(&kw.text);
            }
        }
    }

    fn experience<R: Rng + ?Sized>(&mut self, doc: &mut Document, keywords: &[Keyword], rng: &mut R) {
        let pool: Vec<&Keyword> = keywords
            .iter()
            .filter(|k| k.is(Priority::High, Target::Experience))
            .take(self.policy.experience_high_pool)
            .chain(
                keywords
                    .iter()
                    .filter(|k| k.is(Priority::Medium, Target::Experience))
                    .take(self.policy.experience_medium_pool),
            )
            .collect();

        for (idx, entry) in doc.experience.iter_mut().enumerate() {
            for bullet in entry.bullets.iter_mut() {
                if self.stats.total_injections >= self.policy.max_total_injections {
                    break;
                }
                let lower = bullet.to_lowercase();
                let Some(kw) = pool
                    .iter()
                    .find(|k| !self.is_used(&k.text) && !lower.contains(&k.text.to_lowercase()))
                else {
                    continue;
                };

                let template = TEMPLATES[self.template_idx % TEMPLATES.len()];
                self.template_idx += 1;
                let phrase = template
                    .replace("{kw}", &kw.text)
                    .replace("{metric}", pick_metric(rng));
                *bullet = merge_phrase(bullet, &phrase);
                debug!("Bullet injection: {}", kw.text);

                self.used.insert(kw.text.to_lowercase());
                self.stats.bullets_modified += 1;
                self.stats.total_injections += 1;
                self.cover(&kw.text);
            }

            if idx == 0 || !self.policy.synthesize_bullets_for_first_entry_only {
                if let Some(bullet) = self.synthesize(keywords, rng) {
                    entry.bullets.push(bullet);
                }
            }
        }
    }

    /// Build one synthetic bullet from two unused high-priority keywords,
    /// if the policy still allows it.
    fn synthesize<R: Rng + ?Sized>(&mut self, keywords: &[Keyword], rng: &mut R) -> Option<String> {
        if self.synthetic >= self.policy.max_synthetic_bullets
            || self.stats.total_injections + 2 > self.policy.max_total_injections
        {
            return None;
        }
        let unused: Vec<&Keyword> = keywords
            .iter()
            .filter(|k| k.is(Priority::High, Target::Experience) && !self.is_used(&k.text))
            .take(2)
            .collect();
        let [first, second] = unused.as_slice() else {
            return None;
        };

        let bullet = format!(
            "Implemented {} and {} solutions, achieving {}",
            first.text,
            second.text,
            pick_metric(rng)
        );
        debug!("Synthetic bullet: {}", bullet);

        for kw in [first, second] {
            self.used.insert(kw.text.to_lowercase());
            self.cover(&kw.text);
        }
        self.synthetic += 1;
        self.stats.new_bullets_created += 1;
        self.stats.total_injections += 2;
        Some(bullet)
    }
}

fn pick_metric<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    METRICS[rng.gen_range(0..METRICS.len())]
}

/// Merge a rendered template into an existing bullet.
///
/// A bullet ending in `.` has the phrase spliced in before the period,
/// joined by a comma, with its own period dropped. Only the phrase's leading
/// letter is lower-cased: every template opens with a verb, and the keyword
/// inside it keeps the caller's spelling (`Kubernetes`, `gRPC`) so the merged
/// bullet reads as the job posting wrote it. Other bullets get the phrase
/// appended after a space.
pub fn merge_phrase(bullet: &str, phrase: &str) -> String {
    match bullet.strip_suffix('.') {
        Some(body) => {
            let clause = phrase.trim_end_matches('.');
            let mut chars = clause.chars();
            let clause = match chars.next() {
                Some(c) => c.to_lowercase().chain(chars).collect::<String>(),
                None => String::new(),
            };
            format!("{body}, {clause}.")
        }
        None => format!("{bullet} {phrase}"),
    }
}
